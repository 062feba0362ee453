use leptos::*;
use leptos_router::*;

use crate::auth::AuthService;
use crate::state::use_session;

/// Two-step OTP login: ask for an address, then for the mailed code.
#[component]
pub fn Login() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let query = use_query_map();

    let (email, set_email) = create_signal(String::new());
    let (otp, set_otp) = create_signal(String::new());
    let (code_sent, set_code_sent) = create_signal(false);
    let (busy, set_busy) = create_signal(false);
    let (error, set_error) = create_signal(Option::<String>::None);

    let send_code = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        set_busy.set(true);
        set_error.set(None);
        spawn_local(async move {
            match AuthService::new().send_otp(&email.get_untracked()).await {
                Ok(()) => set_code_sent.set(true),
                Err(err) => set_error.set(Some(err.to_string())),
            }
            set_busy.set(false);
        });
    };

    let verify_code = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        set_busy.set(true);
        set_error.set(None);
        let navigate = navigate.clone();
        // Where the gatekeeper redirect came from, or home
        let next = query
            .get_untracked()
            .get("next")
            .cloned()
            .unwrap_or_else(|| "/".to_string());
        spawn_local(async move {
            match AuthService::new()
                .verify_otp(&email.get_untracked(), &otp.get_untracked())
                .await
            {
                Ok(user) => {
                    session.set_user.set(Some(user));
                    navigate(&next, Default::default());
                }
                Err(err) => {
                    set_error.set(Some(err.to_string()));
                    set_busy.set(false);
                }
            }
        });
    };

    view! {
        <div class="login-card">
            <h2>"Sign in to Tripflow"</h2>
            <Show when=move || error.get().is_some()>
                <p class="error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <Show
                when=move || code_sent.get()
                fallback=move || view! {
                    <form on:submit=send_code>
                        <label for="email">"Email address"</label>
                        <input
                            id="email"
                            type="email"
                            required
                            prop:value=email
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                        />
                        <button type="submit" disabled=busy>"Send code"</button>
                    </form>
                }
            >
                <form on:submit=verify_code.clone()>
                    <label for="otp">"One-time code"</label>
                    <input
                        id="otp"
                        type="text"
                        inputmode="numeric"
                        required
                        prop:value=otp
                        on:input=move |ev| set_otp.set(event_target_value(&ev))
                    />
                    <button type="submit" disabled=busy>"Verify"</button>
                    <button type="button" on:click=move |_| set_code_sent.set(false)>
                        "Use a different address"
                    </button>
                </form>
            </Show>
        </div>
    }
}
