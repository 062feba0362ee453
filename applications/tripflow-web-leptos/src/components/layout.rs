use leptos::*;
use leptos_router::*;

use crate::auth::AuthService;
use crate::state::use_session;

/// Layout component with navbar and content outlet
#[component]
pub fn Layout() -> impl IntoView {
    view! {
        <div class="layout">
            <Navbar />
            <main class="main-content">
                <Outlet />
            </main>
        </div>
    }
}

/// Navbar with session-aware links
#[component]
fn Navbar() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();

    let logout = move |_| {
        let navigate = navigate.clone();
        spawn_local(async move {
            // Clears both stores and broadcasts; the session context
            // listens for the broadcast
            AuthService::new().logout().await;
            navigate("/", Default::default());
        });
    };

    view! {
        <nav class="navbar">
            <div class="navbar-content">
                <A href="/" class="navbar-title">"Tripflow"</A>
                <div class="navbar-tabs">
                    <A href="/flights">"Flights"</A>
                    <A href="/hotels">"Hotels"</A>
                    <Show when=move || session.is_authenticated()>
                        <A href="/chat">"Trip planner"</A>
                        <A href="/profile">"Profile"</A>
                    </Show>
                    <Show when=move || session.is_admin()>
                        <A href="/admin">"Admin"</A>
                    </Show>
                </div>
                <div class="navbar-actions">
                    <Show
                        when=move || session.is_authenticated()
                        fallback=|| view! { <A href="/login">"Sign in"</A> }
                    >
                        <span class="navbar-user">
                            {move || session.user.get().map(|u| u.email).unwrap_or_default()}
                        </span>
                        <button on:click=logout.clone()>"Sign out"</button>
                    </Show>
                </div>
            </div>
        </nav>
    }
}
