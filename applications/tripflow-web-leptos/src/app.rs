use leptos::*;
use leptos_router::*;

use crate::components::{Layout, Login};
use crate::state::{provide_session_context, use_session};

/// Main application component with routing
#[component]
pub fn App() -> impl IntoView {
    // Provide session context at the app root
    provide_session_context();

    view! {
        <Router>
            <Routes>
                <Route path="/" view=Layout>
                    <Route path="" view=Home />
                    <Route path="flights" view=Flights />
                    <Route path="hotels" view=Hotels />
                    <Route path="login" view=Login />
                    <Route path="profile" view=Profile />
                    <Route path="chat" view=TripPlanner />
                    <Route path="admin" view=AdminDashboard />
                </Route>
            </Routes>
        </Router>
    }
}

#[component]
fn Home() -> impl IntoView {
    let session = use_session();
    view! {
        <section class="page">
            <h1>"Where to next?"</h1>
            <Show when=move || session.is_authenticated()>
                <p>
                    "Welcome back, "
                    {move || session.user.get().map(|u| u.email).unwrap_or_default()}
                </p>
            </Show>
        </section>
    }
}

#[component]
fn Flights() -> impl IntoView {
    view! { <section class="page"><h1>"Flights"</h1></section> }
}

#[component]
fn Hotels() -> impl IntoView {
    view! { <section class="page"><h1>"Hotels"</h1></section> }
}

#[component]
fn Profile() -> impl IntoView {
    let session = use_session();
    view! {
        <section class="page">
            <h1>"Your profile"</h1>
            <p>{move || session.user.get().map(|u| u.email).unwrap_or_default()}</p>
        </section>
    }
}

#[component]
fn TripPlanner() -> impl IntoView {
    view! { <section class="page"><h1>"Trip planner"</h1></section> }
}

#[component]
fn AdminDashboard() -> impl IntoView {
    view! { <section class="page"><h1>"Admin dashboard"</h1></section> }
}
