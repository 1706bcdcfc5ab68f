//! User menu component
//!
//! Shows the logged-in user's name and a sign-out button.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use super::context::use_session;
use crate::core::guard::LOGIN_ROUTE;

#[component]
pub fn UserMenu() -> impl IntoView {
    let session = use_session().session;
    let navigate = use_navigate();

    let user = session.user_signal();

    let handle_logout = move |_| {
        let session = session.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            // a failed logout is reported by the session and keeps the user here
            if session.logout().await.is_ok() {
                navigate(LOGIN_ROUTE, Default::default());
            }
        });
    };

    view! {
        <div class="flex items-center gap-3">
            <span class="text-sm font-medium text-gray-700">
                {move || user.get().map(|u| u.name).unwrap_or_default()}
            </span>
            <button
                class="px-3 py-1.5 text-sm font-medium text-gray-600 hover:text-gray-900 border border-gray-300 rounded-lg"
                on:click=handle_logout
            >
                "Sign out"
            </button>
        </div>
    }
}
