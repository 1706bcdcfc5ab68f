//! Login page component
//!
//! Sends the user to the `redirect` query target (or the dashboard) on success.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::core::guard::{REDIRECT_QUERY, post_login_target};
use crate::ui::auth::LoginForm;

#[component]
pub fn LoginPage() -> impl IntoView {
    let navigate = use_navigate();
    let query = use_query_map();

    let on_success = move |_| {
        let redirect = query.with_untracked(|q| q.get(REDIRECT_QUERY));
        let target = post_login_target(redirect.as_deref());
        navigate(
            &target,
            NavigateOptions {
                replace: true,
                ..Default::default()
            },
        );
    };

    view! {
        <div class="min-h-screen bg-gray-50 flex flex-col">
            <header class="border-b border-gray-200 bg-white">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 h-16 flex items-center">
                    <span class="text-xl font-bold text-gray-900">"Service Desk"</span>
                </div>
            </header>

            <main class="flex-1 flex items-center justify-center p-4">
                <div class="w-full max-w-md bg-white p-8 rounded-xl shadow">
                    <LoginForm on_success=Callback::new(on_success) />
                </div>
            </main>
        </div>
    }
}
