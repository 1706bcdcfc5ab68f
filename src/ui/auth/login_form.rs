//! Login form component

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::context::use_session;
use crate::core::models::Credentials;

/// Email/password form; errors are shown as toasts by the session
#[component]
pub fn LoginForm(
    /// Callback when login is successful
    #[prop(optional, into)]
    on_success: Option<Callback<()>>,
) -> impl IntoView {
    let session = use_session().session;

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let remember = RwSignal::new(false);

    let loading = {
        let session = session.clone();
        Signal::derive(move || session.is_loading())
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let credentials = Credentials::new(email.get_untracked(), password.get_untracked())
            .remember(remember.get_untracked());
        let session = session.clone();

        spawn_local(async move {
            if session.login(&credentials).await.is_ok() {
                password.set(String::new());
                if let Some(callback) = on_success {
                    callback.run(());
                }
            }
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-6">
            <div class="text-center">
                <h2 class="text-2xl font-bold text-gray-900">"Sign in"</h2>
            </div>

            <div>
                <label for="email" class="block text-sm font-medium text-gray-700 mb-1">
                    "Email"
                </label>
                <input
                    type="email"
                    id="email"
                    name="email"
                    autocomplete="email"
                    class="w-full px-3 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
            </div>

            <div>
                <label for="password" class="block text-sm font-medium text-gray-700 mb-1">
                    "Password"
                </label>
                <input
                    type="password"
                    id="password"
                    name="password"
                    autocomplete="current-password"
                    class="w-full px-3 py-2 border border-gray-300 rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
            </div>

            <label class="flex items-center gap-2 text-sm text-gray-700">
                <input
                    type="checkbox"
                    name="remember"
                    prop:checked=move || remember.get()
                    on:change=move |ev| remember.set(event_target_checked(&ev))
                />
                "Remember me"
            </label>

            <button
                type="submit"
                class="w-full py-2.5 px-4 bg-blue-600 hover:bg-blue-700 text-white font-medium rounded-lg disabled:opacity-50"
                disabled=move || loading.get()
            >
                {move || if loading.get() { "Signing in..." } else { "Sign In" }}
            </button>
        </form>
    }
}
