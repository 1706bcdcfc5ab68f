//! Router binding for the navigation guard
//!
//! Wrap a route's view in [`RouteGuard`]; the guard runs on every change of
//! path or query and either renders the children or redirects.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::core::guard::{RouteAccess, RouteIntent, full_path};
use crate::ui::auth::use_session;

#[component]
pub fn RouteGuard(access: RouteAccess, children: ChildrenFn) -> impl IntoView {
    let ctx = use_session();
    let guard = ctx.guard.clone();
    let session = ctx.session.clone();
    let location = use_location();
    let navigate = use_navigate();
    let allowed = RwSignal::new(false);

    Effect::new(move |_| {
        let target = full_path(&location.pathname.get(), &location.search.get());
        allowed.set(false);

        // wait for the startup identity check
        if !session.is_resolved() {
            return;
        }

        let guard = guard.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            let outcome = guard.evaluate(&RouteIntent::new(target, access)).await;
            if !guard.is_current(outcome.attempt) {
                return;
            }
            match outcome.state.redirect_location() {
                Some(location) => navigate(
                    &location,
                    NavigateOptions {
                        replace: true,
                        ..Default::default()
                    },
                ),
                None => allowed.set(true),
            }
        });
    });

    view! {
        <Show
            when=move || allowed.get()
            fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen">
                    <div class="animate-spin rounded-full h-8 w-8 border-b-2 border-blue-600"></div>
                </div>
            }
        >
            {children()}
        </Show>
    }
}
