use leptos::prelude::*;
use leptos_meta::{MetaTags, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Redirect, Route, Router, Routes},
};

use crate::core::config::Config;
use crate::core::guard::{LOGIN_ROUTE, RouteAccess};
use crate::ui::auth::provide_session_context;
use crate::ui::pages::{DashboardPage, LoginPage, NotFoundPage};
use crate::ui::{RouteGuard, Toasts, provide_notifications};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    if let Err(err) = provide_session_context(Config::compiled()) {
        return view! {
            <Title text="Service Desk"/>
            <div class="min-h-screen flex items-center justify-center p-4">
                <p class="text-red-700">{format!("The application is misconfigured: {}", err)}</p>
            </div>
        }
        .into_any();
    }
    provide_notifications();

    view! {
        <Title text="Service Desk"/>

        <Toasts/>

        <Router>
            <Routes fallback=|| view! { <NotFoundPage/> }>
                <Route path=StaticSegment("") view=|| view! { <Redirect path=LOGIN_ROUTE/> }/>
                <Route
                    path=StaticSegment("login")
                    view=|| view! {
                        <RouteGuard access=RouteAccess::GuestOnly>
                            <LoginPage/>
                        </RouteGuard>
                    }
                />
                <Route
                    path=StaticSegment("dashboard")
                    view=|| view! {
                        <RouteGuard access=RouteAccess::Protected>
                            <DashboardPage/>
                        </RouteGuard>
                    }
                />
            </Routes>
        </Router>
    }
    .into_any()
}
