//! Not found page component

use leptos::prelude::*;
use leptos_router::components::A;

use crate::core::guard::DASHBOARD_ROUTE;

/// Not found (404) page component
#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gray-50 flex flex-col items-center justify-center p-4">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-gray-900 mb-4">"404"</h1>

                <h2 class="text-2xl font-semibold text-gray-900 mb-2">
                    "Page Not Found"
                </h2>

                <p class="text-gray-600 mb-8 max-w-md mx-auto">
                    "The page you're looking for doesn't exist or has been moved."
                </p>

                <A
                    href=DASHBOARD_ROUTE
                    attr:class="px-6 py-3 bg-blue-600 hover:bg-blue-700 text-white font-medium rounded-lg transition-colors"
                >
                    "Back to Dashboard"
                </A>
            </div>
        </div>
    }
}
