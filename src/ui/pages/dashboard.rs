//! Dashboard page component
//!
//! Greets the signed-in user and shows customer and work-order totals.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::core::http::RequestOptions;
use crate::core::resources::{customers, work_orders};
use crate::ui::auth::{UserMenu, use_session};
use crate::ui::notifications::use_notifications;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Totals {
    customers: Option<u64>,
    work_orders: Option<u64>,
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let session = use_session().session;
    let notifications = use_notifications();
    let totals = RwSignal::new(Totals::default());

    let user = session.user_signal();
    let http = session.http().clone();

    Effect::new(move |_| {
        let customers = customers(http.clone());
        let work_orders = work_orders(http.clone());
        spawn_local(async move {
            let first_page = RequestOptions::default();

            match customers.index(&first_page).await {
                Ok(page) => totals.update(|t| t.customers = Some(page.total)),
                Err(err) if err.is_presentable() => notifications.error(err.display_message()),
                Err(err) => tracing::debug!(error = %err, "customer count unavailable"),
            }

            match work_orders.index(&first_page).await {
                Ok(page) => totals.update(|t| t.work_orders = Some(page.total)),
                Err(err) if err.is_presentable() => notifications.error(err.display_message()),
                Err(err) => tracing::debug!(error = %err, "work order count unavailable"),
            }
        });
    });

    let count = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_else(|| "…".into());

    view! {
        <div class="min-h-screen bg-gray-50">
            <header class="border-b border-gray-200 bg-white">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 h-16 flex items-center justify-between">
                    <span class="text-xl font-bold text-gray-900">"Service Desk"</span>
                    <UserMenu />
                </div>
            </header>

            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                <h1 class="text-2xl font-semibold text-gray-900 mb-6">
                    {move || {
                        user.get()
                            .map(|u| format!("Welcome, {}", u.name))
                            .unwrap_or_default()
                    }}
                </h1>

                <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                    <div class="p-6 bg-white rounded-xl shadow">
                        <p class="text-sm text-gray-500">"Customers"</p>
                        <p class="text-3xl font-bold text-gray-900">
                            {move || count(totals.get().customers)}
                        </p>
                    </div>
                    <div class="p-6 bg-white rounded-xl shadow">
                        <p class="text-sm text-gray-500">"Work orders"</p>
                        <p class="text-3xl font-bold text-gray-900">
                            {move || count(totals.get().work_orders)}
                        </p>
                    </div>
                </div>
            </main>
        </div>
    }
}
