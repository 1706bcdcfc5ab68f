pub mod auth;
pub mod guard;
pub mod notifications;
pub mod pages;

pub use guard::RouteGuard;
pub use notifications::{Toasts, provide_notifications, use_notifications};
