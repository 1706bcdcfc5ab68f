//! Application pages module
//!
//! - Login page
//! - Dashboard (customer and work-order overview)
//! - Not found page

mod dashboard;
mod login;
mod not_found;

pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
