//! Authentication UI module
//!
//! This module provides the session context and the authentication-related
//! components built on it.

mod context;
mod login_form;
mod user_menu;

pub use context::{AppGuard, AppSession, SessionContext, provide_session_context, use_session};
pub use login_form::LoginForm;
pub use user_menu::UserMenu;
