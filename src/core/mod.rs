//! Client core: HTTP pipeline, session state, navigation guard and API resources

pub mod config;
pub mod guard;
pub mod http;
pub mod models;
pub mod resources;
pub mod session;
