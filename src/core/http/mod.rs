//! HTTP pipeline
//!
//! - [`HttpClient`] adds the CSRF pre-flight and session-expiry handling
//! - [`Transport`] abstracts the network: gloo-net in the browser, reqwest natively
//! - [`ApiError`] is the normalized failure shape

mod client;
mod error;
mod transport;

#[cfg(feature = "hydrate")]
mod browser;
#[cfg(feature = "ssr")]
mod native;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    CSRF_COOKIE_PATH, HttpClient, LOGIN_PATH, LOGOUT_PATH, RequestOptions, SessionExpiredHook,
    USER_PATH, reload_application,
};
pub use error::{ApiError, FieldErrors, TransportError};
pub use transport::{
    HttpRequest, HttpResponse, Method, Transport, XSRF_COOKIE, XSRF_HEADER, find_cookie,
};

#[cfg(feature = "hydrate")]
pub use browser::BrowserTransport;
#[cfg(feature = "ssr")]
pub use native::ReqwestTransport;

/// Transport used by the application build
#[cfg(feature = "hydrate")]
pub type DefaultTransport = BrowserTransport;
#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub type DefaultTransport = ReqwestTransport;

/// Build the application's transport
#[cfg(feature = "hydrate")]
pub fn default_transport(_config: &crate::core::config::Config) -> Result<DefaultTransport, TransportError> {
    Ok(BrowserTransport)
}

#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub fn default_transport(config: &crate::core::config::Config) -> Result<DefaultTransport, TransportError> {
    ReqwestTransport::new(config)
}
