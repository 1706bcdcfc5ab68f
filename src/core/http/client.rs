//! HTTP client with CSRF pre-flight and session-expiry handling
//!
//! Built once from [`Config`] at startup and shared by `Arc` with every
//! component that talks to the backend.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ErrorPayload};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::core::config::Config;

/// Issues the `XSRF-TOKEN` cookie
pub const CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";
/// Identity check
pub const USER_PATH: &str = "/api/user";
pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";

/// Endpoints whose 401 never means "session expired"
const SESSION_PROBES: [&str; 2] = [USER_PATH, LOGIN_PATH];

/// Called when an authenticated call comes back 401/419
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            query: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub struct HttpClient<T> {
    config: Config,
    transport: T,
    on_session_expired: SessionExpiredHook,
}

impl<T: Transport> HttpClient<T> {
    /// Create a client whose session-expired hook reloads the page
    pub fn new(config: Config, transport: T) -> Self {
        Self::with_session_expired_hook(config, transport, Arc::new(reload_application))
    }

    pub fn with_session_expired_hook(
        config: Config,
        transport: T,
        on_session_expired: SessionExpiredHook,
    ) -> Self {
        Self {
            config,
            transport,
            on_session_expired,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request through the pipeline.
    ///
    /// Mutating requests made without a CSRF token first fetch one.
    /// Non-success responses are normalized into [`ApiError`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let body = body.map(serde_json::to_string).transpose()?;
        self.dispatch(method, path, body, options.query.clone())
            .await
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.dispatch(Method::Get, path, None, Vec::new()).await?;
        Ok(response.json()?)
    }

    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let response = self
            .dispatch(Method::Get, path, None, options.query.clone())
            .await?;
        Ok(response.json()?)
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let response = self
            .dispatch(Method::Post, path, Some(body), Vec::new())
            .await?;
        Ok(response.json()?)
    }

    /// POST whose response body is ignored
    pub async fn post_empty<B>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_string).transpose()?;
        self.dispatch(Method::Post, path, body, Vec::new()).await?;
        Ok(())
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let response = self
            .dispatch(Method::Put, path, Some(body), Vec::new())
            .await?;
        Ok(response.json()?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(Method::Delete, path, None, Vec::new())
            .await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        query: Vec<(String, String)>,
    ) -> Result<HttpResponse, ApiError> {
        if method.is_mutating() && !self.transport.has_csrf_token() {
            self.ensure_csrf_cookie().await?;
        }

        let request = HttpRequest {
            method,
            url: self.config.url_for(path),
            query,
            body,
        };

        tracing::debug!(%method, path, "sending request");
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "transport failure");
            ApiError::from(e)
        })?;

        if response.is_success() {
            return Ok(response);
        }

        Err(self.classify_failure(path, response))
    }

    async fn ensure_csrf_cookie(&self) -> Result<(), ApiError> {
        tracing::debug!("no CSRF token, requesting one");
        let request = HttpRequest {
            method: Method::Get,
            url: self.config.url_for(CSRF_COOKIE_PATH),
            query: Vec::new(),
            body: None,
        };
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(self.classify_failure(CSRF_COOKIE_PATH, response))
        }
    }

    fn classify_failure(&self, path: &str, response: HttpResponse) -> ApiError {
        let status = response.status;
        let mut payload = ErrorPayload::parse(&response.body);
        let message = payload
            .message()
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        match status {
            401 | 419 if normalize(path) == LOGIN_PATH => ApiError::InvalidCredentials { message },
            401 | 419 if is_session_probe(path) => ApiError::Unauthenticated { message },
            401 | 419 => {
                tracing::warn!(path, status, "session expired, reloading application");
                (self.on_session_expired)();
                ApiError::SessionExpired
            }
            422 => ApiError::Validation {
                message,
                fields: payload.field_errors(),
            },
            _ => {
                if status >= 500 {
                    tracing::error!(path, status, %message, "server error");
                }
                ApiError::Status { status, message }
            }
        }
    }
}

impl<T> fmt::Debug for HttpClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn normalize(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    format!("/{}", path.trim_matches('/'))
}

fn is_session_probe(path: &str) -> bool {
    SESSION_PROBES.contains(&normalize(path).as_str())
}

/// Force a full page load so in-memory state is rebuilt from the server
pub fn reload_application() {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().reload() {
                tracing::error!("failed to reload page: {:?}", e);
            }
        }
    }

    #[cfg(not(feature = "hydrate"))]
    tracing::warn!("session expired outside the browser, nothing to reload");
}
