//! Transport seam between the pipeline and the actual HTTP stack

use std::fmt;
use std::future::Future;

use super::error::TransportError;

/// HTTP methods used by the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Anything but GET changes server state and needs a CSRF token
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL
    pub url: String,
    pub query: Vec<(String, String)>,
    /// JSON body, already serialized
    pub body: Option<String>,
}

/// Raw response as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Sends requests and owns the cookie store.
///
/// Implementations always include credentials, attach the `X-XSRF-TOKEN`
/// header from the `XSRF-TOKEN` cookie when present, and mark requests as
/// AJAX calls expecting JSON. Futures need not be `Send`, browser fetch
/// futures are not.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;

    /// Whether the cookie store currently holds a CSRF token
    fn has_csrf_token(&self) -> bool;
}

/// Name of the cookie Sanctum issues from `/sanctum/csrf-cookie`
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the backend expects the token in
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Find a cookie value in a `name=value; name2=value2` header string
pub fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_get_is_safe() {
        assert!(!Method::Get.is_mutating());
        assert!(Method::Post.is_mutating());
        assert!(Method::Put.is_mutating());
        assert!(Method::Patch.is_mutating());
        assert!(Method::Delete.is_mutating());
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(422, "").is_success());
    }

    #[test]
    fn test_find_cookie() {
        let header = "laravel_session=abc; XSRF-TOKEN=eyJpdiI6%3D; theme=dark";
        assert_eq!(find_cookie(header, XSRF_COOKIE), Some("eyJpdiI6%3D"));
        assert_eq!(find_cookie(header, "theme"), Some("dark"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn test_find_cookie_ignores_empty_value() {
        assert_eq!(find_cookie("XSRF-TOKEN=", XSRF_COOKIE), None);
        assert_eq!(find_cookie("", XSRF_COOKIE), None);
    }
}
