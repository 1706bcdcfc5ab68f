//! reqwest-backed transport for native builds
//!
//! Keeps its own cookie jar so the Sanctum session and `XSRF-TOKEN` cookies
//! behave as they would in a browser.

use std::sync::Arc;

use leptos_router::location::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::error::TransportError;
use super::transport::{
    HttpRequest, HttpResponse, Method, Transport, XSRF_COOKIE, XSRF_HEADER, find_cookie,
};
use crate::core::config::Config;

pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
    origin: reqwest::Url,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let origin = reqwest::Url::parse(&config.api_base_url)
            .map_err(|e| TransportError::new(format!("invalid API base URL: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(Self {
            client,
            jar,
            origin,
        })
    }

    /// Decoded value of the `XSRF-TOKEN` cookie for the API origin
    fn xsrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let cookies = header.to_str().ok()?;
        find_cookie(cookies, XSRF_COOKIE).map(Url::unescape)
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.xsrf_token() {
            builder = builder.header(XSRF_HEADER, token);
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    fn has_csrf_token(&self) -> bool {
        self.xsrf_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = ReqwestTransport::new(&Config::new("not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn test_fresh_jar_has_no_token() {
        let transport = ReqwestTransport::new(&Config::default()).unwrap();
        assert!(!transport.has_csrf_token());
    }

    #[test]
    fn test_token_is_read_from_jar_and_decoded() {
        let transport = ReqwestTransport::new(&Config::default()).unwrap();
        let origin = transport.origin.clone();
        transport
            .jar
            .add_cookie_str("XSRF-TOKEN=abc%3D%3D; Path=/", &origin);

        assert!(transport.has_csrf_token());
        assert_eq!(transport.xsrf_token().as_deref(), Some("abc=="));
    }
}
