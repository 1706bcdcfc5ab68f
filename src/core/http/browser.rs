//! Browser transport built on gloo-net
//!
//! Cookies live in the browser; this module only reads `XSRF-TOKEN` back out
//! of `document.cookie` to mirror it into the request header.

use gloo_net::http::RequestBuilder;
use leptos_router::location::Url;
use wasm_bindgen::JsCast;
use web_sys::RequestCredentials;

use super::error::TransportError;
use super::transport::{
    HttpRequest, HttpResponse, Method, Transport, XSRF_COOKIE, XSRF_HEADER, find_cookie,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTransport;

impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => gloo_net::http::Method::GET,
            Method::Post => gloo_net::http::Method::POST,
            Method::Put => gloo_net::http::Method::PUT,
            Method::Patch => gloo_net::http::Method::PATCH,
            Method::Delete => gloo_net::http::Method::DELETE,
        };

        let mut builder = RequestBuilder::new(&request.url)
            .method(method)
            .credentials(RequestCredentials::Include)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(
                request
                    .query
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        if let Some(token) = xsrf_token() {
            builder = builder.header(XSRF_HEADER, &token);
        }

        let prepared = match request.body {
            Some(body) => builder.header("Content-Type", "application/json").body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::new(e.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    fn has_csrf_token(&self) -> bool {
        xsrf_token().is_some()
    }
}

fn document_cookies() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let document: web_sys::HtmlDocument = document.dyn_into().ok()?;
    document.cookie().ok()
}

fn xsrf_token() -> Option<String> {
    let cookies = document_cookies()?;
    find_cookie(&cookies, XSRF_COOKIE).map(Url::unescape)
}
