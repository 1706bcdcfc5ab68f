//! Scripted transport for tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::client::{CSRF_COOKIE_PATH, SessionExpiredHook};
use super::error::TransportError;
use super::transport::{HttpRequest, HttpResponse, Method, Transport};

struct Scripted {
    result: Result<HttpResponse, TransportError>,
    gate: Option<Arc<Notify>>,
}

/// Transport that replays scripted responses per `(method, path)` in FIFO order.
///
/// Unscripted CSRF pre-flights succeed and set the token; any other
/// unscripted call gets a 404.
#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
    csrf: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csrf_token(self) -> Self {
        self.csrf.store(true, Ordering::SeqCst);
        self
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Ok(HttpResponse::new(status, body)), None);
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Err(TransportError::new(message)), None);
    }

    /// Like [`respond`](Self::respond), but the response is held back until the returned gate is notified
    pub fn respond_gated(&self, method: Method, path: &str, status: u16, body: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(
            method,
            path,
            Ok(HttpResponse::new(status, body)),
            Some(gate.clone()),
        );
        gate
    }

    fn push(
        &self,
        method: Method,
        path: &str,
        result: Result<HttpResponse, TransportError>,
        gate: Option<Arc<Notify>>,
    ) {
        self.scripts
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { result, gate });
    }

    /// `(method, url)` of every request sent so far
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method, r.url.clone()))
            .collect()
    }

    /// Number of requests sent to `path`
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| path_of(&r.url) == path)
            .count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = path_of(&request.url).to_string();
        let method = request.method;
        self.requests.lock().unwrap().push(request);

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&(method, path.clone()))
            .and_then(VecDeque::pop_front);

        let result = match scripted {
            Some(Scripted { result, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None if path == CSRF_COOKIE_PATH => Ok(HttpResponse::new(204, "")),
            None => Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#)),
        };

        if path == CSRF_COOKIE_PATH && matches!(&result, Ok(r) if r.is_success()) {
            self.csrf.store(true, Ordering::SeqCst);
        }
        result
    }

    fn has_csrf_token(&self) -> bool {
        self.csrf.load(Ordering::SeqCst)
    }
}

fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find('/').map_or("/", |i| &rest[i..])
}

/// Session-expired hook that counts its invocations
pub fn reload_counter() -> (SessionExpiredHook, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook_count = count.clone();
    let hook: SessionExpiredHook = Arc::new(move || {
        hook_count.fetch_add(1, Ordering::SeqCst);
    });
    (hook, count)
}

/// `/api/user` response body
pub fn user_json(id: u64, name: &str, email: &str) -> String {
    serde_json::json!({
        "id": id,
        "name": name,
        "email": email,
        "email_verified_at": null,
        "created_at": "2024-05-01T12:00:00.000000Z",
        "updated_at": "2024-05-01T12:00:00.000000Z",
    })
    .to_string()
}
