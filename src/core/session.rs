//! Session state
//!
//! Single owner of "who is logged in". The current user lives in a reactive
//! signal; `is_authenticated` is always computed from it. The only mutation
//! entry points are [`Session::fetch_current_user`], [`Session::login`] and
//! [`Session::logout`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::*;

use crate::core::http::{ApiError, HttpClient, LOGIN_PATH, LOGOUT_PATH, Transport, USER_PATH};
use crate::core::models::{Credentials, User};

/// Whether a failed identity fetch should surface a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Set the session error message on failure
    Report,
    /// Background check: still returns the error, but shows nothing
    Silent,
}

pub struct Session<T> {
    http: Arc<HttpClient<T>>,
    current_user: ArcRwSignal<Option<User>>,
    /// Set once the first identity fetch has settled
    resolved: ArcRwSignal<bool>,
    /// Login/logout in flight
    loading: ArcRwSignal<bool>,
    /// Message from the last failed operation
    error: ArcRwSignal<Option<String>>,
    /// Bumped on logout so identity responses started earlier are dropped
    generation: Arc<AtomicU64>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            current_user: self.current_user.clone(),
            resolved: self.resolved.clone(),
            loading: self.loading.clone(),
            error: self.error.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("current_user", &self.current_user.get_untracked())
            .field("resolved", &self.resolved.get_untracked())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    pub fn new(http: Arc<HttpClient<T>>) -> Self {
        Self {
            http,
            current_user: ArcRwSignal::new(None),
            resolved: ArcRwSignal::new(false),
            loading: ArcRwSignal::new(false),
            error: ArcRwSignal::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn http(&self) -> &Arc<HttpClient<T>> {
        &self.http
    }

    /// Current user (tracked)
    pub fn user(&self) -> Option<User> {
        self.current_user.get()
    }

    /// Read-only view of the current user
    pub fn user_signal(&self) -> ArcReadSignal<Option<User>> {
        self.current_user.read_only()
    }

    /// Whether someone is logged in (tracked)
    pub fn is_authenticated(&self) -> bool {
        self.current_user.with(Option::is_some)
    }

    /// Same as [`is_authenticated`](Self::is_authenticated), for async code outside reactive scopes
    pub fn is_authenticated_untracked(&self) -> bool {
        self.current_user.with_untracked(Option::is_some)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn error(&self) -> Option<String> {
        self.error.get()
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    /// Ask the backend who is logged in.
    ///
    /// Success stores the user, failure clears it. The error is always
    /// returned; `mode` only decides whether a message is shown.
    pub async fn fetch_current_user(&self, mode: FetchMode) -> Result<(), ApiError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let result = self.http.get::<User>(USER_PATH).await;

        self.resolved.set(true);

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("dropping identity response started before logout");
            return result.map(drop);
        }

        match result {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session resolved");
                self.current_user.set(Some(user));
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "no active session");
                self.current_user.set(None);
                if mode == FetchMode::Report {
                    self.report(&err);
                }
                Err(err)
            }
        }
    }

    /// Log in, then load the user.
    ///
    /// On failure the current user is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.loading.set(true);
        self.error.set(None);

        let result = async {
            self.http.post_empty(LOGIN_PATH, Some(credentials)).await?;
            self.fetch_current_user(FetchMode::Report).await
        }
        .await;

        self.loading.set(false);

        if let Err(err) = &result {
            tracing::info!(email = %credentials.email, error = %err, "login failed");
            self.report(err);
        }
        result
    }

    /// Log out on the server; local state is cleared only once the server agrees
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.loading.set(true);
        let result = self.http.post_empty::<()>(LOGOUT_PATH, None).await;
        self.loading.set(false);

        match result {
            Ok(()) => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.current_user.set(None);
                self.error.set(None);
                tracing::debug!("logged out");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "logout failed");
                self.report(&err);
                Err(err)
            }
        }
    }

    fn report(&self, err: &ApiError) {
        if err.is_presentable() {
            self.error.set(Some(err.display_message()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::http::testing::{MockTransport, reload_counter, user_json};
    use crate::core::http::{CSRF_COOKIE_PATH, Method};

    fn session(transport: MockTransport) -> Session<MockTransport> {
        let (hook, _) = reload_counter();
        Session::new(Arc::new(HttpClient::with_session_expired_hook(
            Config::new("http://api.test"),
            transport,
            hook,
        )))
    }

    fn transport(session: &Session<MockTransport>) -> &MockTransport {
        session.http().transport()
    }

    #[tokio::test]
    async fn test_starts_unresolved_and_unauthenticated() {
        let session = session(MockTransport::new());

        assert!(!session.is_resolved());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_fetch_current_user_sets_user() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, USER_PATH, 200, &user_json(1, "Ana", "ana@example.com"));
        let session = session(mock);

        session.fetch_current_user(FetchMode::Report).await.unwrap();

        assert!(session.is_resolved());
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_failed_fetch_clears_user_and_returns_error() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, USER_PATH, 200, &user_json(1, "Ana", "ana@example.com"));
        mock.respond(Method::Get, USER_PATH, 401, r#"{"message":"Unauthenticated."}"#);
        let session = session(mock);

        session.fetch_current_user(FetchMode::Report).await.unwrap();
        let err = session
            .fetch_current_user(FetchMode::Report)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthenticated { .. }));
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
        // missing session is not something to show
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_silent_fetch_still_returns_error_without_message() {
        let mock = MockTransport::new();
        mock.fail(Method::Get, USER_PATH, "Network Error");
        let session = session(mock);

        let err = session
            .fetch_current_user(FetchMode::Silent)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Transport("Network Error".to_string()));
        assert!(session.error().is_none());
        assert!(session.is_resolved());
    }

    #[tokio::test]
    async fn test_reported_fetch_sets_message() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, USER_PATH, 500, r#"{"message":"Server Error"}"#);
        let session = session(mock);

        let _ = session.fetch_current_user(FetchMode::Report).await;

        assert_eq!(session.error().as_deref(), Some("Server Error"));
    }

    #[tokio::test]
    async fn test_login_fetches_user_after_csrf_preflight() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, LOGIN_PATH, 204, "");
        mock.respond(Method::Get, USER_PATH, 200, &user_json(2, "Bruno", "bruno@example.com"));
        let session = session(mock);

        session
            .login(&Credentials::new("bruno@example.com", "secret"))
            .await
            .unwrap();

        assert!(session.is_authenticated());
        assert!(!session.is_loading());
        let paths: Vec<String> = transport(&session)
            .calls()
            .into_iter()
            .map(|(_, url)| url.trim_start_matches("http://api.test").to_string())
            .collect();
        assert_eq!(paths, vec![CSRF_COOKIE_PATH, LOGIN_PATH, USER_PATH]);
    }

    #[tokio::test]
    async fn test_login_validation_failure_shows_flattened_message() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            LOGIN_PATH,
            422,
            r#"{"message":"The password is invalid.","errors":{"password":["invalid"]}}"#,
        );
        let session = session(mock);

        let err = session
            .login(&Credentials::new("a@b.com", "bad"))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(session.error().as_deref(), Some("invalid"));
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(transport(&session).count(USER_PATH), 0);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, USER_PATH, 200, &user_json(1, "Ana", "ana@example.com"));
        mock.respond(Method::Post, LOGIN_PATH, 401, r#"{"message":"These credentials do not match our records."}"#);
        let session = session(mock);

        session.fetch_current_user(FetchMode::Silent).await.unwrap();
        let err = session
            .login(&Credentials::new("other@example.com", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidCredentials { .. }));
        assert_eq!(session.user().unwrap().id, 1);
        assert_eq!(
            session.error().as_deref(),
            Some("These credentials do not match our records.")
        );
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_logout_clears_user_and_previous_error() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, USER_PATH, 200, &user_json(1, "Ana", "ana@example.com"));
        mock.respond(Method::Post, LOGOUT_PATH, 500, r#"{"message":"Try again"}"#);
        mock.respond(Method::Post, LOGOUT_PATH, 204, "");
        let session = session(mock);

        session.fetch_current_user(FetchMode::Report).await.unwrap();

        // a failed logout leaves the session alone
        assert!(session.logout().await.is_err());
        assert!(session.is_authenticated());
        assert_eq!(session.error().as_deref(), Some("Try again"));

        session.logout().await.unwrap();
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_logout_when_already_anonymous() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, LOGOUT_PATH, 204, "");
        let session = session(mock);

        session.logout().await.unwrap();

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_identity_response_after_logout_is_discarded() {
        let mock = MockTransport::new().with_csrf_token();
        let gate = mock.respond_gated(
            Method::Get,
            USER_PATH,
            200,
            &user_json(1, "Ana", "ana@example.com"),
        );
        mock.respond(Method::Post, LOGOUT_PATH, 204, "");
        let session = session(mock);

        let fetch = session.fetch_current_user(FetchMode::Silent);
        let logout = async {
            session.logout().await.unwrap();
            gate.notify_one();
        };
        let (fetched, ()) = tokio::join!(fetch, logout);

        assert!(fetched.is_ok());
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticated_always_matches_user() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, LOGIN_PATH, 204, "");
        mock.respond(Method::Get, USER_PATH, 200, &user_json(3, "Caio", "caio@example.com"));
        mock.respond(Method::Get, USER_PATH, 419, "");
        mock.respond(Method::Post, LOGIN_PATH, 422, r#"{"errors":{"email":["required"]}}"#);
        let session = session(mock);

        let check = |s: &Session<MockTransport>| {
            assert_eq!(s.is_authenticated(), s.user().is_some());
        };

        check(&session);
        let _ = session.login(&Credentials::new("caio@example.com", "pw")).await;
        check(&session);
        let _ = session.fetch_current_user(FetchMode::Silent).await;
        check(&session);
        let _ = session.login(&Credentials::new("", "")).await;
        check(&session);
    }
}
