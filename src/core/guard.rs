//! Navigation guard
//!
//! The decision itself is a pure function of "is someone logged in" and the
//! route being entered. [`NavigationGuard`] adds the one side effect: when a
//! protected route is entered without a session, it refreshes the identity
//! once before deciding.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::*;
use leptos_router::location::Url;

use crate::core::http::Transport;
use crate::core::session::{FetchMode, Session};

pub const LOGIN_ROUTE: &str = "/login";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Query key carrying the page to return to after login
pub const REDIRECT_QUERY: &str = "redirect";

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteAccess {
    #[default]
    Public,
    /// Requires a logged-in user
    Protected,
    /// Only for visitors without a session, e.g. the login page
    GuestOnly,
}

/// A single navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIntent {
    /// Full path including query string
    pub target: String,
    pub access: RouteAccess,
}

impl RouteIntent {
    pub fn new(target: impl Into<String>, access: RouteAccess) -> Self {
        Self {
            target: target.into(),
            access,
        }
    }

    pub fn protected(target: impl Into<String>) -> Self {
        Self::new(target, RouteAccess::Protected)
    }

    pub fn guest_only(target: impl Into<String>) -> Self {
        Self::new(target, RouteAccess::GuestOnly)
    }

    pub fn public(target: impl Into<String>) -> Self {
        Self::new(target, RouteAccess::Public)
    }

    pub fn requires_auth(&self) -> bool {
        self.access == RouteAccess::Protected
    }

    pub fn is_guest_only(&self) -> bool {
        self.access == RouteAccess::GuestOnly
    }
}

/// Final outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin { redirect: String },
    RedirectToDashboard,
}

/// What to do before a decision can be made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precheck {
    Decided(Decision),
    /// The local session may be stale; ask the server first
    RefreshIdentity,
}

/// First look at a navigation, before any network call.
///
/// An authenticated visitor on a guest-only route is sent to the dashboard
/// straight away.
pub fn precheck(authenticated: bool, intent: &RouteIntent) -> Precheck {
    match (intent.access, authenticated) {
        (RouteAccess::GuestOnly, true) => Precheck::Decided(Decision::RedirectToDashboard),
        (RouteAccess::Protected, false) => Precheck::RefreshIdentity,
        _ => Precheck::Decided(Decision::Allow),
    }
}

/// Decision once the session is as fresh as it is going to get
pub fn decide(authenticated: bool, intent: &RouteIntent) -> Decision {
    match (intent.access, authenticated) {
        (RouteAccess::GuestOnly, true) => Decision::RedirectToDashboard,
        (RouteAccess::Protected, false) => Decision::RedirectToLogin {
            redirect: intent.target.clone(),
        },
        _ => Decision::Allow,
    }
}

/// State of the most recent navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Evaluating,
    Allowed,
    RedirectedToLogin { redirect: String },
    RedirectedToDashboard,
}

impl NavigationState {
    /// Where the router should go instead, if anywhere
    pub fn redirect_location(&self) -> Option<String> {
        match self {
            NavigationState::RedirectedToLogin { redirect } => Some(login_location(redirect)),
            NavigationState::RedirectedToDashboard => Some(DASHBOARD_ROUTE.to_string()),
            _ => None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationState::Allowed)
    }
}

impl From<Decision> for NavigationState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => NavigationState::Allowed,
            Decision::RedirectToLogin { redirect } => NavigationState::RedirectedToLogin { redirect },
            Decision::RedirectToDashboard => NavigationState::RedirectedToDashboard,
        }
    }
}

/// Router path plus query string, the form used as a redirect target
pub fn full_path(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        pathname.to_string()
    } else {
        format!("{}?{}", pathname, search)
    }
}

/// `/login?redirect=<target>`
pub fn login_location(redirect: &str) -> String {
    format!("{}?{}={}", LOGIN_ROUTE, REDIRECT_QUERY, Url::escape(redirect))
}

/// Where to go after a successful login.
///
/// Only same-origin paths are honoured; anything else goes to the dashboard.
pub fn post_login_target(redirect: Option<&str>) -> String {
    match redirect {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => DASHBOARD_ROUTE.to_string(),
    }
}

/// Browsers read a backslash as `/` and drop tabs and newlines, so either
/// can turn a path into `//host`.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

/// Result of [`NavigationGuard::evaluate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub attempt: u64,
    pub state: NavigationState,
}

pub struct NavigationGuard<T> {
    session: Session<T>,
    state: ArcRwSignal<NavigationState>,
    attempts: Arc<AtomicU64>,
}

impl<T> Clone for NavigationGuard<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            state: self.state.clone(),
            attempts: self.attempts.clone(),
        }
    }
}

impl<T: Transport> NavigationGuard<T> {
    pub fn new(session: Session<T>) -> Self {
        Self {
            session,
            state: ArcRwSignal::new(NavigationState::Idle),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// State of the latest attempt (tracked)
    pub fn state(&self) -> NavigationState {
        self.state.get()
    }

    /// Whether `attempt` is still the latest navigation
    pub fn is_current(&self, attempt: u64) -> bool {
        self.attempts.load(Ordering::SeqCst) == attempt
    }

    /// Run the guard for one navigation.
    ///
    /// At most one identity fetch is made, and only for a protected route
    /// entered without a session. Nothing is cached between attempts.
    pub async fn evaluate(&self, intent: &RouteIntent) -> GuardOutcome {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.set(NavigationState::Evaluating);

        let decision = match precheck(self.session.is_authenticated_untracked(), intent) {
            Precheck::Decided(decision) => decision,
            Precheck::RefreshIdentity => {
                if let Err(err) = self.session.fetch_current_user(FetchMode::Silent).await {
                    tracing::debug!(path = %intent.target, error = %err, "identity refresh failed");
                }
                decide(self.session.is_authenticated_untracked(), intent)
            }
        };

        let state = NavigationState::from(decision);
        if self.is_current(attempt) {
            self.state.set(state.clone());
        } else {
            tracing::debug!(attempt, "superseded navigation finished");
        }

        GuardOutcome { attempt, state }
    }
}
