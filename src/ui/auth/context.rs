//! Session context for the component tree
//!
//! One [`Session`] and one [`NavigationGuard`] are built at startup and shared
//! through Leptos context. On the client the first identity check starts as
//! soon as the app mounts; route guards wait for it to settle.

use std::sync::Arc;

use leptos::prelude::*;

use crate::core::config::Config;
use crate::core::guard::NavigationGuard;
use crate::core::http::{DefaultTransport, HttpClient, TransportError, default_transport};
use crate::core::session::Session;

pub type AppSession = Session<DefaultTransport>;
pub type AppGuard = NavigationGuard<DefaultTransport>;

/// Session plus the guard bound to it
#[derive(Clone)]
pub struct SessionContext {
    pub session: AppSession,
    pub guard: AppGuard,
}

/// Provide session context to the component tree.
///
/// Fails only when the transport cannot be built, e.g. for an invalid base URL.
pub fn provide_session_context(config: Config) -> Result<SessionContext, TransportError> {
    let transport = default_transport(&config).inspect_err(|err| {
        tracing::error!(error = %err, api_base_url = %config.api_base_url, "cannot build HTTP transport");
    })?;
    let http = Arc::new(HttpClient::new(config, transport));
    let session = Session::new(http);
    let guard = NavigationGuard::new(session.clone());

    let ctx = SessionContext { session, guard };

    #[cfg(feature = "hydrate")]
    {
        use crate::core::session::FetchMode;
        use leptos::task::spawn_local;

        let session = ctx.session.clone();
        Effect::new(move |_| {
            let session = session.clone();
            spawn_local(async move {
                // no session yet is the common case on first load
                let _ = session.fetch_current_user(FetchMode::Silent).await;
            });
        });
    }

    provide_context(ctx.clone());
    Ok(ctx)
}

/// Get session context from the component tree
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

#[cfg(all(test, feature = "ssr", not(feature = "hydrate")))]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_is_reported_not_panicked() {
        let owner = Owner::new();
        owner.with(|| {
            assert!(provide_session_context(Config::new("not a url")).is_err());
            assert!(use_context::<SessionContext>().is_none());

            assert!(provide_session_context(Config::default()).is_ok());
            assert!(use_context::<SessionContext>().is_some());
        });
    }
}
