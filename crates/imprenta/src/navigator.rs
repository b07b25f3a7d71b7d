//! Guarded navigation: which page a route shows for the current session.
//!
//! The rules are a pure function of ([`SessionStatus`], [`Route`]), see
//! [`resolve`]. [`Navigator`] applies them to a live session and holds
//! off until the persisted session has been restored, so the first
//! decision is never made on a guess.

use std::fmt;

use imprenta_session::{SessionState, SessionStatus};
use tokio::sync::watch;

/// The app's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The unauthenticated entry point.
    Login,
    /// The dashboard.
    Home,
    Clients,
    WorkOrders,
    Reports,
}

impl Route {
    /// Where an authenticated user lands after logging in.
    pub const LANDING: Route = Route::Home;

    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Home,
        Route::Clients,
        Route::WorkOrders,
        Route::Reports,
    ];

    /// `true` for every page that needs a session.
    pub fn is_protected(self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Clients => "/clients",
            Route::WorkOrders => "/pedidos",
            Route::Reports => "/reportes",
        }
    }

    /// The route for `path`, ignoring a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to do when `route` is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The session isn't known yet: show a neutral placeholder.
    Loading,
    /// Show the requested page.
    Render(Route),
    /// Go somewhere else instead.
    Redirect(Route),
}

/// Routing rules.
///
/// | status | protected route | login route |
/// |--------|-----------------|-------------|
/// | `Initializing` | `Loading` | `Loading` |
/// | `Unauthenticated` | redirect to login | render |
/// | `Authenticated` | render | redirect to [`Route::LANDING`] |
pub fn resolve(status: SessionStatus, route: Route) -> Navigation {
    match (status, route.is_protected()) {
        (SessionStatus::Initializing, _) => Navigation::Loading,
        (SessionStatus::Unauthenticated, true) => Navigation::Redirect(Route::Login),
        (SessionStatus::Unauthenticated, false) => Navigation::Render(route),
        (SessionStatus::Authenticated, true) => Navigation::Render(route),
        (SessionStatus::Authenticated, false) => Navigation::Redirect(Route::LANDING),
    }
}

/// Routes against a live session.
///
/// Holds only a receiver: it never keeps the session alive on its own.
#[derive(Debug, Clone)]
pub struct Navigator {
    state: watch::Receiver<SessionState>,
}

impl Navigator {
    pub fn new(state: watch::Receiver<SessionState>) -> Self {
        Self { state }
    }

    /// Waits until the session has left `Initializing` and returns the
    /// status it settled on.
    ///
    /// `None` if the app was disposed before that happened.
    pub async fn ready(&mut self) -> Option<SessionStatus> {
        match self.state.wait_for(SessionState::is_ready).await {
            Ok(state) => Some(state.status()),
            Err(_) => None,
        }
    }

    /// The current session status.
    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Resolves `route` against the current status.
    pub fn resolve(&self, route: Route) -> Navigation {
        resolve(self.status(), route)
    }

    /// Waits for the next session change and resolves `route` against it.
    ///
    /// This is how a page notices a logout triggered elsewhere (a 401 on
    /// another request, for one). `None` once the app is disposed.
    pub async fn next(&mut self, route: Route) -> Option<Navigation> {
        self.state.changed().await.ok()?;
        let status = self.state.borrow_and_update().status();
        Some(resolve(status, route))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use imprenta_session::{Claims, Session, encode_unsigned};

    use super::*;

    fn authenticated() -> SessionState {
        let token = encode_unsigned(&Claims::for_email("admin@imprenta.com"));
        SessionState::Authenticated(Session::new(token).unwrap())
    }

    // =====================================================================
    // resolve()
    // =====================================================================

    #[test]
    fn test_resolve_initializing_is_loading_for_every_route() {
        for route in Route::ALL {
            assert_eq!(resolve(SessionStatus::Initializing, route), Navigation::Loading);
        }
    }

    #[test]
    fn test_resolve_unauthenticated_protected_redirects_to_login() {
        for route in [Route::Home, Route::Clients, Route::WorkOrders, Route::Reports] {
            assert_eq!(
                resolve(SessionStatus::Unauthenticated, route),
                Navigation::Redirect(Route::Login)
            );
        }
    }

    #[test]
    fn test_resolve_unauthenticated_login_renders() {
        assert_eq!(
            resolve(SessionStatus::Unauthenticated, Route::Login),
            Navigation::Render(Route::Login)
        );
    }

    #[test]
    fn test_resolve_authenticated_protected_renders() {
        assert_eq!(
            resolve(SessionStatus::Authenticated, Route::Clients),
            Navigation::Render(Route::Clients)
        );
    }

    #[test]
    fn test_resolve_authenticated_login_redirects_to_landing() {
        assert_eq!(
            resolve(SessionStatus::Authenticated, Route::Login),
            Navigation::Redirect(Route::Home)
        );
    }

    // =====================================================================
    // Route
    // =====================================================================

    #[test]
    fn test_route_from_path_round_trips() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/clients/"), Some(Route::Clients));
        assert_eq!(Route::from_path(""), Some(Route::Home));
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn test_only_login_is_unprotected() {
        let open: Vec<Route> = Route::ALL.into_iter().filter(|r| !r.is_protected()).collect();
        assert_eq!(open, vec![Route::Login]);
    }

    // =====================================================================
    // Navigator
    // =====================================================================

    #[tokio::test]
    async fn test_ready_waits_for_restore() {
        let (tx, rx) = watch::channel(SessionState::Initializing);
        let mut navigator = Navigator::new(rx);
        assert_eq!(navigator.resolve(Route::Clients), Navigation::Loading);

        let waiter = tokio::spawn(async move {
            let status = navigator.ready().await;
            (status, navigator.resolve(Route::Clients))
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send_replace(authenticated());

        let (status, nav) = waiter.await.unwrap();
        assert_eq!(status, Some(SessionStatus::Authenticated));
        assert_eq!(nav, Navigation::Render(Route::Clients));
    }

    #[tokio::test]
    async fn test_ready_returns_immediately_when_resolved() {
        let (_tx, rx) = watch::channel(SessionState::Unauthenticated);
        let mut navigator = Navigator::new(rx);
        assert_eq!(navigator.ready().await, Some(SessionStatus::Unauthenticated));
    }

    #[tokio::test]
    async fn test_ready_after_dispose_returns_none() {
        let (tx, rx) = watch::channel(SessionState::Initializing);
        let mut navigator = Navigator::new(rx);
        drop(tx);
        assert_eq!(navigator.ready().await, None);
    }

    #[tokio::test]
    async fn test_next_sees_logout() {
        let (tx, rx) = watch::channel(authenticated());
        let mut navigator = Navigator::new(rx);

        tx.send_replace(SessionState::Unauthenticated);

        assert_eq!(
            navigator.next(Route::WorkOrders).await,
            Some(Navigation::Redirect(Route::Login))
        );
    }
}
