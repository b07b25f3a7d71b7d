//! The session manager: owns the current token and everything derived from it.
//!
//! Responsibilities:
//! - Restoring the persisted token once at startup
//! - Logging in through a [`CredentialExchange`] and persisting the result
//! - Logging out (memory and storage, never fails)
//! - Publishing every state change to subscribers
//!
//! # Concurrency note
//!
//! State lives in a `tokio::sync::watch` channel, so readers always see a
//! whole [`SessionState`]: a token never shows up without its identity.
//! `restore`, `login` and `logout` are additionally serialized by an
//! operation lock so storage and memory can't interleave; the last one to
//! run wins.

use imprenta_protocol::Credentials;
use tokio::sync::{Mutex, watch};

use crate::{
    CredentialExchange, Identity, Session, SessionConfig, SessionError,
    SessionState, SessionStatus, TokenStore,
};

/// Owns the session for one application run.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Initializing] ──restore()──→ [Authenticated] ⇄ [Unauthenticated]
///                                  │            login() / logout()
///                                  └──────────→ [Unauthenticated]
/// ```
pub struct SessionManager<S: TokenStore, E: CredentialExchange> {
    store: S,
    exchange: E,
    config: SessionConfig,

    /// The current state. The sender keeps the latest value even with no
    /// receivers alive, so it doubles as the in-memory cell.
    state: watch::Sender<SessionState>,

    /// Serializes restore/login/logout.
    ops: Mutex<()>,
}

impl<S: TokenStore, E: CredentialExchange> SessionManager<S, E> {
    /// Creates a manager in the `Initializing` state. Nothing is read from
    /// storage until [`restore`](Self::restore) runs.
    pub fn new(store: S, exchange: E, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Initializing);
        Self {
            store,
            exchange,
            config,
            state,
            ops: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The persisted storage this manager writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a receiver that observes every state change.
    ///
    /// The receiver starts out with the current state marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A snapshot of the full state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// The raw token to present on protected requests.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// Loads the persisted token and leaves `Initializing`.
    ///
    /// Only the first call does anything: once the state has left
    /// `Initializing` (by an earlier restore, or a login that raced ahead),
    /// this returns the current status without touching storage.
    ///
    /// A stored token that fails to decode, or a storage cell that can't be
    /// read at all, is purged and the session ends up `Unauthenticated`.
    pub async fn restore(&self) -> SessionStatus {
        let _op = self.ops.lock().await;
        if self.state.borrow().is_ready() {
            tracing::debug!("restore skipped, session already resolved");
            return self.status();
        }

        let key = &self.config.token_key;
        let next = match self.store.load(key).await {
            Ok(None) => {
                tracing::debug!("no stored session");
                SessionState::Unauthenticated
            }
            Ok(Some(token)) => match Session::new(token) {
                Ok(session) => {
                    tracing::info!(
                        email = %session.identity().email,
                        role = %session.identity().role,
                        "session restored"
                    );
                    SessionState::Authenticated(session)
                }
                Err(failure) => {
                    tracing::warn!(%failure, "stored token unreadable, purging");
                    self.purge().await;
                    SessionState::Unauthenticated
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "token storage unreadable, purging");
                self.purge().await;
                SessionState::Unauthenticated
            }
        };

        self.state.send_replace(next);
        self.status()
    }

    /// Exchanges `credentials` for a token and makes it the session.
    ///
    /// Replaces any existing session entirely.
    ///
    /// # Errors
    /// - [`SessionError::AuthFailed`]: empty credentials, or the exchange
    ///   said no. The session is left as it was.
    /// - [`SessionError::TokenDecode`]: the exchange issued a token we
    ///   can't read. The session is forced to `Unauthenticated` and nothing
    ///   is persisted.
    /// - [`SessionError::Transport`] / `Api` / `Protocol`: the exchange
    ///   couldn't be completed. The session is left as it was.
    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, SessionError> {
        if credentials.is_incomplete() {
            return Err(SessionError::AuthFailed(
                "email and password are required".into(),
            ));
        }

        let _op = self.ops.lock().await;

        let token = match self.exchange.exchange(credentials).await {
            Ok(token) => token,
            Err(e) => {
                tracing::info!(email = %credentials.email, error = %e, "login failed");
                return Err(e);
            }
        };

        let session = match Session::new(token) {
            Ok(session) => session,
            Err(failure) => {
                tracing::warn!(
                    email = %credentials.email,
                    %failure,
                    "issued token could not be decoded"
                );
                self.purge().await;
                self.state.send_replace(SessionState::Unauthenticated);
                return Err(SessionError::TokenDecode(failure));
            }
        };

        // A session that can't be persisted still works for this run; it
        // just won't survive a restart.
        if let Err(e) =
            self.store.save(&self.config.token_key, session.token()).await
        {
            tracing::warn!(error = %e, "could not persist session token");
        }

        let identity = session.identity().clone();
        self.state.send_replace(SessionState::Authenticated(session));
        tracing::info!(email = %identity.email, role = %identity.role, "login succeeded");
        Ok(identity)
    }

    /// Clears the session from memory and storage.
    ///
    /// Never fails. Calling it while already logged out changes nothing and
    /// doesn't notify subscribers.
    pub async fn logout(&self) {
        let _op = self.ops.lock().await;
        self.purge().await;
        let changed = self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Unauthenticated) {
                false
            } else {
                *state = SessionState::Unauthenticated;
                true
            }
        });
        if changed {
            tracing::info!("logged out");
        }
    }

    /// Logs out only if `token` is still the current one.
    ///
    /// Used when the backend rejects a token: a rejection that arrives after
    /// the user has logged in again must not end the newer session.
    /// Returns whether the session was ended.
    pub async fn expire(&self, token: &str) -> bool {
        let _op = self.ops.lock().await;
        if self.state.borrow().token() != Some(token) {
            tracing::debug!("rejected token is no longer current, keeping session");
            return false;
        }
        self.purge().await;
        self.state.send_replace(SessionState::Unauthenticated);
        tracing::info!("session expired");
        true
    }

    /// Deletes the persisted token, logging (not returning) failures.
    async fn purge(&self) {
        if let Err(e) = self.store.remove(&self.config.token_key).await {
            tracing::warn!(error = %e, "could not remove stored token");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
