//! Session types: what the app knows about the logged-in user.
//!
//! A [`Session`] is a token together with the [`Identity`] decoded from it.
//! The two are built in one step and only ever replaced together, so there
//! is no state where one exists without the other.

use std::fmt;

use crate::DecodeFailure;
use crate::token;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for where the session lives and how it is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Persisted-storage key holding the raw token.
    pub token_key: String,

    /// Header that carries the token, verbatim, on protected requests.
    pub credential_header: String,

    /// Path of the credential exchange, relative to the API URL.
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "authToken".to_string(),
            credential_header: "x-auth-token".to_string(),
            login_path: "/auth/login".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Who is logged in, as claimed by the token's payload.
///
/// Never stored on its own: always derived by decoding a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Backend user id, when the token carries one.
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A decoded bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    identity: Identity,
}

impl Session {
    /// Decodes `token` and pairs it with the resulting identity.
    ///
    /// # Errors
    /// Returns the [`DecodeFailure`] if the payload can't be decoded.
    pub fn new(token: String) -> Result<Self, DecodeFailure> {
        let identity = token::decode(&token)?;
        Ok(Self { token, identity })
    }

    /// The raw token, as presented to the backend.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The identity decoded from the token.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SessionState / SessionStatus
// ---------------------------------------------------------------------------

/// The coarse status routing decisions are made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Persisted storage has not been consulted yet.
    Initializing,
    Unauthenticated,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "Initializing"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticated => write!(f, "Authenticated"),
        }
    }
}

/// The full session state, as published to subscribers.
///
/// ```text
///   Initializing ──(restore)──→ Authenticated ⇄ Unauthenticated
///        │                           (login / logout)
///        └──────(restore)──→ Unauthenticated
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Initializing,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    /// The status this state maps to.
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Initializing => SessionStatus::Initializing,
            Self::Unauthenticated => SessionStatus::Unauthenticated,
            Self::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    /// `false` only while still `Initializing`.
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Initializing)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session().map(Session::identity)
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(Session::token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Claims, encode_unsigned};

    #[test]
    fn test_session_new_decodes_identity() {
        let token = encode_unsigned(&Claims::for_email("a@b.c"));
        let session = Session::new(token.clone()).expect("should decode");
        assert_eq!(session.token(), token);
        assert_eq!(session.identity().email, "a@b.c");
    }

    #[test]
    fn test_session_new_rejects_malformed_token() {
        assert!(Session::new("not-a-jwt".into()).is_err());
    }

    #[test]
    fn test_session_debug_hides_token() {
        let token = encode_unsigned(&Claims::for_email("a@b.c"));
        let session = Session::new(token.clone()).unwrap();
        let debug = format!("{session:?}");
        assert!(!debug.contains(&token));
        assert!(debug.contains("a@b.c"));
    }

    #[test]
    fn test_state_accessors_agree_with_status() {
        let token = encode_unsigned(&Claims::for_email("a@b.c"));
        let authed = SessionState::Authenticated(Session::new(token).unwrap());

        for state in [
            SessionState::Initializing,
            SessionState::Unauthenticated,
            authed,
        ] {
            let has_session = state.status() == SessionStatus::Authenticated;
            assert_eq!(state.identity().is_some(), has_session);
            assert_eq!(state.token().is_some(), has_session);
        }
    }

    #[test]
    fn test_state_is_ready() {
        assert!(!SessionState::Initializing.is_ready());
        assert!(SessionState::Unauthenticated.is_ready());
    }

    #[test]
    fn test_state_default_is_initializing() {
        assert_eq!(SessionState::default().status(), SessionStatus::Initializing);
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.token_key, "authToken");
        assert_eq!(config.credential_header, "x-auth-token");
        assert_eq!(config.login_path, "/auth/login");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Authenticated.to_string(), "Authenticated");
        assert_eq!(SessionStatus::Initializing.to_string(), "Initializing");
    }
}
