//! Session lifecycle for Imprenta.
//!
//! This crate owns everything about "who is logged in":
//!
//! 1. **Credential exchange**: trading email/password for a token
//!    ([`CredentialExchange`] trait, [`HttpExchange`], [`DevExchange`])
//! 2. **Token decoding**: reading the identity out of the token's payload
//!    ([`decode`])
//! 3. **Persistence**: keeping the token across restarts ([`TokenStore`])
//! 4. **Session state**: restore/login/logout and change notification
//!    ([`SessionManager`])
//! 5. **Authenticated requests**: attaching the token and reacting to 401
//!    ([`Gateway`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Records / App (above)  ← use the gateway, watch the session
//!     ↕
//! Session Layer (this crate)  ← token, identity, authenticated calls
//!     ↕
//! Protocol + Transport (below)  ← typed bodies over HTTP
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod gateway;
mod manager;
mod session;
mod store;
mod token;

pub use auth::{CredentialExchange, DEV_EMAIL, DEV_PASSWORD, DevExchange, HttpExchange};
pub use error::SessionError;
pub use gateway::Gateway;
pub use manager::SessionManager;
pub use session::{Identity, Session, SessionConfig, SessionState, SessionStatus};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{Claims, DEFAULT_NAME, DEFAULT_ROLE, DecodeFailure, decode, encode_unsigned};
