//! Wire protocol for the Imprenta backend.
//!
//! - **Types** ([`Credentials`], [`Client`], [`WorkOrder`], ...): the
//!   bodies that travel between the app and the REST API.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! ```text
//! Transport (bytes) → Protocol (typed bodies) → Session / Records
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Client, ClientDraft, Credentials, ErrorPayload, LoginResponse,
    PENDING_STATUS, WorkOrder, WorkOrderDraft,
};
