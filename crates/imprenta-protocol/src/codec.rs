//! Codec trait and implementations for request and response bodies.
//!
//! The gateway never calls `serde_json` directly; it goes through a
//! [`Codec`] so the body format is decided in one place.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values into request bodies and decodes response bodies.
///
/// `Send + Sync + 'static` because a codec lives inside the gateway,
/// which is shared across tasks for the whole run.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the format the
/// backend speaks.
///
/// ## Example
///
/// ```rust
/// use imprenta_protocol::{Client, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let client = Client {
///     id: "1".into(),
///     name: "Ramiro".into(),
///     company: "Impresiones".into(),
///     phone: "11-1111-2222".into(),
///     email: "rama@gmail.com".into(),
///     address: "Calle 1".into(),
/// };
///
/// let bytes = codec.encode(&client).unwrap();
/// let decoded: Client = codec.decode(&bytes).unwrap();
/// assert_eq!(client, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ErrorPayload, WorkOrder};

    #[test]
    fn test_decode_malformed_json_returns_decode_error() {
        let result: Result<WorkOrder, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_decode_error() {
        let result: Result<WorkOrder, _> = JsonCodec.decode(br#"[1, 2]"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_error_payload_message() {
        let payload: ErrorPayload = JsonCodec
            .decode(br#"{"message":"Credenciales invalidas","code":401}"#)
            .expect("should decode");
        assert_eq!(payload.message.as_deref(), Some("Credenciales invalidas"));
    }
}
