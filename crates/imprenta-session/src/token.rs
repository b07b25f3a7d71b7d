//! Token payload decoding.
//!
//! Tokens are `<header>.<base64url(JSON payload)>.<signature>`. The client
//! only ever reads the second segment; the signature is never checked here,
//! that is the backend's job on every request.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD,
};
use base64::engine::DecodePaddingMode;
use rand::Rng;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Identity;

/// Display name used when the payload carries no `userName`.
pub const DEFAULT_NAME: &str = "Usuario Mock";

/// Role used when the payload carries no `userRole`.
pub const DEFAULT_ROLE: &str = "Administrador";

/// base64url that accepts the payload with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a token's payload could not be turned into an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    /// Fewer than two dot-separated segments.
    #[error("token has no payload segment")]
    MissingPayload,

    /// The payload segment is not base64url.
    #[error("payload is not valid base64url")]
    Base64,

    /// The decoded payload is not a JSON object of the expected shape.
    #[error("payload is not a valid claims object: {0}")]
    Json(String),

    /// The payload has no usable `userEmail`.
    #[error("payload has no user email")]
    MissingEmail,
}

/// Claims as they appear in the payload. Unknown fields (`exp`, `iat`,
/// ...) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaims {
    /// Backends disagree on whether this is a string or a number.
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_email: Option<String>,
    #[serde(default)]
    user_role: Option<String>,
}

/// Claims used to build a token, see [`encode_unsigned`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: String,
    pub user_role: Option<String>,
}

impl Claims {
    /// Claims carrying only the required email.
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            user_email: email.into(),
            ..Self::default()
        }
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.user_id {
            map.insert("userId".into(), Value::String(id.clone()));
        }
        if let Some(name) = &self.user_name {
            map.insert("userName".into(), Value::String(name.clone()));
        }
        map.insert("userEmail".into(), Value::String(self.user_email.clone()));
        if let Some(role) = &self.user_role {
            map.insert("userRole".into(), Value::String(role.clone()));
        }
        Value::Object(map)
    }
}

/// Decodes a token's payload into an [`Identity`].
///
/// Pure: no storage, no logging, no panics. Every failure along the way
/// (segments, base64, JSON, missing email) comes back as a
/// [`DecodeFailure`].
///
/// Missing or empty `userName`/`userRole` fall back to [`DEFAULT_NAME`] and
/// [`DEFAULT_ROLE`]; a missing or empty `userEmail` is a failure.
pub fn decode(token: &str) -> Result<Identity, DecodeFailure> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(DecodeFailure::MissingPayload)?;

    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|_| DecodeFailure::Base64)?;

    let claims: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| DecodeFailure::Json(e.to_string()))?;

    let email = non_empty(claims.user_email).ok_or(DecodeFailure::MissingEmail)?;

    let id = match claims.user_id {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(Identity {
        id,
        name: non_empty(claims.user_name)
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        email,
        role: non_empty(claims.user_role)
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Builds an unsigned three-segment token carrying `claims`.
///
/// The signature segment is 32 random hex characters: it only has to look
/// like one, nothing on the client verifies it. Used by the offline
/// exchange and by tests.
pub fn encode_unsigned(claims: &Claims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_json().to_string());
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    let signature: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{header}.{payload}.{signature}")
}
