//! Credential exchange: trading an email/password pair for a token.
//!
//! The [`SessionManager`](crate::SessionManager) doesn't know how tokens are
//! issued. It calls a [`CredentialExchange`]: the backend's login endpoint
//! in production ([`HttpExchange`]), an offline stand-in during development
//! ([`DevExchange`]), or a scripted fake in tests.

use std::future::Future;
use std::time::Duration;

use imprenta_protocol::{
    Codec, Credentials, ErrorPayload, JsonCodec, LoginResponse, ProtocolError,
};
use imprenta_transport::{Method, Request, Response, Transport};

use crate::SessionError;
use crate::token::{Claims, encode_unsigned};

/// Message used when a rejection carries no readable `message`.
const DEFAULT_REJECTION: &str = "invalid email or password";

/// Exchanges credentials for a raw token.
///
/// # Example
///
/// ```rust
/// use imprenta_protocol::Credentials;
/// use imprenta_session::{CredentialExchange, SessionError};
///
/// /// Accepts a single hard-coded token. Tests only!
/// struct FixedExchange(String);
///
/// impl CredentialExchange for FixedExchange {
///     async fn exchange(
///         &self,
///         _credentials: &Credentials,
///     ) -> Result<String, SessionError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait CredentialExchange: Send + Sync + 'static {
    /// Sends `credentials` to the issuer and returns the token it hands out.
    ///
    /// # Returns
    /// - `Ok(token)`: the raw, undecoded token
    /// - `Err(SessionError::AuthFailed)`: the issuer rejected the pair
    /// - any other error: the issuer couldn't be reached or answered garbage
    fn exchange(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// HttpExchange
// ---------------------------------------------------------------------------

/// Logs in against the backend's REST endpoint.
///
/// `POST <login_url>` with `{"email", "password"}`. A 2xx body may be
/// `{"token": ".."}`, a JSON string, or the bare token as text.
pub struct HttpExchange<T: Transport> {
    transport: T,
    login_url: String,
    codec: JsonCodec,
}

impl<T: Transport> HttpExchange<T> {
    pub fn new(transport: T, login_url: impl Into<String>) -> Self {
        Self {
            transport,
            login_url: login_url.into(),
            codec: JsonCodec,
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

impl<T: Transport> CredentialExchange for HttpExchange<T> {
    async fn exchange(
        &self,
        credentials: &Credentials,
    ) -> Result<String, SessionError> {
        let body = self.codec.encode(credentials)?;
        let response = self
            .transport
            .send(Request::new(Method::Post, &self.login_url).json(body))
            .await?;

        if !response.is_success() {
            let message = error_message(&response);
            tracing::info!(
                email = %credentials.email,
                status = response.status,
                "credential exchange rejected"
            );
            // 4xx is the backend saying no; 5xx is the backend failing.
            return Err(if response.status < 500 {
                SessionError::AuthFailed(
                    message.unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
                )
            } else {
                SessionError::Api {
                    status: response.status,
                    message: message.unwrap_or_else(|| response.text()),
                }
            });
        }

        let token = match self.codec.decode::<LoginResponse>(&response.body) {
            Ok(parsed) => parsed.into_token(),
            Err(_) => response.text(),
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "login response carried no token".into(),
            )
            .into());
        }
        Ok(token.to_string())
    }
}

/// Pulls the human-readable `message` out of an error body, if any.
pub(crate) fn error_message(response: &Response) -> Option<String> {
    JsonCodec
        .decode::<ErrorPayload>(&response.body)
        .ok()
        .and_then(|payload| payload.message)
        .filter(|m| !m.trim().is_empty())
}

// ---------------------------------------------------------------------------
// DevExchange
// ---------------------------------------------------------------------------

/// Email accepted by [`DevExchange`].
pub const DEV_EMAIL: &str = "admin@imprenta.com";

/// Password accepted by [`DevExchange`].
pub const DEV_PASSWORD: &str = "123456";

/// An offline exchange that knows exactly one account.
///
/// Issues an unsigned token for [`DEV_EMAIL`]/[`DEV_PASSWORD`] and rejects
/// everything else. Never use it against real data.
#[derive(Debug, Clone, Default)]
pub struct DevExchange {
    latency: Duration,
}

impl DevExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every exchange by `latency`, like a round trip would.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl CredentialExchange for DevExchange {
    async fn exchange(
        &self,
        credentials: &Credentials,
    ) -> Result<String, SessionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if credentials.email != DEV_EMAIL || credentials.password != DEV_PASSWORD {
            return Err(SessionError::AuthFailed(DEFAULT_REJECTION.to_string()));
        }

        Ok(encode_unsigned(&Claims {
            user_id: Some("101".into()),
            user_name: Some("Admin Principal".into()),
            user_email: credentials.email.clone(),
            user_role: Some("Administrador".into()),
        }))
    }
}
