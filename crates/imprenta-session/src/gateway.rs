//! Authenticated requests against the backend's protected resources.
//!
//! Every call carries the current token in the credential header. A 401
//! answer is the one signal that the token is no longer good: the gateway
//! logs the session out before handing [`SessionError::Unauthorized`] back,
//! so every subscriber (the navigator included) reacts at once. A late 401
//! for a token that has since been replaced by a new login leaves the new
//! session alone.
//!
//! No retries and no backoff: a failed call surfaces once to its caller.

use std::sync::Arc;

use imprenta_protocol::{Codec, JsonCodec};
use imprenta_transport::{Method, Request, Response, Transport};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::error_message;
use crate::{CredentialExchange, SessionError, SessionManager, TokenStore};

/// Sends JSON requests on behalf of the logged-in user.
pub struct Gateway<T: Transport, S: TokenStore, E: CredentialExchange> {
    transport: T,
    session: Arc<SessionManager<S, E>>,
    api_url: String,
    codec: JsonCodec,
}

impl<T: Transport, S: TokenStore, E: CredentialExchange> Gateway<T, S, E> {
    /// `api_url` is the base every request path is joined onto, e.g.
    /// `http://localhost:3000/api`.
    pub fn new(
        transport: T,
        session: Arc<SessionManager<S, E>>,
        api_url: impl Into<String>,
    ) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            session,
            api_url,
            codec: JsonCodec,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager<S, E>> {
        &self.session
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// The absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// `GET path`, decoding the body as `R`.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<R, SessionError> {
        let response = self.call(Method::Get, path, None).await?;
        Ok(self.codec.decode(&response.body)?)
    }

    /// `POST path` with `body`, decoding the created resource as `R`.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, SessionError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let bytes = self.codec.encode(body)?;
        let response = self.call(Method::Post, path, Some(bytes)).await?;
        Ok(self.codec.decode(&response.body)?)
    }

    /// `PUT path` with `body`.
    ///
    /// Some endpoints answer an update with no body at all, so the decoded
    /// resource is `None` when the body is empty.
    pub async fn put<B, R>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<R>, SessionError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let bytes = self.codec.encode(body)?;
        let response = self.call(Method::Put, path, Some(bytes)).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(self.codec.decode(&response.body)?))
    }

    /// `DELETE path`. Any body in the answer is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), SessionError> {
        self.call(Method::Delete, path, None).await?;
        Ok(())
    }

    /// Sends one authenticated request and maps the status.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, SessionError> {
        let Some(token) = self.session.token() else {
            tracing::debug!(%method, path, "request without session refused");
            return Err(SessionError::NotAuthenticated);
        };

        let header = &self.session.config().credential_header;
        let mut request =
            Request::new(method, self.url(path)).header(header.as_str(), token.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.transport.send(request).await?;

        if response.is_unauthorized() {
            tracing::warn!(%method, path, "token rejected");
            self.session.expire(&token).await;
            return Err(SessionError::Unauthorized);
        }
        if !response.is_success() {
            let message = error_message(&response).unwrap_or_else(|| response.text());
            tracing::debug!(%method, path, status = response.status, %message, "request failed");
            return Err(SessionError::Api {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }
}
