//! HTTP transport implementation using `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{Method, Request, RequestId, Response, Transport, TransportError};

/// Counter for generating unique request IDs.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Per-request timeout applied by [`HttpTransport::new`].
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Setup(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Wraps an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let id =
            RequestId::new(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed));
        let method = request.method;
        tracing::debug!(%id, %method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(reqwest::Method::from(method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::TimedOut
            } else {
                TransportError::SendFailed(Box::new(e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed(Box::new(e)))?;

        tracing::debug!(%id, status, bytes = body.len(), "response received");
        Ok(Response {
            status,
            body: body.to_vec(),
        })
    }
}
