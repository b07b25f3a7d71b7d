//! Integration tests for the HTTP transport.
//!
//! These spin up a real `axum` server on a random port and drive it
//! through [`HttpTransport`], so headers, bodies and status codes are
//! checked on the wire rather than in isolation.

#[cfg(feature = "http")]
mod http {
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use axum::Router;
    use imprenta_transport::{
        HttpTransport, Method, Request, Transport, TransportError,
    };

    async fn echo(body: Bytes) -> (StatusCode, Bytes) {
        (StatusCode::CREATED, body)
    }

    async fn auth_header(headers: HeaderMap) -> String {
        headers
            .get("x-auth-token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn content_type(headers: HeaderMap) -> String {
        headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn rejected() -> (StatusCode, &'static str) {
        (StatusCode::UNAUTHORIZED, r#"{"message":"token invalido"}"#)
    }

    async fn gone() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    /// Starts a server on a random port and returns its base URL.
    async fn start_server() -> String {
        let app = Router::new()
            .route("/echo", post(echo))
            .route("/whoami", get(auth_header))
            .route("/content-type", post(content_type))
            .route("/private", get(rejected))
            .route("/items/{id}", delete(gone));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    fn transport() -> HttpTransport {
        HttpTransport::new().expect("client should build")
    }

    #[tokio::test]
    async fn test_send_post_body_round_trips() {
        let base = start_server().await;

        let resp = transport()
            .send(
                Request::new(Method::Post, format!("{base}/echo"))
                    .json(br#"{"nombre":"Ramiro"}"#.to_vec()),
            )
            .await
            .expect("should send");

        assert_eq!(resp.status, 201);
        assert_eq!(resp.text(), r#"{"nombre":"Ramiro"}"#);
    }

    #[tokio::test]
    async fn test_send_attaches_headers_verbatim() {
        let base = start_server().await;

        let resp = transport()
            .send(
                Request::new(Method::Get, format!("{base}/whoami"))
                    .header("x-auth-token", "aaa.bbb.ccc"),
            )
            .await
            .expect("should send");

        assert!(resp.is_success());
        assert_eq!(resp.text(), "aaa.bbb.ccc");
    }

    #[tokio::test]
    async fn test_send_json_sets_content_type() {
        let base = start_server().await;

        let resp = transport()
            .send(
                Request::new(Method::Post, format!("{base}/content-type"))
                    .json(b"{}".to_vec()),
            )
            .await
            .expect("should send");

        assert_eq!(resp.text(), "application/json");
    }

    #[tokio::test]
    async fn test_send_unauthorized_is_a_response_not_an_error() {
        // Status codes are the caller's business; the transport only
        // fails when it cannot talk to the server.
        let base = start_server().await;

        let resp = transport()
            .send(Request::new(Method::Get, format!("{base}/private")))
            .await
            .expect("should send");

        assert!(resp.is_unauthorized());
        assert!(resp.text().contains("token invalido"));
    }

    #[tokio::test]
    async fn test_send_delete_with_empty_body() {
        let base = start_server().await;

        let resp = transport()
            .send(Request::new(Method::Delete, format!("{base}/items/3")))
            .await
            .expect("should send");

        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());
    }

    #[tokio::test]
    async fn test_send_unknown_route_returns_404() {
        let base = start_server().await;

        let resp = transport()
            .send(Request::new(Method::Get, format!("{base}/nope")))
            .await
            .expect("should send");

        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn test_send_connection_refused_returns_send_failed() {
        // Bind to grab a free port, then close it so nothing listens.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        drop(listener);

        let result = transport()
            .send(Request::new(Method::Get, format!("http://{addr}/")))
            .await;

        assert!(
            matches!(result, Err(TransportError::SendFailed(_))),
            "expected SendFailed, got {result:?}"
        );
    }
}
