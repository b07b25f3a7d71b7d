//! Integration tests for the `ImprentaApp` container, end to end.
//!
//! An `axum` server plays the backend (login plus a guarded client
//! collection); the app is wired with [`ImprentaAppBuilder::connect`], so
//! the real HTTP transport, exchange and file store are exercised.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use imprenta::prelude::*;
use imprenta::session::{Claims, encode_unsigned};
use serde_json::{Value, json};

// =========================================================================
// Fake backend
// =========================================================================

#[derive(Clone, Default)]
struct Backend {
    valid_token: Arc<Mutex<Option<String>>>,
}

async fn login(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body["email"] != "admin@imprenta.com" || body["password"] != "123456" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Credenciales invalidas" })),
        );
    }
    let token = encode_unsigned(&Claims {
        user_name: Some("Admin Principal".into()),
        user_role: Some("Administrador".into()),
        ..Claims::for_email("admin@imprenta.com")
    });
    *backend.valid_token.lock().unwrap() = Some(token.clone());
    (StatusCode::OK, Json(json!({ "token": token })))
}

async fn clients(
    State(backend): State<Backend>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let presented = headers.get("x-auth-token").and_then(|v| v.to_str().ok());
    let valid = backend.valid_token.lock().unwrap().clone();
    if presented.is_none() || presented != valid.as_deref() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token invalido" })));
    }
    (
        StatusCode::OK,
        Json(json!([
            { "id": "1", "nombre": "Ramiro", "empresa": "Impresiones",
              "telefono": "11-1111-2222", "email": "rama@gmail.com", "direccion": "Calle 1" },
            { "id": "2", "nombre": "Hector Gonzales", "empresa": "Papelera",
              "telefono": "11-1122-2222", "email": "hector@gmail.com", "direccion": "Avenia 12" }
        ])),
    )
}

async fn start_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/clientes", get(clients))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

fn config(api_url: &str, dir: &tempfile::TempDir) -> ClientConfig {
    ClientConfig {
        api_url: api_url.to_string(),
        store_path: Some(dir.path().join("session.json")),
        ..ClientConfig::default()
    }
}

fn admin() -> Credentials {
    Credentials::new("admin@imprenta.com", "123456")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_fresh_install_routes_to_login_then_home() {
    imprenta::telemetry::init_tracing("imprenta=debug");
    let api_url = start_backend(Backend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let app = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    let mut navigator = app.navigator();

    assert_eq!(navigator.resolve(Route::Home), Navigation::Loading);
    assert_eq!(app.init().await, SessionStatus::Unauthenticated);
    assert_eq!(navigator.ready().await, Some(SessionStatus::Unauthenticated));
    assert_eq!(
        navigator.resolve(Route::Clients),
        Navigation::Redirect(Route::Login)
    );

    let identity = app.session().login(&admin()).await.unwrap();
    assert_eq!(identity.name, "Admin Principal");
    assert_eq!(navigator.resolve(Route::Login), Navigation::Redirect(Route::Home));
    assert_eq!(navigator.resolve(Route::Clients), Navigation::Render(Route::Clients));
}

#[tokio::test]
async fn test_restart_restores_session_and_loads_clients() {
    let api_url = start_backend(Backend::default()).await;
    let dir = tempfile::tempdir().unwrap();

    let first = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    first.init().await;
    first.session().login(&admin()).await.unwrap();
    first.dispose();

    let second = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    assert_eq!(second.init().await, SessionStatus::Authenticated);

    let count = second.clients().refresh().await.unwrap();

    assert_eq!(count, 2);
    second.clients().set_search("papel");
    let list = second.clients().list();
    assert_eq!(list.filtered()[0].name, "Hector Gonzales");
}

#[tokio::test]
async fn test_rejected_request_sends_navigator_to_login() {
    let backend = Backend::default();
    let api_url = start_backend(backend.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let app = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    app.init().await;
    app.session().login(&admin()).await.unwrap();
    let mut navigator = app.navigator();

    // The backend forgets the token: the next call comes back 401.
    *backend.valid_token.lock().unwrap() = None;
    let err = app.clients().refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(app.clients().list().is_empty());
    let nav = tokio::time::timeout(Duration::from_secs(1), navigator.next(Route::Clients))
        .await
        .expect("navigator should see the logout");
    assert_eq!(nav, Some(Navigation::Redirect(Route::Login)));
    assert_eq!(
        app.session().store().load(&app.config().session.token_key).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_logout_leaves_no_records_for_next_user() {
    let api_url = start_backend(Backend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let app = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    app.init().await;
    app.session().login(&admin()).await.unwrap();
    assert_eq!(app.clients().refresh().await.unwrap(), 2);
    let mut rx = app.clients().subscribe();

    app.session().logout().await;

    let cleared = tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|l| l.is_empty()))
        .await
        .expect("clients should be cleared after logout")
        .is_ok();
    assert!(cleared);
    assert_eq!(app.session().status(), SessionStatus::Unauthenticated);
    assert!(app.work_orders().list().is_empty());
}

#[tokio::test]
async fn test_dispose_closes_subscriptions() {
    let api_url = start_backend(Backend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let app = ImprentaApp::builder()
        .config(config(&api_url, &dir))
        .connect()
        .unwrap();
    app.init().await;
    let mut rx = app.session().subscribe();
    let mut navigator = app.navigator();

    app.dispose();

    assert!(rx.changed().await.is_err());
    assert_eq!(navigator.next(Route::Home).await, None);
}

#[tokio::test]
async fn test_build_with_empty_api_url_fails() {
    let result = ImprentaApp::builder().api_url("").connect();
    assert!(matches!(
        result,
        Err(ImprentaError::Config(ConfigError::EmptyApiUrl))
    ));
}

#[tokio::test]
async fn test_build_offline_with_dev_exchange() {
    let app = ImprentaAppBuilder::new()
        .build(
            HttpTransport::new().unwrap(),
            MemoryTokenStore::new(),
            DevExchange::new(),
        )
        .unwrap();
    app.init().await;

    let identity = app.session().login(&admin()).await.unwrap();

    assert_eq!(identity.role, "Administrador");
    assert_eq!(app.session().status(), SessionStatus::Authenticated);
}
