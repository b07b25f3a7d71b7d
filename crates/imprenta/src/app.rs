//! `ImprentaApp`: the process-scoped container the pages share.
//!
//! One app per process. It owns the session manager, the authenticated
//! gateway and the record services, and has an explicit lifecycle:
//!
//! ```text
//! builder() ──build()──→ [Initializing] ──init()──→ ready ──dispose()──→ gone
//! ```
//!
//! Dependents (the navigator, list pages) subscribe to the session instead
//! of reaching for globals; when the app is disposed their channels close.

use std::sync::Arc;

use imprenta_protocol::{Client, WorkOrder};
use imprenta_records::RecordService;
use imprenta_session::{
    CredentialExchange, FileTokenStore, Gateway, HttpExchange, MemoryTokenStore,
    SessionConfig, SessionError, SessionManager, SessionStatus, TokenStore,
};
use imprenta_transport::{HttpTransport, Transport};

use crate::{ClientConfig, ImprentaError, Navigator};

// ---------------------------------------------------------------------------
// AppStore
// ---------------------------------------------------------------------------

/// The token store picked by [`ClientConfig::store_path`].
#[derive(Debug, Clone)]
pub enum AppStore {
    Memory(MemoryTokenStore),
    File(FileTokenStore),
}

impl AppStore {
    /// A file store at `config.store_path`, or a memory store if unset.
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.store_path {
            Some(path) => Self::File(FileTokenStore::new(path.clone())),
            None => Self::Memory(MemoryTokenStore::new()),
        }
    }
}

impl TokenStore for AppStore {
    async fn load(&self, key: &str) -> Result<Option<String>, SessionError> {
        match self {
            Self::Memory(store) => store.load(key).await,
            Self::File(store) => store.load(key).await,
        }
    }

    async fn save(&self, key: &str, token: &str) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.save(key, token).await,
            Self::File(store) => store.save(key, token).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.remove(key).await,
            Self::File(store) => store.remove(key).await,
        }
    }
}

/// The app as wired by [`ImprentaAppBuilder::connect`].
pub type HttpApp = ImprentaApp<HttpTransport, AppStore, HttpExchange<HttpTransport>>;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for an [`ImprentaApp`].
///
/// # Example
///
/// ```rust,no_run
/// use imprenta::prelude::*;
///
/// # async fn run() -> Result<(), ImprentaError> {
/// let app = ImprentaApp::builder()
///     .config(ClientConfig::from_env()?)
///     .connect()?;
/// app.init().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImprentaAppBuilder {
    config: ClientConfig,
}

impl ImprentaAppBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the backend base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Wires the app from explicit parts.
    ///
    /// `transport` carries the gateway's requests; `exchange` issues
    /// tokens. Nothing is read from storage until [`ImprentaApp::init`].
    pub fn build<T, S, E>(
        self,
        transport: T,
        store: S,
        exchange: E,
    ) -> Result<ImprentaApp<T, S, E>, ImprentaError>
    where
        T: Transport,
        S: TokenStore,
        E: CredentialExchange,
    {
        self.config.validate()?;

        let session = Arc::new(SessionManager::new(
            store,
            exchange,
            self.config.session.clone(),
        ));
        let gateway = Arc::new(Gateway::new(
            transport,
            Arc::clone(&session),
            self.config.api_url.clone(),
        ));

        Ok(ImprentaApp {
            clients: RecordService::new(Arc::clone(&gateway)),
            work_orders: RecordService::new(Arc::clone(&gateway)),
            config: self.config,
            session,
            gateway,
        })
    }

    /// Wires the app for a real backend: HTTP for both the gateway and the
    /// login, storage per [`ClientConfig::store_path`].
    pub fn connect(self) -> Result<HttpApp, ImprentaError> {
        let transport = HttpTransport::new()?;
        let exchange = HttpExchange::new(transport.clone(), self.config.login_url());
        let store = AppStore::from_config(&self.config);
        self.build(transport, store, exchange)
    }
}

// ---------------------------------------------------------------------------
// ImprentaApp
// ---------------------------------------------------------------------------

/// The shared application state: session, gateway and list services.
pub struct ImprentaApp<T, S, E>
where
    T: Transport,
    S: TokenStore,
    E: CredentialExchange,
{
    config: ClientConfig,
    session: Arc<SessionManager<S, E>>,
    gateway: Arc<Gateway<T, S, E>>,
    clients: RecordService<Client, T, S, E>,
    work_orders: RecordService<WorkOrder, T, S, E>,
}

impl ImprentaApp<HttpTransport, AppStore, HttpExchange<HttpTransport>> {
    /// Creates a new builder.
    pub fn builder() -> ImprentaAppBuilder {
        ImprentaAppBuilder::new()
    }
}

impl<T, S, E> ImprentaApp<T, S, E>
where
    T: Transport,
    S: TokenStore,
    E: CredentialExchange,
{
    /// Restores the persisted session. Must complete before the first
    /// routing decision; [`Navigator::ready`] waits for it.
    ///
    /// Calling it again is harmless.
    pub async fn init(&self) -> SessionStatus {
        let status = self.session.restore().await;
        tracing::info!(%status, api_url = %self.config.api_url, "app initialized");
        status
    }

    /// Tears the app down. Subscribers see their channels close; in-flight
    /// requests holding their own handles finish first.
    pub fn dispose(self) {
        tracing::info!(status = %self.session.status(), "app disposed");
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager<S, E>> {
        &self.session
    }

    pub fn gateway(&self) -> &Arc<Gateway<T, S, E>> {
        &self.gateway
    }

    pub fn clients(&self) -> &RecordService<Client, T, S, E> {
        &self.clients
    }

    pub fn work_orders(&self) -> &RecordService<WorkOrder, T, S, E> {
        &self.work_orders
    }

    /// A navigator bound to this app's session.
    pub fn navigator(&self) -> Navigator {
        Navigator::new(self.session.subscribe())
    }
}
