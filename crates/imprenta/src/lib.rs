//! # Imprenta
//!
//! Session-aware client core for the Imprenta print-shop management app.
//!
//! Imprenta keeps track of who is logged in, persists the session across
//! restarts, attaches it to every backend call, logs out the moment the
//! backend rejects it, and decides which page each route may show.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imprenta::prelude::*;
//!
//! # async fn run() -> Result<(), ImprentaError> {
//! imprenta::telemetry::init_tracing("imprenta=info");
//!
//! let app = ImprentaApp::builder()
//!     .config(ClientConfig::from_env()?)
//!     .connect()?;
//! app.init().await;
//!
//! let mut navigator = app.navigator();
//! navigator.ready().await;
//! if navigator.resolve(Route::Clients) == Navigation::Redirect(Route::Login) {
//!     app.session()
//!         .login(&Credentials::new("admin@imprenta.com", "123456"))
//!         .await?;
//! }
//! app.clients().refresh().await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
mod navigator;
pub mod telemetry;

pub use app::{AppStore, HttpApp, ImprentaApp, ImprentaAppBuilder};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{ConfigError, ImprentaError};
pub use navigator::{Navigation, Navigator, Route, resolve};

pub use imprenta_protocol as protocol;
pub use imprenta_records as records;
pub use imprenta_session as session;
pub use imprenta_transport as transport;

/// The types most apps need, in one import.
pub mod prelude {
    pub use crate::{
        AppStore, ClientConfig, ConfigError, HttpApp, ImprentaApp, ImprentaAppBuilder,
        ImprentaError, Navigation, Navigator, Route,
    };
    pub use imprenta_protocol::{
        Client, ClientDraft, Credentials, WorkOrder, WorkOrderDraft,
    };
    pub use imprenta_records::{Record, RecordError, RecordList, RecordService};
    pub use imprenta_session::{
        CredentialExchange, DevExchange, FileTokenStore, Gateway, HttpExchange,
        Identity, MemoryTokenStore, SessionConfig, SessionError, SessionManager,
        SessionState, SessionStatus, TokenStore,
    };
    pub use imprenta_transport::{HttpTransport, Transport};
}
