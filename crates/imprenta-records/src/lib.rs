//! Client and work-order records for Imprenta.
//!
//! Each list page (clients, work orders) is a [`RecordService`]: a
//! [`RecordList`] published to the page, loaded and edited through the
//! session's authenticated gateway.
//!
//! # Key types
//!
//! - [`Record`]: what a collection needs to provide (path, id, validation,
//!   search)
//! - [`RecordList`]: items, loading flag, last error, search term
//! - [`RecordService`]: refresh/save/delete with optimistic updates
//! - [`RecordError`]: validation, missing record, or backend failure

mod error;
mod list;
mod record;
mod service;

pub use error::RecordError;
pub use list::RecordList;
pub use record::Record;
pub use service::RecordService;
