//! The `Record` trait: what a backend collection looks like to the list.
//!
//! Implemented here for the two collections the app manages, [`Client`]
//! and [`WorkOrder`]. Adding a collection means one more impl; the list and
//! the service are generic over it.

use std::fmt::Display;

use imprenta_protocol::{Client, ClientDraft, WorkOrder, WorkOrderDraft};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record kept in a backend collection.
///
/// - `Id` is what the backend keys the record by (a string for clients,
///   a number for work orders).
/// - `Draft` is what the form submits: every editable field, no id.
pub trait Record:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Id: Clone + PartialEq + Display + Send + Sync + 'static;
    type Draft: Clone + Send + Sync + Serialize + 'static;

    /// Human-readable name used in errors and logs.
    const KIND: &'static str;

    /// Collection path relative to the API URL.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Builds the record the draft would produce under `id`. Used to show
    /// an update before the server confirms it.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    /// Form validation, run before anything is sent.
    ///
    /// Returns the reason the draft can't be submitted.
    fn validate(draft: &Self::Draft) -> Result<(), String>;

    /// `true` if the record matches a search term. `needle` is already
    /// lowercased and non-empty.
    fn matches(&self, needle: &str) -> bool;

    /// Path of a single record.
    fn path(id: &Self::Id) -> String {
        format!("{}/{}", Self::COLLECTION, id)
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

impl Record for Client {
    type Id = String;
    type Draft = ClientDraft;

    const KIND: &'static str = "client";
    const COLLECTION: &'static str = "/clientes";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn from_draft(id: String, draft: ClientDraft) -> Self {
        Client::from_draft(id, draft)
    }

    fn validate(draft: &ClientDraft) -> Result<(), String> {
        require(&draft.name, "name")?;
        require(&draft.email, "email")?;
        if !draft.email.contains('@') {
            return Err("email is not valid".into());
        }
        Ok(())
    }

    /// Name or company.
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle) || contains(&self.company, needle)
    }
}

impl Record for WorkOrder {
    type Id = u64;
    type Draft = WorkOrderDraft;

    const KIND: &'static str = "work order";
    const COLLECTION: &'static str = "/pedidos";

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: WorkOrderDraft) -> Self {
        WorkOrder::from_draft(id, draft)
    }

    fn validate(draft: &WorkOrderDraft) -> Result<(), String> {
        if draft.client_id == 0 {
            return Err("client id is required".into());
        }
        require(&draft.job_type, "job type")?;
        if draft.quantity == 0 {
            return Err("quantity must be positive".into());
        }
        Ok(())
    }

    /// Job type, status or payment status.
    fn matches(&self, needle: &str) -> bool {
        contains(&self.job_type, needle)
            || contains(&self.status, needle)
            || contains(&self.payment_status, needle)
    }
}
