//! Wire types for the Imprenta backend API.
//!
//! Every type here is serialized to or from a request/response body. The
//! backend's JSON field names are Spanish (`nombre`, `tipo_trabajo`, ...);
//! the Rust fields are English and mapped with `#[serde(rename)]`, so the
//! wire format stays byte-compatible while the code reads naturally.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// A login credential pair: identifier (email) and secret (password).
///
/// `Debug` is implemented by hand so the password never ends up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// `true` when either half is empty (after trimming the email).
    pub fn is_incomplete(&self) -> bool {
        self.email.trim().is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful body of the credential exchange.
///
/// The backend has shipped both shapes: `{"token": "..."}` and a bare JSON
/// string. `untagged` tries them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Object { token: String },
    Bare(String),
}

impl LoginResponse {
    /// Returns the token regardless of the response shape.
    pub fn into_token(self) -> String {
        match self {
            Self::Object { token } | Self::Bare(token) => token,
        }
    }
}

/// Error body returned by the backend on any non-2xx response.
///
/// Only `message` is consumed; extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

/// A print-shop customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Server-assigned identifier. Some backend revisions send `_id`.
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "empresa", default)]
    pub company: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    pub email: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
}

/// The editable fields of a [`Client`]: what the form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDraft {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "direccion")]
    pub address: String,
}

impl From<&Client> for ClientDraft {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            company: client.company.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
        }
    }
}

impl Client {
    /// Builds a client from an id and its draft fields.
    pub fn from_draft(id: String, draft: ClientDraft) -> Self {
        Self {
            id,
            name: draft.name,
            company: draft.company,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
        }
    }
}

// ---------------------------------------------------------------------------
// Work orders
// ---------------------------------------------------------------------------

/// A work order ("pedido"): one print job for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    #[serde(rename = "_id")]
    pub id: u64,
    #[serde(rename = "id_cliente")]
    pub client_id: u64,
    #[serde(rename = "tipo_trabajo")]
    pub job_type: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "tamaño", default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "tipo_papel", default)]
    pub paper_type: String,
    #[serde(rename = "estado", default)]
    pub status: String,
    #[serde(rename = "observaciones", default)]
    pub notes: String,
    #[serde(rename = "estado_pago", default)]
    pub payment_status: String,
}

/// The editable fields of a [`WorkOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderDraft {
    #[serde(rename = "id_cliente")]
    pub client_id: u64,
    #[serde(rename = "tipo_trabajo")]
    pub job_type: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "tamaño")]
    pub size: String,
    pub color: String,
    #[serde(rename = "tipo_papel")]
    pub paper_type: String,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "observaciones")]
    pub notes: String,
    #[serde(rename = "estado_pago")]
    pub payment_status: String,
}

/// Status a new work order starts in, for both the job and its payment.
pub const PENDING_STATUS: &str = "Pendiente";

impl Default for WorkOrderDraft {
    fn default() -> Self {
        Self {
            client_id: 0,
            job_type: String::new(),
            quantity: 1,
            size: String::new(),
            color: String::new(),
            paper_type: String::new(),
            status: PENDING_STATUS.to_string(),
            notes: String::new(),
            payment_status: PENDING_STATUS.to_string(),
        }
    }
}

impl From<&WorkOrder> for WorkOrderDraft {
    fn from(order: &WorkOrder) -> Self {
        Self {
            client_id: order.client_id,
            job_type: order.job_type.clone(),
            quantity: order.quantity,
            size: order.size.clone(),
            color: order.color.clone(),
            paper_type: order.paper_type.clone(),
            status: order.status.clone(),
            notes: order.notes.clone(),
            payment_status: order.payment_status.clone(),
        }
    }
}

impl WorkOrder {
    /// Builds a work order from an id and its draft fields.
    pub fn from_draft(id: u64, draft: WorkOrderDraft) -> Self {
        Self {
            id,
            client_id: draft.client_id,
            job_type: draft.job_type,
            quantity: draft.quantity,
            size: draft.size,
            color: draft.color,
            paper_type: draft.paper_type,
            status: draft.status,
            notes: draft.notes,
            payment_status: draft.payment_status,
        }
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_serialize_as_email_password() {
        let creds = Credentials::new("admin@imprenta.com", "123456");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["email"], "admin@imprenta.com");
        assert_eq!(json["password"], "123456");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin@imprenta.com", "123456");
        let debug = format!("{creds:?}");
        assert!(debug.contains("admin@imprenta.com"));
        assert!(!debug.contains("123456"));
    }

    #[test]
    fn test_credentials_is_incomplete() {
        assert!(Credentials::new("", "x").is_incomplete());
        assert!(Credentials::new("   ", "x").is_incomplete());
        assert!(Credentials::new("a@b.c", "").is_incomplete());
        assert!(!Credentials::new("a@b.c", "x").is_incomplete());
    }

    #[test]
    fn test_login_response_accepts_object_and_bare_string() {
        let obj: LoginResponse =
            serde_json::from_str(r#"{"token":"a.b.c","user":{}}"#).unwrap();
        let bare: LoginResponse = serde_json::from_str(r#""a.b.c""#).unwrap();
        assert_eq!(obj.into_token(), "a.b.c");
        assert_eq!(bare.into_token(), "a.b.c");
    }

    #[test]
    fn test_error_payload_without_message() {
        let payload: ErrorPayload = serde_json::from_str(r#"{}"#).unwrap();
        assert!(payload.message.is_none());
    }

    #[test]
    fn test_client_uses_spanish_field_names() {
        let client = Client {
            id: "1".into(),
            name: "Ramiro".into(),
            company: "Impresiones".into(),
            phone: "11-1111-2222".into(),
            email: "rama@gmail.com".into(),
            address: "Calle 1".into(),
        };
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["nombre"], "Ramiro");
        assert_eq!(json["empresa"], "Impresiones");
        assert_eq!(json["telefono"], "11-1111-2222");
        assert_eq!(json["direccion"], "Calle 1");
    }

    #[test]
    fn test_client_accepts_underscore_id_and_missing_optionals() {
        let client: Client = serde_json::from_str(
            r#"{"_id":"c9","nombre":"Pedro","email":"pedro@grafica.com"}"#,
        )
        .unwrap();
        assert_eq!(client.id, "c9");
        assert!(client.company.is_empty());
        assert!(client.address.is_empty());
    }

    #[test]
    fn test_work_order_wire_names() {
        let order: WorkOrder = serde_json::from_str(
            r#"{"_id":2,"id_cliente":8,"tipo_trabajo":"Tarjetas","cantidad":15,
                "tamaño":"A4","color":"Azul","tipo_papel":"Grueso",
                "estado":"Terminado","observaciones":"-","estado_pago":"Pagado"}"#,
        )
        .unwrap();
        assert_eq!(order.id, 2);
        assert_eq!(order.client_id, 8);
        assert_eq!(order.size, "A4");
        assert_eq!(order.payment_status, "Pagado");
    }

    #[test]
    fn test_work_order_draft_defaults() {
        let draft = WorkOrderDraft::default();
        assert_eq!(draft.quantity, 1);
        assert_eq!(draft.status, PENDING_STATUS);
        assert_eq!(draft.payment_status, PENDING_STATUS);
        assert_eq!(draft.client_id, 0);
    }

    #[test]
    fn test_draft_from_record_and_back_keeps_fields() {
        let order = WorkOrder {
            id: 5,
            client_id: 1,
            job_type: "Folletos".into(),
            quantity: 100,
            ..WorkOrder::default()
        };
        let draft = WorkOrderDraft::from(&order);
        assert_eq!(WorkOrder::from_draft(5, draft), order);
    }
}
