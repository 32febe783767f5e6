//! ACME wire objects exchanged with clients.
//!
//! Field names follow the JSON forms of RFC 8555 (`camelCase` on the wire).
//! These types carry canned or minimally-derived data; none of them imply any
//! real validation or issuance on the server side.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Directory object for ACME client self-configuration (RFC 8555 §7.1.1).
///
/// Every URL is absolute and rooted at the host of the request that produced
/// it; a fresh directory is constructed per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    /// URL for new nonce requests.
    pub new_nonce: String,

    /// URL for new account requests.
    pub new_account: String,

    /// URL for new order requests.
    pub new_order: String,

    /// URL for certificate revocation requests.
    pub revoke_cert: String,

    /// URL for key change requests.
    pub key_change: String,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// An ACME account resource (RFC 8555 §7.1.2).
///
/// The mock answers every registration with the same valid account; no
/// identity binding occurs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account status; always `"valid"` here.
    pub status: String,

    /// Absolute URL of the account's order list.
    pub orders: String,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// A domain identifier attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// An ACME order object (RFC 8555 §7.1.3).
///
/// Client-submitted fields are decoded as-is; anything this mock does not
/// model is preserved through `extra` so it round-trips untouched. The
/// `finalize` and `authorizations` links are assigned by the server when the
/// order is returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_after: Option<String>,

    /// Absolute URL the client posts its CSR to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalize: Option<String>,

    /// Absolute URLs of the authorizations the client must satisfy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorizations: Option<Vec<String>>,

    /// Unmodelled client-submitted fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Finalize request body carrying the certificate signing request in
/// base64url-encoded DER (RFC 8555 §7.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub csr: String,
}

// ---------------------------------------------------------------------------
// Signed request envelope
// ---------------------------------------------------------------------------

/// Flattened JSON JWS envelope wrapping protected request bodies
/// (RFC 7515 §7.2.2).
///
/// `protected` and `signature` are carried but never examined — this mock
/// performs no signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub protected: String,
    pub payload: String,
    pub signature: String,
}

impl Envelope {
    /// Decode the base64url (unpadded) `payload` field into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MalformedEnvelope`] if the field is not valid
    /// base64url.
    pub fn decode_payload(&self) -> Result<Vec<u8>, ServiceError> {
        URL_SAFE_NO_PAD.decode(&self.payload).map_err(|e| {
            ServiceError::MalformedEnvelope(format!("payload is not valid base64url: {e}"))
        })
    }

    /// Parse an envelope from raw JSON bytes and decode its payload.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MalformedEnvelope`] if the enclosing JSON is
    /// not well-formed or the payload is not valid base64url.
    pub fn unwrap_bytes(raw: &[u8]) -> Result<Vec<u8>, ServiceError> {
        let envelope: Envelope = serde_json::from_slice(raw).map_err(|e| {
            ServiceError::MalformedEnvelope(format!("envelope is not valid JSON: {e}"))
        })?;
        envelope.decode_payload()
    }
}

// ---------------------------------------------------------------------------
// Problem documents
// ---------------------------------------------------------------------------

/// RFC 7807 problem document returned on any non-2xx status (RFC 8555 §6.7).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    /// Construct a [`Problem`] from a type URN and a detail message.
    pub fn new(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: Some(detail.into()),
        }
    }
}

impl From<&ServiceError> for Problem {
    fn from(err: &ServiceError) -> Self {
        Problem::new(err.problem_type(), err.to_string())
    }
}
