//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::MalformedEnvelope`] → 400
/// - [`ServiceError::MalformedOrderBody`] → 400
/// - [`ServiceError::UnknownOrder`] → 404
/// - [`ServiceError::Encoding`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request envelope JSON or its base64url payload could not be decoded.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The decoded payload does not match the expected body shape.
    #[error("malformed order body: {0}")]
    MalformedOrderBody(String),

    /// The referenced order identifier does not exist.
    #[error("unknown order: {0}")]
    UnknownOrder(String),

    /// A response value could not be serialised to the wire format.
    #[error("encoding failure: {0}")]
    Encoding(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::MalformedEnvelope(_) => 400,
            ServiceError::MalformedOrderBody(_) => 400,
            ServiceError::UnknownOrder(_) => 404,
            ServiceError::Encoding(_) => 500,
        }
    }

    /// Returns the ACME problem-document `type` URN for this error (RFC 8555 §6.7).
    pub fn problem_type(&self) -> &'static str {
        match self {
            ServiceError::MalformedEnvelope(_)
            | ServiceError::MalformedOrderBody(_)
            | ServiceError::UnknownOrder(_) => "urn:ietf:params:acme:error:malformed",
            ServiceError::Encoding(_) => "urn:ietf:params:acme:error:serverInternal",
        }
    }
}
