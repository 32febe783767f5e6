//! Request-transforming middleware applied ahead of the resource handlers.

use std::time::Duration;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use common::{protocol::Envelope, ServiceError};
use tracing::debug;

use super::handlers;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum accepted envelope size in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Unwrap the signed request envelope, replacing the request body with the
/// decoded payload before the resource handler runs.
///
/// The envelope's `protected` and `signature` fields are carried but never
/// verified. Downstream handlers see only the decoded payload and cannot tell
/// whether the original request was enveloped.
pub async fn unwrap_envelope(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let raw = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return handlers::problem_response(&ServiceError::MalformedEnvelope(format!(
                "failed to read request body: {e}"
            )));
        }
    };

    match Envelope::unwrap_bytes(&raw) {
        Ok(payload) => next.run(Request::from_parts(parts, Body::from(payload))).await,
        Err(e) => {
            debug!(error = %e, "rejecting undecodable envelope");
            handlers::problem_response(&e)
        }
    }
}
