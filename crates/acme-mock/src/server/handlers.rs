//! Axum request handlers for the ACME resource endpoints.
//!
//! Each handler is a pure function of the (possibly already unwrapped)
//! request: it reads the request, optionally touches the order store, and
//! returns a typed protocol object. Decode failures become problem-document
//! responses at the point of detection; nothing in here can take the process
//! down on malformed client input.

use axum::{
    body::Bytes,
    extract::{Host, Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use common::{
    protocol::{Account, Directory, FinalizeRequest, Order, Problem},
    ServiceError,
};
use serde::Serialize;
use tracing::{info, warn};

use super::router::paths;
use super::state::AppState;
use super::url;
use crate::config::AuthorizationsMode;
use crate::order::OrderId;

/// Fixed replay nonce, taken from the example exchange in RFC 8555 §6.5.
pub const REPLAY_NONCE: &str = "oFvnlFP1wIhRlYS2jTaXbA";

/// `/directory` — resource index for client self-configuration.
///
/// Every URL is rebuilt from the request's own `Host` header, so the same
/// process answers correctly behind any name or port.
pub async fn directory(Host(host): Host) -> Response {
    let directory = Directory {
        new_nonce: url::absolute(&host, paths::NEW_NONCE),
        new_account: url::absolute(&host, paths::NEW_ACCOUNT),
        new_order: url::absolute(&host, paths::NEW_ORDER),
        revoke_cert: url::absolute(&host, paths::REVOKE_CERT),
        key_change: url::absolute(&host, paths::KEY_CHANGE),
    };
    json_response(StatusCode::OK, &directory)
}

/// `/new-nonce` — issue the fixed replay nonce.
///
/// The value never changes; clients must not cache it.
pub async fn nonce() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (HeaderName::from_static("replay-nonce"), REPLAY_NONCE),
            (header::CACHE_CONTROL, "no-store"),
        ],
    )
}

/// `/new-account` — canned account registration.
///
/// Always answers with the same valid account; no identity binding occurs.
/// `Location` points at the account's own URL, as clients expect from
/// RFC 8555 §7.3.
pub async fn account(Host(host): Host) -> Response {
    let account = Account {
        status: "valid".into(),
        orders: url::absolute(&host, paths::ORDERS),
    };

    (
        [(header::LOCATION, url::absolute(&host, paths::ACCOUNT))],
        json_response(StatusCode::OK, &account),
    )
        .into_response()
}

/// `/new-order` — create an order from the unwrapped request payload.
///
/// The order is appended to the store under its lock, which assigns the
/// sequential identifier embedded in the returned `finalize` URL.
pub async fn new_order(
    State(state): State<AppState>,
    Host(host): Host,
    body: Bytes,
) -> Response {
    let order: Order = match serde_json::from_slice(&body) {
        Ok(order) => order,
        Err(e) => {
            warn!(error = %e, "rejecting malformed order payload");
            return problem_response(&ServiceError::MalformedOrderBody(format!(
                "order payload is not valid JSON: {e}"
            )));
        }
    };

    let id = state.orders.append(order.clone()).await;
    info!(%id, "order created");

    let order = decorate(order, &host, id, Vec::new());
    json_response(StatusCode::CREATED, &order)
}

/// `/finalize/{id}` — accept a CSR for a previously created order.
///
/// The body arrives already unwrapped by the envelope middleware.
pub async fn finalize(
    State(state): State<AppState>,
    Host(host): Host,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let Some(id) = OrderId::parse(&id) else {
        return problem_response(&ServiceError::UnknownOrder(id));
    };

    let csr: FinalizeRequest = match serde_json::from_slice(&body) {
        Ok(csr) => csr,
        Err(e) => {
            warn!(%id, error = %e, "rejecting malformed finalize payload");
            return problem_response(&ServiceError::MalformedOrderBody(format!(
                "finalize payload is not a valid CSR message: {e}"
            )));
        }
    };

    let Some(order) = state.orders.attach_csr(id, csr).await else {
        return problem_response(&ServiceError::UnknownOrder(id.to_string()));
    };
    info!(%id, "order finalized");

    let authorizations = match state.finalize_authorizations {
        AuthorizationsMode::Empty => Vec::new(),
        AuthorizationsMode::Placeholder => {
            vec![url::absolute(&host, &url::join(paths::AUTHZ, &id.to_string()))]
        }
    };
    let order = decorate(order, &host, id, authorizations);
    json_response(StatusCode::OK, &order)
}

/// Catch-all 404 handler.
pub async fn not_found() -> Response {
    let problem = Problem::new(
        "urn:ietf:params:acme:error:malformed",
        "the requested resource does not exist",
    );
    problem_parts(StatusCode::NOT_FOUND, &problem)
}

/// Attach the server-assigned links to an order before it is returned.
fn decorate(mut order: Order, host: &str, id: OrderId, authorizations: Vec<String>) -> Order {
    order.finalize = Some(url::absolute(
        host,
        &url::join(paths::FINALIZE, &id.to_string()),
    ));
    order.authorizations = Some(authorizations);
    order
}

// ---------------------------------------------------------------------------
// Response encoding
// ---------------------------------------------------------------------------

/// Serialise `value` as the JSON wire format.
///
/// The content-type header is attached before the body is written. A value
/// that fails to serialise is reported as a 500 problem document instead of
/// tearing down the process.
fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => problem_response(&ServiceError::Encoding(e.to_string())),
    }
}

/// Convert a [`ServiceError`] into its problem-document response.
pub(crate) fn problem_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    problem_parts(status, &Problem::from(err))
}

fn problem_parts(status: StatusCode, problem: &Problem) -> Response {
    match serde_json::to_vec(problem) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            body,
        )
            .into_response(),
        Err(_) => status.into_response(),
    }
}
