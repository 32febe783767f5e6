//! Axum router construction.

use axum::{middleware::from_fn, routing::any, Router};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Fixed resource paths advertised by the directory.
///
/// `revoke-cert` and `key-change` are advertised but not served; requests to
/// them fall through to the 404 handler.
pub mod paths {
    pub const DIRECTORY: &str = "/directory";
    pub const NEW_NONCE: &str = "/new-nonce";
    pub const NEW_ACCOUNT: &str = "/new-account";
    pub const NEW_ORDER: &str = "/new-order";
    pub const REVOKE_CERT: &str = "/revoke-cert";
    pub const KEY_CHANGE: &str = "/key-change";
    pub const FINALIZE: &str = "/finalize";
    pub const AUTHZ: &str = "/authz";
    pub const ORDERS: &str = "/orders";
    pub const ACCOUNT: &str = "/account/1";
}

/// Build the application [`Router`] with all routes and middleware attached.
///
/// The envelope unwrapper wraps only the two endpoints whose bodies arrive
/// inside a signed envelope; the rest of the pipeline is shared.
pub fn build(state: AppState) -> Router {
    let enveloped = Router::new()
        .route(paths::NEW_ORDER, any(handlers::new_order))
        .route("/finalize/:id", any(handlers::finalize))
        .route_layer(from_fn(middleware::unwrap_envelope));

    Router::new()
        .route(paths::DIRECTORY, any(handlers::directory))
        .route(paths::NEW_NONCE, any(handlers::nonce))
        .route(paths::NEW_ACCOUNT, any(handlers::account))
        .merge(enveloped)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use serde_json::json;
    use tower::ServiceExt;

    fn enveloped(payload: &serde_json::Value) -> String {
        json!({
            "protected": "eyJhbGciOiJFUzI1NiJ9",
            "payload": URL_SAFE_NO_PAD.encode(payload.to_string()),
            "signature": "ZmFrZS1zaWduYXR1cmU",
        })
        .to_string()
    }

    fn post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("host", "ca.example")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_returns_404_problem() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/unknown")
            .header("host", "ca.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = body_json(resp).await;
        assert_eq!(body["type"], "urn:ietf:params:acme:error:malformed");
    }

    #[tokio::test]
    async fn directory_route_exists() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri(paths::DIRECTORY)
            .header("host", "ca.example")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn enveloped_new_order_end_to_end() {
        let app = build(AppState::default());

        let order = json!({"identifiers": [{"type": "dns", "value": "example.com"}]});
        let resp = app
            .oneshot(post(paths::NEW_ORDER, enveloped(&order)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(resp).await;
        assert_eq!(body["finalize"], "https://ca.example/finalize/0");
        assert_eq!(body["authorizations"], json!([]));
    }

    #[tokio::test]
    async fn enveloped_finalize_end_to_end() {
        let app = build(AppState::default());

        let order = json!({"identifiers": [{"type": "dns", "value": "example.com"}]});
        app.clone()
            .oneshot(post(paths::NEW_ORDER, enveloped(&order)))
            .await
            .unwrap();

        let csr = json!({"csr": "MIIBJTCBzAIBADBF"});
        let resp = app
            .oneshot(post("/finalize/0", enveloped(&csr)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["finalize"], "https://ca.example/finalize/0");
        assert_eq!(body["identifiers"][0]["value"], "example.com");
    }

    #[tokio::test]
    async fn malformed_envelope_does_not_stop_the_service() {
        let app = build(AppState::default());

        let resp = app
            .clone()
            .oneshot(post(paths::NEW_ORDER, "garbage".into()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let order = json!({"identifiers": []});
        let resp = app
            .oneshot(post(paths::NEW_ORDER, enveloped(&order)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_orders_receive_distinct_dense_ids() {
        const N: usize = 8;
        let app = build(AppState::default());

        let mut handles = Vec::with_capacity(N);
        for _ in 0..N {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let order = json!({"identifiers": [{"type": "dns", "value": "example.com"}]});
                let resp = app
                    .oneshot(post(paths::NEW_ORDER, enveloped(&order)))
                    .await
                    .unwrap();
                assert_eq!(resp.status(), StatusCode::CREATED);

                let body = body_json(resp).await;
                let finalize = body["finalize"].as_str().unwrap().to_owned();
                finalize
                    .rsplit('/')
                    .next()
                    .unwrap()
                    .parse::<usize>()
                    .unwrap()
            }));
        }

        let mut ids = Vec::with_capacity(N);
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (0..N).collect::<Vec<_>>());
    }
}
