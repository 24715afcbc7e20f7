//! Axum router configuration for operational endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health, status, OpsAppState};

/// Create the operational router.
///
/// # Routes
///
/// - `GET /health` - Liveness probe
/// - `GET /status` - Pool occupancy and active session count
pub fn ops_router(state: OpsAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::http::ops::dto::{HealthResponse, StatusResponse};
    use crate::adapters::pool::{PoolMonitor, PoolStatus};
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::{CategoryIndex, SessionId};
    use crate::ports::SessionStateStore;

    struct FixedPool(PoolStatus);

    impl PoolMonitor for FixedPool {
        fn status(&self) -> PoolStatus {
            self.0
        }
    }

    fn state(store: InMemorySessionStore) -> OpsAppState {
        OpsAppState {
            pool: Arc::new(FixedPool(PoolStatus {
                size: 5,
                available: 3,
                checked_out: 2,
            })),
            sessions: Arc::new(store),
        }
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = ops_router(state(InMemorySessionStore::new()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health, HealthResponse::ok());
    }

    #[tokio::test]
    async fn status_reports_pool_and_sessions() {
        let store = InMemorySessionStore::new();
        store.set_category(SessionId::new(1), CategoryIndex::new(0)).await;

        let app = ops_router(state(store));
        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(status.pool.size, 5);
        assert_eq!(status.pool.available, 3);
        assert_eq!(status.pool.checked_out, 2);
        assert_eq!(status.active_sessions, 1);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = ops_router(state(InMemorySessionStore::new()));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
