//! API server initialization: router assembly and the listen loop.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use super::embedded;
use super::middleware;
use super::routes::{graph, health, publish, upload};
use super::state::AppState;
use crate::core::CoreApp;
use crate::core::config::AppConfig;
use crate::core::constants::UPLOAD_BODY_LIMIT;
use crate::core::shutdown::ShutdownService;

pub struct ApiServer {
    config: AppConfig,
    state: AppState,
    shutdown: ShutdownService,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self {
            config: app.config,
            state: app.state,
            shutdown: app.shutdown,
        }
    }

    pub async fn start(self) -> Result<()> {
        let Self {
            config,
            state,
            shutdown,
        } = self;

        let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
        let router = build_router(state);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(())
    }
}

/// Assemble the core dataflow routes (§4.9) plus the ambient health probe and the
/// out-of-scope static-asset collaborator (§1).
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/publish", get(publish::publish))
        .route("/upload", axum::routing::post(upload::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)))
        .route("/graph", get(graph::graph))
        .route("/healthz", get(health::health))
        .route("/favicon.ico", get(embedded::serve_favicon))
        .route("/app/{*path}", get(embedded::serve_assets))
        .with_state(state)
        .fallback(middleware::handle_404)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_loader::ConfigLoader;
    use crate::core::storage::AppStorage;
    use crate::topics::TopicRegistry;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::sync::atomic::AtomicU64;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let registry = Arc::new(TopicRegistry::new());
        let loader = Arc::new(ConfigLoader::new(registry.clone(), 10));
        AppState {
            registry,
            loader,
            topology_lock: Arc::new(RwLock::new(())),
            storage: Arc::new(AppStorage::init_for_test(std::env::temp_dir())),
            debug: false,
            upload_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unmatched_route_is_404() {
        let router = build_router(test_state());
        let response = router
            .oneshot(Request::get("/nonexistent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_then_publish_then_graph_round_trip() {
        let router = build_router(test_state());

        let response = router
            .clone()
            .oneshot(
                Request::post("/upload")
                    .body(Body::from("Increment\nA\nB\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::get("/publish?topic=A&message=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let response = router
            .oneshot(Request::get("/graph").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let topic_b = json["topics"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "B")
            .unwrap();
        assert_eq!(topic_b["last_value"], 6.0);
    }

    #[tokio::test]
    async fn chained_plus_then_increment_cascades() {
        let router = build_router(test_state());

        let response = router
            .clone()
            .oneshot(
                Request::post("/upload")
                    .body(Body::from("Plus\nA,B\nC\nIncrement\nC\nD\n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // A alone: Plus has only one slot set, so no output reaches C or D yet.
        router
            .clone()
            .oneshot(
                Request::get("/publish?topic=A&message=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let response = router
            .clone()
            .oneshot(Request::get("/graph").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let topics = json["topics"].as_array().unwrap();
        assert!(topics.iter().find(|t| t["name"] == "C").unwrap()["last_value"].is_null());
        assert!(topics.iter().find(|t| t["name"] == "D").unwrap()["last_value"].is_null());

        // B completes the Plus agent's pair: 5+3=8 on C, cascading to 9 on D.
        router
            .clone()
            .oneshot(
                Request::get("/publish?topic=B&message=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let response = router
            .clone()
            .oneshot(Request::get("/graph").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let topics = json["topics"].as_array().unwrap();
        assert_eq!(topics.iter().find(|t| t["name"] == "C").unwrap()["last_value"], 8.0);
        assert_eq!(topics.iter().find(|t| t["name"] == "D").unwrap()["last_value"], 9.0);
    }

    #[tokio::test]
    async fn reuploading_identical_topology_is_idempotent() {
        let config_text = "Plus\nA,B\nC\nIncrement\nC\nD\n";
        let router = build_router(test_state());

        let response = router
            .clone()
            .oneshot(Request::post("/upload").body(Body::from(config_text)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let first: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let response = router
            .clone()
            .oneshot(Request::post("/upload").body(Body::from(config_text)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let second: serde_json::Value = serde_json::from_slice(&body).unwrap();

        // Re-uploading the same topology text must leave the registry in the same
        // shape a from-scratch build would: no doubled subscriber/publisher edges.
        assert_eq!(
            first["agents"].as_array().unwrap().len(),
            second["agents"].as_array().unwrap().len()
        );
        assert_eq!(
            first["edges"].as_array().unwrap().len(),
            second["edges"].as_array().unwrap().len()
        );
        assert_eq!(second["agents"].as_array().unwrap().len(), 2);
    }
}
