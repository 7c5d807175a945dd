//! `GET /graph` — render the current topology as a side-effect-free snapshot (spec
//! §4.8/§4.10).

use axum::Json;
use axum::extract::State;

use crate::api::state::AppState;
use crate::graph::GraphProjection;

pub async fn graph(State(state): State<AppState>) -> Json<GraphProjection> {
    let _guard = state.topology_lock.read().await;
    Json(GraphProjection::build(&state.registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_loader::ConfigLoader;
    use crate::core::storage::AppStorage;
    use crate::topics::TopicRegistry;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU64;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn graph_reflects_current_topology() {
        let registry = Arc::new(TopicRegistry::new());
        let loader = Arc::new(ConfigLoader::new(registry.clone(), 10));
        loader.parse_and_build("Increment\nA\nB\n").await.unwrap();
        let state = AppState {
            registry,
            loader,
            topology_lock: Arc::new(RwLock::new(())),
            storage: Arc::new(AppStorage::init_for_test(std::env::temp_dir())),
            debug: false,
            upload_seq: Arc::new(AtomicU64::new(0)),
        };

        let Json(projection) = graph(State(state)).await;
        assert_eq!(projection.topics.len(), 2);
        assert_eq!(projection.agents.len(), 1);
        assert!(!projection.is_cyclic);
    }
}
