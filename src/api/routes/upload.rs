//! `POST /upload` — replace the running topology (spec §4.10).

use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::graph::GraphProjection;

/// Closes the current `ConfigLoader`, clears the registry, and rebuilds it from `body`.
/// Runs under `state.topology_lock`'s write half so no `/publish` or `/graph` read can
/// observe the registry between `clear()` and the end of `parse_and_build` (spec §3:
/// "Topology upload is atomic from the reader's perspective").
pub async fn upload(State(state): State<AppState>, body: String) -> Result<Json<GraphProjection>, ApiError> {
    let _guard = state.topology_lock.write().await;

    let sequence = state.upload_seq.fetch_add(1, Ordering::Relaxed) + 1;
    if state.debug
        && let Err(e) = state.storage.stage_topology(sequence, &body).await
    {
        tracing::warn!(error = %e, "failed to stage uploaded topology for auditing");
    }

    state.loader.close().await;
    state.registry.clear();

    if let Err(e) = state.loader.parse_and_build(&body).await {
        return Err(ApiError::bad_request("CONFIG_ERROR", e.to_string()));
    }

    let projection = GraphProjection::build(&state.registry);
    if projection.is_cyclic {
        return Err(ApiError::bad_request(
            "CYCLIC_TOPOLOGY",
            "uploaded topology contains a cycle; the topology has been built but should be re-uploaded",
        ));
    }

    Ok(Json(projection))
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
    async fn upload_builds_a_valid_topology() {
        let state = test_state();
        let Json(projection) = upload(State(state), "Increment\nA\nB\n".to_string())
            .await
            .unwrap();
        assert_eq!(projection.topics.len(), 2);
        assert!(!projection.is_cyclic);
    }

    #[tokio::test]
    async fn upload_rejects_invalid_config() {
        let state = test_state();
        let err = upload(State(state), "Frobnicate\nA\nB\n".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn upload_rejects_cyclic_topology() {
        let state = test_state();
        let err = upload(State(state), "Increment\nA\nA\n".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn second_upload_replaces_the_first() {
        let state = test_state();
        upload(State(state.clone()), "Increment\nA\nB\n".to_string())
            .await
            .unwrap();
        upload(State(state.clone()), "Double\nX\nY\n".to_string())
            .await
            .unwrap();

        let projection = GraphProjection::build(&state.registry);
        assert_eq!(projection.topics.len(), 2);
        assert!(projection.topics.iter().any(|t| t.name == "X"));
        assert!(!projection.topics.iter().any(|t| t.name == "A"));
    }
}
