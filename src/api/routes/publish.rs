//! `GET /publish` — inject one message into a topic (spec §4.10).

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::graph::GraphProjection;
use crate::message::Message;

#[derive(Debug, Deserialize)]
pub struct PublishParams {
    pub topic: String,
    pub message: String,
}

/// Injects `Message::from_text(message)` into `registry.get(topic)` and responds with
/// the rendered graph payload — chosen over a 303 redirect (spec §9 Open Questions) so
/// a single round trip drives a UI. Missing/malformed query parameters never reach this
/// handler: the `Query` extractor rejects them with 400 first.
pub async fn publish(
    State(state): State<AppState>,
    Query(params): Query<PublishParams>,
) -> Result<Json<GraphProjection>, ApiError> {
    if params.topic.trim().is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_TOPIC",
            "query parameter 'topic' must be non-empty",
        ));
    }

    let _guard = state.topology_lock.read().await;
    state
        .registry
        .get(&params.topic)
        .publish(Message::from_text(params.message))
        .await;

    Ok(Json(GraphProjection::build(&state.registry)))
}
