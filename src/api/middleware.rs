//! HTTP middleware: CORS and the 404 fallback.

use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{Any, CorsLayer};

/// A permissive CORS layer. The teacher allowlists specific origins because its API
/// carries auth cookies; this engine has no authentication (spec §1 Non-goals) and no
/// per-origin secret to leak, so a wide-open layer is used instead.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Handle unmatched routes with a plain 404 (spec §7 "RouteNotFound").
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "no route matched");
    StatusCode::NOT_FOUND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_404_returns_not_found() {
        let req = Request::builder()
            .uri("/nope")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = handle_404(req).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
