//! Static asset serving for `/app/{*path}` and `/favicon.ico` (spec §1: the
//! browser-side UI itself is out of scope; only the serving contract is specified).

use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::Response,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets"]
pub struct Assets;

const CACHE_REVALIDATE: &str = "public, max-age=0, must-revalidate";

/// Serve an embedded asset by path, falling back to `index.html` for unmatched
/// sub-paths under `/app/` so a client-side router can take over.
pub async fn serve_assets(uri: Uri) -> Response<Body> {
    // Strip exactly one leading "/app/" route prefix, not every repeated occurrence,
    // so an asset whose own path happens to start with "app/" (e.g. "app/logo.svg")
    // isn't mistaken for a second copy of the route mount point.
    let path = uri.path().strip_prefix("/app/").unwrap_or_else(|| uri.path().trim_start_matches('/'));
    let path = if path.is_empty() { "index.html" } else { path };

    if let Some(file) = Assets::get(path) {
        return asset_response(path, file);
    }

    if let Some(file) = Assets::get("index.html") {
        return asset_response("index.html", file);
    }

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Body::from("404 Not Found"))
        .unwrap()
}

/// Serve `/favicon.ico` specifically, 404ing if the asset bundle has none.
pub async fn serve_favicon() -> Response<Body> {
    match Assets::get("favicon.ico") {
        Some(file) => asset_response("favicon.ico", file),
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap(),
    }
}

fn asset_response(path: &str, file: rust_embed::EmbeddedFile) -> Response<Body> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let etag = hex::encode(file.metadata.sha256_hash());
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, CACHE_REVALIDATE)
        .header(header::ETAG, format!("\"{}\"", etag))
        .body(Body::from(file.data.into_owned()))
        .unwrap()
}
