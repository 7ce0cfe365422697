//! Static host
//!
//! Serves the built front-end bundle. Files that exist under the dist
//! directory are served as-is; every other path falls back to the bundle's
//! `index.html` so client-side routes resolve after a hard reload.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Build the router serving `dist_dir` with an `index.html` fallback.
pub fn build_router(dist_dir: &Path) -> Router {
    let index = dist_dir.join("index.html");
    let bundle = ServeDir::new(dist_dir).fallback(ServeFile::new(index));

    Router::new()
        .fallback_service(bundle)
        .layer(TraceLayer::new_for_http())
}
