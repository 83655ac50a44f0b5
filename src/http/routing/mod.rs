use axum::http::{HeaderValue, Uri};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{domain::error::AppError, http::types::method_not_allowed};

/// Mounts the resource router under `base_path` and adds the health probe,
/// the envelope-rendering fallback, CORS and request tracing.
pub fn app(router: Router, base_path: &str, client_origin: Option<HeaderValue>) -> Router {
    let base = normalize_base_path(base_path);
    let api = if base.is_empty() { router } else { Router::new().nest(&base, router) };
    Router::new()
        .route("/health", get(|| async { "ok" }).fallback(method_not_allowed))
        .merge(api)
        .fallback(|uri: Uri| async move { AppError::route_not_found(uri.path()) })
        .layer(cors(client_origin))
        .layer(TraceLayer::new_for_http())
}

/// `"api/v1/"` becomes `"/api/v1"`; empty and `"/"` become `""`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}

fn cors(client_origin: Option<HeaderValue>) -> CorsLayer {
    match client_origin {
        Some(origin) => CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_base_path;

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("api"), "/api");
        assert_eq!(normalize_base_path("/api/v1/"), "/api/v1");
    }
}
