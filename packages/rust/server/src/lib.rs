//! HTTP serving of generated llms.txt files.
//!
//! `GET /llms.txt` returns the default language and `GET /{slug}/llms.txt`
//! any configured language. A language that has never been generated is
//! generated on first request.

mod schedule;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{info, warn};

use llmstxt_core::Generator;
use llmstxt_shared::{LlmsTxtError, Result};

pub use schedule::{regenerate, spawn_scheduler};

/// Build the router over a shared generator.
pub fn router(generator: Arc<Generator>) -> Router {
    Router::new()
        .route("/llms.txt", get(default_llms_txt))
        .route("/{slug}/llms.txt", get(language_llms_txt))
        .with_state(generator)
}

/// Bind `addr` and serve until ctrl-c.
///
/// With `schedule` set, all languages are regenerated once per period in the
/// background, starting one period after start-up.
pub async fn serve(
    generator: Arc<Generator>,
    addr: SocketAddr,
    schedule: Option<Duration>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LlmsTxtError::Server(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "serving llms.txt");

    let scheduler = schedule.map(|period| spawn_scheduler(Arc::clone(&generator), period));

    let result = axum::serve(listener, router(generator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LlmsTxtError::Server(e.to_string()));

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!("server stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn default_llms_txt(State(generator): State<Arc<Generator>>) -> Response {
    match generator.default_language() {
        Some(lang) => serve_language(generator, lang).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn language_llms_txt(
    State(generator): State<Arc<Generator>>,
    Path(slug): Path<String>,
) -> Response {
    if !generator.is_known_language(&slug) {
        return StatusCode::NOT_FOUND.into_response();
    }
    serve_language(generator, slug).await
}

async fn serve_language(generator: Arc<Generator>, slug: String) -> Response {
    let body = tokio::task::spawn_blocking(move || load_or_generate(&generator, &slug)).await;

    match body {
        Ok(Some(body)) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "inline; filename=\"llms.txt\""),
            ],
            body,
        )
            .into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(error = %e, "artifact task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Stored artifact for `slug`, generating it first if it does not exist yet.
fn load_or_generate(generator: &Generator, slug: &str) -> Option<String> {
    match generator.read_artifact(slug) {
        Ok(Some(body)) => return Some(body),
        Ok(None) => {}
        Err(e) => {
            warn!(lang = slug, error = %e, "cannot read artifact");
            return None;
        }
    }

    info!(lang = slug, "artifact missing, generating on demand");
    if !generator.generate_one(slug).is_success() {
        return None;
    }
    generator.read_artifact(slug).ok().flatten()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use llmstxt_core::SnapshotSource;
    use llmstxt_storage::{ArtifactStore, GenerationRegistry};
    use std::path::PathBuf;
    use tower::ServiceExt;

    pub(crate) fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("llmstxt-server-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn fixture_generator(dir: &std::path::Path) -> Arc<Generator> {
        let fixture = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/json/site.fixture.json");
        let source = SnapshotSource::load(&fixture).unwrap();
        Arc::new(Generator::new(
            Arc::new(source),
            ArtifactStore::new(dir.join("llms-txt")),
            GenerationRegistry::load(dir.join("registry.json")).unwrap(),
        ))
    }

    async fn get_path(generator: Arc<Generator>, path: &str) -> (StatusCode, Option<String>, String) {
        let response = router(generator)
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_serves_default_language() {
        let tmp = temp_dir();
        let generator = fixture_generator(&tmp);

        let (status, content_type, body) = get_path(Arc::clone(&generator), "/llms.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        assert!(body.contains("- [About](https://acme.test/about/): We make widgets."));
        // Generated on demand and recorded.
        assert!(generator.last_generated().contains_key("en"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn language_route_serves_stored_artifact() {
        let tmp = temp_dir();
        let generator = fixture_generator(&tmp);
        assert!(generator.generate_one("fr").is_success());

        let response = router(Arc::clone(&generator))
            .oneshot(Request::builder().uri("/fr/llms.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "inline; filename=\"llms.txt\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("Nous fabriquons des widgets."));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn unknown_language_is_not_found() {
        let tmp = temp_dir();
        let generator = fixture_generator(&tmp);

        let (status, _, _) = get_path(Arc::clone(&generator), "/nl/llms.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = get_path(generator, "/en/other.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn failed_on_demand_generation_is_not_found() {
        let tmp = temp_dir();
        let generator = fixture_generator(&tmp);
        std::fs::create_dir_all(tmp.join("llms-txt").join("llms-de.txt").join("inner")).unwrap();

        let (status, _, _) = get_path(generator, "/de/llms.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
