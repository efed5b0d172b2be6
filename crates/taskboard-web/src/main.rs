// Static asset server for the prebuilt UI bundle
//
// Serves files out of STATIC_DIR; any path that does not match a file
// falls back to index.html so client-side routes survive a hard refresh.
// A missing index.html yields 404.

use anyhow::{Context, Result};
use axum::Router;
use std::path::{Path, PathBuf};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn app(root: &Path) -> Router {
    let index = root.join("index.html");
    Router::new()
        .fallback_service(ServeDir::new(root).fallback(ServeFile::new(index)))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root = PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "build".to_string()));
    if root.join("index.html").exists() {
        tracing::info!(root = %root.display(), "Serving UI bundle");
    } else {
        tracing::warn!(
            root = %root.display(),
            "index.html not found; requests will 404 until the bundle is built"
        );
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app(&root))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::fs;
    use tower::ServiceExt;

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html>taskboard</html>").unwrap();
        fs::create_dir(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/app.js"), "console.log('app')").unwrap();
        dir
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn serves_bundle_files() {
        let dir = bundle();
        let (status, body) = get(app(dir.path()), "/static/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("console.log"));
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let dir = bundle();
        let (status, body) = get(app(dir.path()), "/tasks/42").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("taskboard"));
    }

    #[tokio::test]
    async fn root_serves_index() {
        let dir = bundle();
        let (status, body) = get(app(dir.path()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("taskboard"));
    }

    #[tokio::test]
    async fn missing_index_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = get(app(dir.path()), "/anything").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
