// Taskboard API gateway
// Task CRUD over Postgres plus the OTLP telemetry relay.

mod relay;
mod services;
mod tasks;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use taskboard_contracts::{
    CreateTaskRequest, DeleteTaskResponse, ErrorResponse, Task, UpdateTaskRequest,
};
use taskboard_storage::{Database, StoreConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

/// OpenAPI documentation. The relay routes are deliberately absent: they
/// are method- and schema-agnostic pass-through.
#[derive(OpenApi)]
#[openapi(
    paths(
        tasks::list_tasks,
        tasks::get_task,
        tasks::create_task,
        tasks::update_task,
        tasks::delete_task,
    ),
    components(
        schemas(
            Task,
            CreateTaskRequest,
            UpdateTaskRequest,
            DeleteTaskResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "tasks", description = "Task management endpoints")
    ),
    info(
        title = "Taskboard API",
        version = "0.1.0",
        description = "Task CRUD API with an embedded OTLP telemetry relay",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("taskboard-api starting...");

    // The pool is built lazily so a down database does not prevent startup.
    let store_config = StoreConfig::from_env();
    let db = Arc::new(Database::connect_lazy(&store_config));

    // Schema init failure is logged and non-fatal: the process keeps
    // serving and store-dependent routes answer 500 until the store is
    // back. Inherited behavior, preserved on purpose.
    match db.init_schema().await {
        Ok(()) => tracing::info!("Database initialized successfully"),
        Err(e) => tracing::error!("Database initialization error: {:#}", e),
    }

    let relay_state =
        relay::RelayState::from_env().context("Failed to build telemetry relay client")?;
    tracing::info!(collector = %relay_state.collector_url(), "Telemetry relay configured");

    let tasks_state = tasks::AppState::new(db.clone());

    let app = Router::new()
        .route("/health", get(health))
        .merge(tasks::routes(tasks_state))
        .merge(relay::routes(relay_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Pool lifecycle ends with the process.
    db.close().await;
    tracing::info!("taskboard-api stopped");

    Ok(())
}

/// The UI may be served from any origin and the API carries no
/// credentials, so CORS stays wide open.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
