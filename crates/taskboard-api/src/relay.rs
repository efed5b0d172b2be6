// Telemetry relay
//
// Tunnels everything beneath /api/otel to the OTLP collector without
// interpreting it. Handlers take the raw request, so no JSON extractor
// runs for these routes and binary protobuf payloads pass through
// byte-for-byte. Forwarding is fire-and-forget: no retries, loss is
// acceptable.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use std::time::Duration;
use taskboard_contracts::ErrorResponse;

const PATH_PREFIX: &str = "/api/otel";

const DEFAULT_COLLECTOR_URL: &str = "http://otel-collector.monitoring.svc.cluster.local:4318";

/// Largest payload the relay will forward upstream.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// The collector must accept the connection within this window so an
/// unreachable upstream turns into a 502 instead of a hang.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RelayState {
    client: reqwest::Client,
    collector_url: String,
}

impl RelayState {
    pub fn new(collector_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            collector_url: collector_url.into(),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("OTEL_COLLECTOR_URL")
            .unwrap_or_else(|_| DEFAULT_COLLECTOR_URL.to_string());
        Self::new(url)
    }

    pub fn collector_url(&self) -> &str {
        &self.collector_url
    }
}

#[derive(Debug, thiserror::Error)]
enum RelayError {
    #[error("payload exceeds {MAX_BODY_BYTES} bytes")]
    PayloadTooLarge,
    #[error("collector request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("invalid upstream response: {0}")]
    Response(#[from] axum::http::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            RelayError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
            RelayError::Upstream(_) | RelayError::Response(_) => {
                (StatusCode::BAD_GATEWAY, "Collector unavailable")
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Create relay routes. `any()` keeps the endpoint method-agnostic.
pub fn routes(state: RelayState) -> Router {
    Router::new()
        .route("/api/otel", any(forward))
        .route("/api/otel/{*path}", any(forward))
        .with_state(state)
}

async fn forward(State(state): State<RelayState>, req: Request<Body>) -> axum::response::Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match relay(&state, req).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(method = %method, path = %path, error = %err, "OTLP relay error");
            err.into_response()
        }
    }
}

async fn relay(
    state: &RelayState,
    req: Request<Body>,
) -> Result<axum::response::Response, RelayError> {
    let (parts, body) = req.into_parts();

    let suffix = parts.uri.path().strip_prefix(PATH_PREFIX).unwrap_or("");
    let mut target = format!("{}{}", state.collector_url.trim_end_matches('/'), suffix);
    if let Some(query) = parts.uri.query() {
        target.push('?');
        target.push_str(query);
    }

    // Buffered so content-length can be recomputed from the bytes that
    // actually arrived; the inbound header value is never trusted.
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| RelayError::PayloadTooLarge)?;

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let upstream = state
        .client
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    // Status and headers come back verbatim; the body streams through
    // without buffering.
    let mut response = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        response = response.header(name, value);
    }
    Ok(response.body(Body::from_stream(upstream.bytes_stream()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    /// Collector stand-in that reports what it received.
    async fn echo(req: Request<Body>) -> Json<serde_json::Value> {
        let (parts, body) = req.into_parts();
        let content_length = parts
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "content_length": content_length,
            "received_bytes": body.len(),
        }))
    }

    async fn spawn_collector(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn relay_app(collector_url: String) -> Router {
        routes(RelayState::new(collector_url).unwrap())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn forwards_exact_bytes_and_recomputes_content_length() {
        let collector = spawn_collector(Router::new().route("/v1/traces", any(echo))).await;
        let app = relay_app(collector);

        let payload = vec![0xA5u8; 2048];
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/otel/v1/traces")
                    .header(header::CONTENT_TYPE, "application/x-protobuf")
                    // Deliberately wrong; the relay must not trust it.
                    .header(header::CONTENT_LENGTH, "999")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let seen = json_body(response).await;
        assert_eq!(seen["method"], "POST");
        assert_eq!(seen["path"], "/v1/traces");
        assert_eq!(seen["received_bytes"], 2048);
        assert_eq!(seen["content_length"], "2048");
    }

    #[tokio::test]
    async fn preserves_query_string() {
        let collector = spawn_collector(Router::new().route("/v1/metrics", any(echo))).await;
        let app = relay_app(collector);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/otel/v1/metrics?format=json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let seen = json_body(response).await;
        assert_eq!(seen["path"], "/v1/metrics");
        assert_eq!(seen["query"], "format=json");
    }

    #[tokio::test]
    async fn prefix_root_maps_to_collector_root() {
        let collector = spawn_collector(Router::new().route("/", any(echo))).await;
        let app = relay_app(collector);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/otel")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let seen = json_body(response).await;
        assert_eq!(seen["method"], "GET");
        assert_eq!(seen["path"], "/");
    }

    #[tokio::test]
    async fn copies_upstream_status_and_headers_verbatim() {
        let collector = spawn_collector(Router::new().route(
            "/v1/traces",
            any(|| async {
                (
                    StatusCode::ACCEPTED,
                    [("x-collector-id", "c1")],
                    "partial success",
                )
            }),
        ))
        .await;
        let app = relay_app(collector);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/otel/v1/traces")
                    .body(Body::from("spans"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-collector-id"], "c1");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"partial success");
    }

    #[tokio::test]
    async fn unreachable_collector_yields_502() {
        // Bind then drop to get a port that refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = relay_app(format!("http://{addr}"));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/otel/v1/traces")
                    .body(Body::from("spans"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Collector unavailable");
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let app = relay_app("http://127.0.0.1:9".to_string());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/otel/v1/traces")
                    .body(Body::from(vec![0u8; MAX_BODY_BYTES + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Payload too large");
    }
}
