//! HTTP surface: `POST /generate` and `GET /ping`.

use std::future::Future;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ComposeError;
use crate::model::ErrorResponse;
use crate::orchestrator::Orchestrator;

/// Build the router over a shared orchestrator.
///
/// Every response carries a permissive `Access-Control-Allow-Origin`.
pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/ping", get(ping_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn serve(
    addr: SocketAddr,
    orchestrator: Orchestrator,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(bind = %addr, "compositor listening");
    axum::serve(listener, router(orchestrator)).with_graceful_shutdown(shutdown).await
}

async fn generate_handler(State(orchestrator): State<Orchestrator>, body: Bytes) -> Response {
    match orchestrator.handle_json(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn ping_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

fn error_response(err: &ComposeError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse::from(err))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::orchestrator::PipelineSettings;
    use crate::test_support::{FakeImageSource, FakeInference, FakeStore, FakeVision, Fakes};

    fn app(inference: FakeInference) -> Router {
        let fakes = Fakes::new(
            FakeImageSource::default(),
            FakeVision::default(),
            inference,
            FakeStore::default(),
        );
        router(Orchestrator::new(fakes.context(), PipelineSettings::default()))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Body) -> (StatusCode, Response) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "https://shop.example")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ping_reports_healthy() {
        let (status, response) =
            send(app(FakeInference::failing("unused")), Method::GET, "/ping", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request_with_cors() {
        let (status, response) = send(
            app(FakeInference::failing("unused")),
            Method::POST,
            "/generate",
            Body::from("{\"personImage\": 3"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
    }

    #[tokio::test]
    async fn backend_failure_is_a_server_error() {
        let body = json!({
            "personImage": "https://x/person.jpg",
            "clothingImages": ["https://x/shirt.jpg"],
            "placeImage": "https://x/beach.jpg",
        });
        let (status, response) = send(
            app(FakeInference::failing("endpoint not found")),
            Method::POST,
            "/generate",
            Body::from(body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Generation error: endpoint not found");
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn preflight_is_allowed() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/generate")
            .header(header::ORIGIN, "https://shop.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(FakeInference::failing("unused")).oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
