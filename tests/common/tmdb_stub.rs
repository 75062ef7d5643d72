//! In-process stand-in for the TMDB v3 API
//!
//! Serves the `configuration`, `find` and credits endpoints for a couple of
//! known titles. The server runs on its own tokio runtime so that tests
//! can drive it with the blocking client.

use super::constants::*;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

type Params = Query<HashMap<String, String>>;

/// Stub server instance
///
/// When dropped, the server shuts down together with its runtime.
pub struct TmdbStub {
    /// Base URL to hand to the client (e.g., "http://127.0.0.1:12345/3")
    pub base_url: String,

    // Private fields - keep resources alive until drop
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    _runtime: Runtime,
}

impl TmdbStub {
    /// Spawns the stub on a random port
    ///
    /// # Panics
    ///
    /// Panics if the runtime cannot be built or the port cannot be bound.
    pub fn spawn() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("Failed to build stub runtime");

        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        runtime.spawn(async move {
            axum::serve(listener, make_router())
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub server failed");
        });

        Self {
            base_url: format!("http://{}/3", addr),
            _shutdown_tx: Some(shutdown_tx),
            _runtime: runtime,
        }
    }
}

fn make_router() -> Router {
    Router::new()
        .route("/3/configuration", get(configuration))
        .route("/3/find/{id}", get(find))
        .route("/3/movie/{id}/credits", get(movie_credits))
        .route("/3/tv/{id}/credits", get(tv_credits))
}

fn authorized(params: &Params) -> bool {
    params.get("api_key").map(String::as_str) == Some(STUB_API_KEY)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"status_code": 7, "status_message": "Invalid API key"})),
    )
        .into_response()
}

async fn configuration(params: Params) -> Response {
    if !authorized(&params) {
        return unauthorized();
    }
    Json(json!({"images": {"base_url": "http://image.tmdb.org/t/p/"}})).into_response()
}

async fn find(Path(id): Path<String>, params: Params) -> Response {
    if !authorized(&params) {
        return unauthorized();
    }
    let body = match id.as_str() {
        MATRIX_KEY => json!({"movie_results": [{"id": STUB_MATRIX_ID}], "tv_results": []}),
        BREAKING_BAD_KEY => {
            json!({"movie_results": [], "tv_results": [{"id": STUB_BREAKING_BAD_ID}]})
        }
        _ => json!({"movie_results": [], "tv_results": []}),
    };
    Json(body).into_response()
}

async fn movie_credits(Path(id): Path<u64>, params: Params) -> Response {
    if !authorized(&params) {
        return unauthorized();
    }
    if id != STUB_MATRIX_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "id": STUB_MATRIX_ID,
        "cast": [{"name": KEANU, "character": "Neo"}, {"name": CARRIE_ANNE}],
        "crew": [
            {"name": "Lana Wachowski", "job": "Director", "department": "Directing"},
            {"name": "Lilly Wachowski", "job": "Director", "department": "Directing"},
            {"name": DON_DAVIS, "job": "Original Music Composer", "department": "Sound"},
            {"name": "Bill Pope", "job": "Director of Photography", "department": "Camera"}
        ]
    }))
    .into_response()
}

async fn tv_credits(Path(id): Path<u64>, params: Params) -> Response {
    if !authorized(&params) {
        return unauthorized();
    }
    if id != STUB_BREAKING_BAD_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "id": STUB_BREAKING_BAD_ID,
        "cast": [{"name": BRYAN_CRANSTON}, {"name": "Aaron Paul"}],
        "crew": [{"name": "Dave Porter", "job": "Music", "department": "Sound"}]
    }))
    .into_response()
}
