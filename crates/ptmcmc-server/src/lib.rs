//! Status HTTP server: serves a read-only JSON snapshot of a running
//! (or finished) sampler's progress.
//!
//! The server shares no sampler state by reference across threads, only
//! a periodically-updated [`StatusSnapshot`] behind a `Mutex`, handed to
//! it via [`PtSampler::status`](ptmcmc_core::coordinator::PtSampler::status).

use std::sync::{Arc, Mutex};

use axum::{Router, extract::State, response::Json, routing::get};
use ptmcmc_core::coordinator::StatusSnapshot;
use serde::Serialize;

/// Shared server state: just the snapshot handle.
struct AppState {
    status: Arc<Mutex<StatusSnapshot>>,
}

#[derive(Serialize)]
struct StatusResponse {
    iter: u64,
    niter: u64,
    progress: f64,
    cold_accept_rate: f64,
    n_eff: f64,
    finished: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    finished: bool,
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.status.lock().expect("status mutex poisoned").clone();
    let progress = if snapshot.niter == 0 {
        0.0
    } else {
        (snapshot.iter as f64 / snapshot.niter as f64).min(1.0)
    };
    Json(StatusResponse {
        iter: snapshot.iter,
        niter: snapshot.niter,
        progress,
        cold_accept_rate: snapshot.cold_accept_rate,
        n_eff: snapshot.n_eff,
        finished: snapshot.finished,
    })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let finished = state.status.lock().expect("status mutex poisoned").finished;
    Json(HealthResponse {
        status: "ok".to_string(),
        finished,
    })
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "ptmcmc status server",
        "endpoints": {
            "/": "this API index",
            "/status": "current iteration, acceptance rate, and N_eff estimate for rank 0",
            "/health": "liveness check",
        }
    }))
}

/// Build the axum router over a sampler's status handle.
fn build_router(status: Arc<Mutex<StatusSnapshot>>) -> Router {
    let state = Arc::new(AppState { status });
    Router::new()
        .route("/", get(handle_index))
        .route("/status", get(handle_status))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the status server until the process is killed. Intended to be
/// spawned on its own tokio runtime alongside the blocking
/// `PtSampler::run` call, polling the same snapshot handle the
/// coordinator writes to from rank 0.
pub async fn run_server(status: Arc<Mutex<StatusSnapshot>>, host: &str, port: u16) {
    let app = build_router(status);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("status server failed to bind {addr}: {e}"));
    axum::serve(listener, app)
        .await
        .expect("status server exited unexpectedly");
}
