// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoint exposing the Prometheus metrics.

use crate::constants::METRICS_PATH;
use crate::metrics::gather_metrics;
use anyhow::{Context as _, Result};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tracing::{error, info};

const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Router serving `GET /metrics`.
pub fn metrics_router() -> Router {
    Router::new().route(METRICS_PATH, get(metrics_handler))
}

/// Serve the metrics router on `addr` until the task is dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_metrics(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics server to {addr}"))?;

    info!(address = %addr, path = METRICS_PATH, "Serving metrics");
    axum::serve(listener, metrics_router())
        .await
        .context("metrics server failed")
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(text) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
                format!("# failed to encode metrics: {e}\n"),
            )
        }
    }
}
