// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health endpoints.

use axum::{response::IntoResponse, Json};

use crate::response::HealthResponse;

/// GET /health
///
/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// Readiness probe. Key material and the policy table are loaded before the
/// server starts accepting connections, so a serving process is ready.
pub async fn ready() -> impl IntoResponse {
    Json(serde_json::json!({ "ready": true }))
}
