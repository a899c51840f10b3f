// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// ApiResponse
// =============================================================================

/// Success response envelope.
///
/// Provides a consistent `{title, data, status, code}` structure across all
/// endpoints, mirroring the error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response title for categorization.
    pub title: String,
    /// Response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// HTTP status code.
    pub status: u16,
    /// Response code for programmatic handling.
    pub code: String,
}

impl<T> ApiResponse<T> {
    /// Creates a 200 response.
    pub fn ok(title: impl Into<String>, data: T) -> Self {
        Self {
            title: title.into(),
            data: Some(data),
            status: StatusCode::OK.as_u16(),
            code: "STATUS_OK".to_string(),
        }
    }

    /// Creates a 201 response.
    pub fn created(title: impl Into<String>, data: T) -> Self {
        Self {
            title: title.into(),
            data: Some(data),
            status: StatusCode::CREATED.as_u16(),
            code: "STATUS_CREATED".to_string(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Login/refresh response body.
///
/// Only the access token travels in the body; the refresh token is set as
/// an HTTP-only cookie.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Access token for the `Authorization` header.
    pub access_token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let response = ApiResponse::ok("SUCCESSFULLY_LOGIN_USERS", 42);
        assert_eq!(response.status, 200);
        assert_eq!(response.code, "STATUS_OK");
        assert_eq!(response.data, Some(42));
    }

    #[test]
    fn test_created_response() {
        let response = ApiResponse::created("SUCCESSFULLY_CREATE_USER", ());
        assert_eq!(response.status, 201);
        assert_eq!(response.code, "STATUS_CREATED");
    }

    #[test]
    fn test_auth_response_serialization() {
        let response = AuthResponse::new("token".to_string(), 300);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"accessToken\":\"token\""));
        assert!(json.contains("\"tokenType\":\"Bearer\""));
        assert!(json.contains("\"expiresIn\":300"));
    }

    #[test]
    fn test_health_response() {
        let response = HealthResponse::healthy();
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, crate::VERSION);
    }
}
