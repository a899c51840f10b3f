// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, TokenClaims};
use crate::error::{ApiError, ApiResult};
use crate::extractors::Auth;
use crate::response::{ApiResponse, AuthResponse};
use crate::state::AppState;
use crate::users::NewUser;

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

// =============================================================================
// Register
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name, 3..=100 characters.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password, 8..=255 characters.
    pub password: String,
    /// Role; defaults to USER.
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "USER".to_string()
}

/// POST /api/v1/users/register
///
/// Creates a user with a hashed password.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("Processing user registration");
    validate_register(&request)?;

    let digest = state.passwords.hash(&request.password)?;
    let user = state
        .users
        .insert(NewUser {
            username: request.username,
            email: request.email,
            role: request.role,
            password_digest: digest,
        })
        .await?;

    tracing::info!(email = %user.email, "User registered successfully");
    Ok(ApiResponse::created(
        "SUCCESSFULLY_CREATE_USER",
        serde_json::json!({ "message": "User registered successfully" }),
    ))
}

fn validate_register(request: &RegisterRequest) -> ApiResult<()> {
    if request.username.len() < 3 || request.username.len() > 100 {
        return Err(ApiError::validation(
            "username must have between 3 and 100 characters",
        ));
    }
    if request.email.is_empty() || request.email.len() > 255 || !request.email.contains('@') {
        return Err(ApiError::validation("invalid format email"));
    }
    if request.password.len() < 8 || request.password.len() > 255 {
        return Err(ApiError::validation(
            "password must have between 8 and 255 characters",
        ));
    }
    let role = request.role.to_uppercase();
    if role != "ADMIN" && role != "USER" {
        return Err(ApiError::validation(
            "the role must be equal 'ADMIN', 'USER'",
        ));
    }
    Ok(())
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/users/login
///
/// Verifies the credentials, then issues an access token (response body)
/// and a refresh token (HTTP-only cookie).
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    tracing::info!("Processing user login");

    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    let (user, digest) = state
        .users
        .find_with_password(&request.email)
        .await
        .ok_or_else(|| ApiError::unauthorized("email or password wrong"))?;

    if !state.passwords.verify(&request.password, &digest) {
        return Err(ApiError::unauthorized("email or password wrong"));
    }

    let claims = TokenClaims::from_user(&user);
    let access_token = state.issuer.issue_access_token(&claims)?;
    let refresh_token = state.issuer.issue_refresh_token(&claims)?;

    tracing::info!(email = %user.email, "User logged in successfully");

    let body = ApiResponse::ok(
        "SUCCESSFULLY_LOGIN_USERS",
        AuthResponse::new(access_token, state.config.access_token_ttl_secs),
    );

    let mut response = body.into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        refresh_cookie(&refresh_token, state.config.production)?,
    );
    Ok(response)
}

// =============================================================================
// Refresh Token
// =============================================================================

/// POST /api/v1/users/refresh
///
/// Exchanges the refresh-token cookie for a new access token. The refresh
/// token itself is not rotated.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("Processing refresh token");

    let refresh_token = cookie_value(&headers, REFRESH_COOKIE_NAME)
        .ok_or_else(|| ApiError::validation("missing or invalid refresh token"))?;

    tracing::debug!("Verifying refresh token");
    let access_token = state
        .issuer
        .refresh(&refresh_token, state.users.as_ref())
        .await
        .map_err(|err| match err {
            AuthError::UserNotFound => ApiError::not_found("users"),
            other => ApiError::from(other),
        })?;

    tracing::info!("Successfully verified refresh token");
    Ok(ApiResponse::ok(
        "SUCCESSFULLY_USERS_REFRESH_TOKEN",
        AuthResponse::new(access_token, state.config.access_token_ttl_secs),
    ))
}

// =============================================================================
// Profile
// =============================================================================

/// Profile response body.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User identifier.
    pub id: String,
    /// User email address.
    pub email: String,
    /// User role.
    pub role: String,
}

/// GET /api/v1/users/profile
///
/// Returns the authenticated identity.
pub async fn profile(Auth(ctx): Auth) -> ApiResult<impl IntoResponse> {
    Ok(ApiResponse::ok(
        "SUCCESSFULLY_GET_ALL_USERS",
        ProfileResponse {
            id: ctx.id,
            email: ctx.email,
            role: ctx.role,
        },
    ))
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Builds the refresh-token cookie: HTTP-only, `SameSite=None`, scoped to
/// `/`, marked Secure in production.
fn refresh_cookie(token: &str, production: bool) -> ApiResult<HeaderValue> {
    let secure = if production { "; Secure" } else { "" };
    let value = format!(
        "{}={}; Path=/; HttpOnly; SameSite=None{}",
        REFRESH_COOKIE_NAME, token, secure
    );
    HeaderValue::from_str(&value)
        .map_err(|err| ApiError::internal(format!("Invalid cookie value: {}", err)))
}

/// Reads a cookie value from the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let (key, value) = cookie.trim().split_once('=')?;
                (key == name).then(|| value.to_string())
            })
        })
}

// =============================================================================
// Tests
// =============================================================================
