// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Authentication Integration Tests
//!
//! End-to-end scenarios driven through the full router:
//!
//! - `test_auth_*`: token pipeline outcomes (401 reasons, expiry, tampering)
//! - `test_rbac_*`: role-based access control outcomes (403)
//! - `test_login_*` / `test_refresh_*`: issuance flows and cookie contract

use axum::http::{header, Method, StatusCode};
use chrono::Duration;
use serde_json::json;
use tower::ServiceExt;

use sympta_api::auth::{PayloadCipher, TokenClaims, TokenSigner};
use sympta_api::ApiConfig;
use sympta_tests::{
    assert_error_envelope, json_request, request, response_json, TestHarness, TEST_PASSWORD,
};

// =============================================================================
// Token Pipeline
// =============================================================================

#[tokio::test]
async fn test_auth_missing_token_is_unauthorized() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(request(Method::GET, "/api/v1/users/profile", None))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(error["detail"], "Missing or invalid authorization token");
}

#[tokio::test]
async fn test_auth_public_route_needs_no_token() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_valid_token_reaches_handler() {
    let harness = TestHarness::new().await;
    let token = harness.access_token_for("alice@example.com").await;

    let response = harness
        .router
        .clone()
        .oneshot(request(Method::GET, "/api/v1/users/profile", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "USER");
}

#[tokio::test]
async fn test_auth_expired_token_reports_expiry() {
    let config = ApiConfig::default().with_access_ttl(-60);
    let harness = TestHarness::with_config(config).await;
    let token = harness.access_token_for("alice@example.com").await;

    let response = harness
        .router
        .oneshot(request(Method::GET, "/api/v1/users/profile", Some(&token)))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    // The expiry outcome is distinguishable from a generic verification
    // failure so clients can auto-refresh.
    assert_eq!(error["detail"], "Token has been expired");
}

#[tokio::test]
async fn test_auth_refresh_token_is_not_an_access_token() {
    let harness = TestHarness::new().await;
    let refresh_token = harness.refresh_token_for("alice@example.com").await;

    let response = harness
        .router
        .oneshot(request(
            Method::GET,
            "/api/v1/users/profile",
            Some(&refresh_token),
        ))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    let detail = error["detail"].as_str().unwrap();
    assert!(detail.starts_with("Token verification failed"), "{}", detail);
}

#[tokio::test]
async fn test_auth_tampered_ciphertext_is_a_decryption_failure() {
    let harness = TestHarness::new().await;

    // Re-sign a tampered ciphertext with the real access key so the
    // signature check passes and the failure lands in the decryption stage.
    let cipher = PayloadCipher::new(&harness.keys.encryption).unwrap();
    let signer = TokenSigner::new(&harness.keys.access, &harness.config.issuer).unwrap();

    let claims = TokenClaims::new("c000000000000000000000001", "alice@example.com", "USER");
    let ciphertext = cipher.encrypt_payload(&claims).unwrap();

    let mut parts: Vec<String> = ciphertext.split('.').map(String::from).collect();
    let flipped = if parts[3].as_bytes()[0] == b'A' { "B" } else { "A" };
    parts[3].replace_range(0..1, flipped);
    let tampered = parts.join(".");

    let mut outer = serde_json::Map::new();
    outer.insert("data".to_string(), serde_json::Value::String(tampered));
    let token = signer.generate_token(outer, Duration::minutes(5)).unwrap();

    let response = harness
        .router
        .oneshot(request(Method::GET, "/api/v1/users/profile", Some(&token)))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(error["detail"], "Token decryption failed");
}

#[tokio::test]
async fn test_auth_invalid_payload_shape_is_rejected() {
    let harness = TestHarness::new().await;

    // Well-formed token whose decrypted payload fails schema validation.
    let cipher = PayloadCipher::new(&harness.keys.encryption).unwrap();
    let signer = TokenSigner::new(&harness.keys.access, &harness.config.issuer).unwrap();

    let ciphertext = cipher
        .encrypt_payload(&json!({ "id": "too-short", "email": "alice@example.com", "role": "USER" }))
        .unwrap();
    let mut outer = serde_json::Map::new();
    outer.insert("data".to_string(), serde_json::Value::String(ciphertext));
    let token = signer.generate_token(outer, Duration::minutes(5)).unwrap();

    let response = harness
        .router
        .oneshot(request(Method::GET, "/api/v1/users/profile", Some(&token)))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(error["detail"], "Invalid token payload");
}

#[tokio::test]
async fn test_auth_unknown_user_is_rejected() {
    let harness = TestHarness::new().await;
    let token = harness.access_token_for("alice@example.com").await;

    harness.store.soft_delete("alice@example.com").await;

    let response = harness
        .router
        .oneshot(request(Method::GET, "/api/v1/users/profile", Some(&token)))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(error["detail"], "User not found or invalid");
}

// =============================================================================
// RBAC
// =============================================================================

#[tokio::test]
async fn test_rbac_user_role_is_forbidden_on_admin_route() {
    let harness = TestHarness::new().await;
    let token = harness.access_token_for("alice@example.com").await;

    let response = harness
        .router
        .oneshot(request(
            Method::DELETE,
            "/api/v1/users/someone@example.com",
            Some(&token),
        ))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
    assert_eq!(error["detail"], "Access denied. Required role: ADMIN");
}

#[tokio::test]
async fn test_rbac_admin_satisfies_admin_route() {
    let harness = TestHarness::new().await;
    let token = harness.access_token_for("root@example.com").await;

    // The route policy admits the request; the router has no DELETE
    // handler for this path, so a 404/405 (rather than 401/403) proves the
    // middleware let it through.
    let response = harness
        .router
        .oneshot(request(
            Method::DELETE,
            "/api/v1/users/someone@example.com",
            Some(&token),
        ))
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_access_token_and_refresh_cookie() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .clone()
        .oneshot(json_request(
            "/api/v1/users/login",
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=None"));
    assert!(!cookie.contains("Secure"));

    let body = response_json(response).await;
    assert_eq!(body["code"], "STATUS_OK");
    let access_token = body["data"]["accessToken"].as_str().unwrap();

    // The returned access token authenticates follow-up requests.
    let response = harness
        .router
        .oneshot(request(
            Method::GET,
            "/api/v1/users/profile",
            Some(access_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_cookie_is_secure_in_production() {
    let config = ApiConfig::default().with_production(true);
    let harness = TestHarness::with_config(config).await;

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/login",
            json!({ "email": "alice@example.com", "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/login",
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/login",
            json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// =============================================================================
// Register
// =============================================================================

#[tokio::test]
async fn test_register_then_login() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .clone()
        .oneshot(json_request(
            "/api/v1/users/register",
            json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "bobpassword"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/login",
            json!({ "email": "bob@example.com", "password": "bobpassword" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/register",
            json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[tokio::test]
async fn test_register_invalid_payload_is_validation_error() {
    let harness = TestHarness::new().await;

    let response = harness
        .router
        .oneshot(json_request(
            "/api/v1/users/register",
            json!({ "username": "x", "email": "bad", "password": "short" }),
        ))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// =============================================================================
// Refresh
// =============================================================================

fn refresh_request(cookie: Option<&str>) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users/refresh");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(axum::body::Body::empty()).unwrap()
}

#[tokio::test]
async fn test_refresh_missing_cookie_is_validation_error() {
    let harness = TestHarness::new().await;

    let response = harness.router.oneshot(refresh_request(None)).await.unwrap();
    assert_error_envelope(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn test_refresh_yields_new_valid_access_tokens() {
    let harness = TestHarness::new().await;
    let refresh_token = harness.refresh_token_for("alice@example.com").await;
    let cookie = format!("refreshToken={}", refresh_token);

    // Two refreshes with the same token both succeed; the refresh token is
    // not rotated.
    let mut access_tokens = Vec::new();
    for _ in 0..2 {
        let response = harness
            .router
            .clone()
            .oneshot(refresh_request(Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        access_tokens.push(body["data"]["accessToken"].as_str().unwrap().to_string());
    }
    assert_ne!(access_tokens[0], access_tokens[1]);

    // Both access tokens are independently valid.
    for token in &access_tokens {
        let response = harness
            .router
            .clone()
            .oneshot(request(Method::GET, "/api/v1/users/profile", Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_refresh_with_expired_token_is_unauthorized() {
    let config = ApiConfig::default().with_refresh_ttl(-60);
    let harness = TestHarness::with_config(config).await;
    let refresh_token = harness.refresh_token_for("alice@example.com").await;

    let response = harness
        .router
        .oneshot(refresh_request(Some(&format!(
            "refreshToken={}",
            refresh_token
        ))))
        .await
        .unwrap();

    let error = assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(error["detail"], "Token has been expired");
}

#[tokio::test]
async fn test_refresh_for_deleted_user_is_not_found() {
    let harness = TestHarness::new().await;
    let refresh_token = harness.refresh_token_for("alice@example.com").await;

    harness.store.soft_delete("alice@example.com").await;

    let response = harness
        .router
        .oneshot(refresh_request(Some(&format!(
            "refreshToken={}",
            refresh_token
        ))))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn test_refresh_rejects_access_token_in_cookie() {
    let harness = TestHarness::new().await;
    let access_token = harness.access_token_for("alice@example.com").await;

    let response = harness
        .router
        .oneshot(refresh_request(Some(&format!(
            "refreshToken={}",
            access_token
        ))))
        .await
        .unwrap();

    assert_error_envelope(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}
