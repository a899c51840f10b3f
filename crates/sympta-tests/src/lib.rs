// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sympta-tests
//!
//! Shared harness for Sympta integration tests.

#![deny(unsafe_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::Duration;

use sympta_api::auth::{KeyMaterial, TokenClaims, TokenIssuer};
use sympta_api::users::NewUser;
use sympta_api::{ApiConfig, ApiServer, AppState, MemoryUserStore, PasswordService, UserStore};

/// Password shared by every seeded test user.
pub const TEST_PASSWORD: &str = "password123";

/// A fully wired application for driving requests through the router.
pub struct TestHarness {
    /// The router under test.
    pub router: Router,
    /// Token issuer sharing the harness key material.
    pub issuer: Arc<TokenIssuer>,
    /// Key material backing the issuer.
    pub keys: KeyMaterial,
    /// The seeded user store.
    pub store: Arc<MemoryUserStore>,
    /// The configuration the server was built with.
    pub config: ApiConfig,
}

impl TestHarness {
    /// Builds a harness with fresh keys and two seeded users:
    /// `alice@example.com` (USER) and `root@example.com` (ADMIN).
    pub async fn new() -> Self {
        Self::with_config(ApiConfig::default()).await
    }

    /// Builds a harness with the given configuration.
    pub async fn with_config(config: ApiConfig) -> Self {
        let keys = KeyMaterial::generate().expect("generate key material");
        let issuer = Arc::new(
            TokenIssuer::from_key_material(
                &keys,
                &config.issuer,
                config.access_ttl(),
                config.refresh_ttl(),
            )
            .expect("build token issuer"),
        );

        let passwords = PasswordService::new();
        let store = Arc::new(MemoryUserStore::new());
        for (username, email, role) in [
            ("alice", "alice@example.com", "USER"),
            ("root", "root@example.com", "ADMIN"),
        ] {
            store
                .insert(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    role: role.to_string(),
                    password_digest: passwords.hash(TEST_PASSWORD).expect("hash password"),
                })
                .await
                .expect("seed user");
        }

        let state = AppState::builder()
            .config(config.clone())
            .issuer(issuer.clone())
            .users(store.clone())
            .build()
            .expect("build app state");

        Self {
            router: ApiServer::new(state).router(),
            issuer,
            keys,
            store,
            config,
        }
    }

    /// Issues a valid access token for a seeded user.
    pub async fn access_token_for(&self, email: &str) -> String {
        let user = self
            .store
            .find_by_email(email)
            .await
            .expect("seeded user exists");
        self.issuer
            .issue_access_token(&TokenClaims::from_user(&user))
            .expect("issue access token")
    }

    /// Issues a refresh token for a seeded user.
    pub async fn refresh_token_for(&self, email: &str) -> String {
        let user = self
            .store
            .find_by_email(email)
            .await
            .expect("seeded user exists");
        self.issuer
            .issue_refresh_token(&TokenClaims::from_user(&user))
            .expect("issue refresh token")
    }
}

/// Builds a request with an optional bearer token.
pub fn request(method: Method, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

/// Builds a JSON POST request.
pub fn json_request(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

/// Reads a response body as JSON.
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Asserts the response is the standard error envelope with the given
/// status and code.
pub async fn assert_error_envelope(
    response: Response<Body>,
    status: StatusCode,
    code: &str,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let body = response_json(response).await;
    let error = &body["errors"][0];
    assert_eq!(error["status"], status.as_u16());
    assert_eq!(error["code"], code);
    body["errors"][0].clone()
}
