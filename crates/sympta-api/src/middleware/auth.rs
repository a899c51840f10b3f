// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token authentication middleware.
//!
//! Every inbound request is checked against the route policy table. For a
//! protected route the middleware runs a sequential pipeline — extract
//! bearer token, verify signature, decrypt payload, validate claims, load
//! the user, check the required role — where each stage fails with its own
//! [`AuthError`] kind and the first failure rejects the request. On success
//! the resolved [`AuthContext`] is attached to the request for downstream
//! handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthContext, AuthError, RoleHierarchy, RoutePolicy, TokenClaims, TokenIssuer};
use crate::error::ApiError;
use crate::users::{UserRecord, UserStore};

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer applying token authentication to a service.
///
/// All collaborators are process-wide, read-only and shared via `Arc`; the
/// middleware holds no cross-request mutable state.
#[derive(Clone)]
pub struct AuthLayer {
    policy: Arc<RoutePolicy>,
    issuer: Arc<TokenIssuer>,
    hierarchy: Arc<RoleHierarchy>,
    users: Arc<dyn UserStore>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(
        policy: Arc<RoutePolicy>,
        issuer: Arc<TokenIssuer>,
        hierarchy: Arc<RoleHierarchy>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            policy,
            issuer,
            hierarchy,
            users,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            policy: self.policy.clone(),
            issuer: self.issuer.clone(),
            hierarchy: self.hierarchy.clone(),
            users: self.users.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware enforcing the route policy table.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    policy: Arc<RoutePolicy>,
    issuer: Arc<TokenIssuer>,
    hierarchy: Arc<RoleHierarchy>,
    users: Arc<dyn UserStore>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let protection = self.policy.evaluate(req.uri().path(), req.method());
        let issuer = self.issuer.clone();
        let hierarchy = self.hierarchy.clone();
        let users = self.users.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !protection.protected {
                return inner.call(req).await;
            }

            let path = req.uri().path().to_string();
            tracing::info!(path = %path, "Starting authentication");

            let result = authenticate(
                extract_bearer_token(&req),
                protection.required_role.as_deref(),
                &issuer,
                &hierarchy,
                users.as_ref(),
            )
            .await;

            match result {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "Authentication successful");
                    let context = AuthContext::new(&user, hierarchy);
                    req.extensions_mut().insert(context);
                    inner.call(req).await
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Authentication rejected");
                    Ok(ApiError::from(err).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Authentication Pipeline
// =============================================================================

/// Runs the per-request authentication pipeline.
///
/// The stages are strictly sequential: the signature must be verified
/// before the payload is trusted enough to decrypt, decryption must succeed
/// before schema validation, and validation must pass before the user
/// lookup is trusted. There is no retry; the first failure is terminal for
/// the request.
async fn authenticate(
    token: Option<&str>,
    required_role: Option<&str>,
    issuer: &TokenIssuer,
    hierarchy: &RoleHierarchy,
    users: &dyn UserStore,
) -> Result<UserRecord, AuthError> {
    tracing::debug!("Attempting to get token from Authorization header");
    let token = token.ok_or(AuthError::MissingToken)?;

    tracing::debug!("Verifying token signature");
    let payload = issuer.verify_access_token(token)?;

    tracing::debug!("Decrypting token payload");
    let decrypted = issuer.decrypt_token_payload(&payload)?;

    tracing::debug!("Validating token payload");
    let claims = TokenClaims::from_value(decrypted)?;

    tracing::debug!(email = %claims.email, "Loading user");
    let user = users
        .find_by_email(&claims.email)
        .await
        .ok_or(AuthError::UserNotFound)?;

    if let Some(required) = required_role {
        if !hierarchy.has_access(&user.role, required) {
            return Err(AuthError::AccessDenied {
                required: required.to_uppercase(),
            });
        }
        tracing::info!(user_id = %user.id, role = %user.role, "Role-based access granted");
    }

    Ok(user)
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

// =============================================================================
// Tests
// =============================================================================
