// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{RoleHierarchy, RoutePolicy, TokenIssuer};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::users::{PasswordService, UserStore};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Every collaborator is constructed once at process start and injected
/// here; the state is cloned per request but all fields are shared,
/// read-only `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token issuer for login/refresh.
    pub issuer: Arc<TokenIssuer>,
    /// Route protection table.
    pub policy: Arc<RoutePolicy>,
    /// Role hierarchy for authorization checks.
    pub hierarchy: Arc<RoleHierarchy>,
    /// User lookup collaborator.
    pub users: Arc<dyn UserStore>,
    /// Password digest service.
    pub passwords: Arc<PasswordService>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing [`AppState`].
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    issuer: Option<Arc<TokenIssuer>>,
    policy: Option<Arc<RoutePolicy>>,
    hierarchy: Option<Arc<RoleHierarchy>>,
    users: Option<Arc<dyn UserStore>>,
    passwords: Option<Arc<PasswordService>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token issuer.
    pub fn issuer(mut self, issuer: Arc<TokenIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Sets the route policy table.
    pub fn policy(mut self, policy: Arc<RoutePolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the role hierarchy.
    pub fn hierarchy(mut self, hierarchy: Arc<RoleHierarchy>) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    /// Sets the user store.
    pub fn users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets the password service.
    pub fn passwords(mut self, passwords: Arc<PasswordService>) -> Self {
        self.passwords = Some(passwords);
        self
    }

    /// Builds the state.
    ///
    /// The issuer and user store have no defaults; everything else falls
    /// back to the application defaults.
    pub fn build(self) -> ApiResult<AppState> {
        let issuer = self
            .issuer
            .ok_or_else(|| ApiError::internal("AppState requires a token issuer"))?;
        let users = self
            .users
            .ok_or_else(|| ApiError::internal("AppState requires a user store"))?;

        Ok(AppState {
            config: Arc::new(self.config.unwrap_or_default()),
            issuer,
            policy: self
                .policy
                .unwrap_or_else(|| Arc::new(RoutePolicy::default_table())),
            hierarchy: self
                .hierarchy
                .unwrap_or_else(|| Arc::new(RoleHierarchy::default_hierarchy())),
            users,
            passwords: self.passwords.unwrap_or_default(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::auth::KeyMaterial;
    use crate::users::MemoryUserStore;

    fn test_issuer() -> Arc<TokenIssuer> {
        let keys = KeyMaterial::generate().unwrap();
        Arc::new(
            TokenIssuer::from_key_material(
                &keys,
                "sympta-test",
                Duration::minutes(5),
                Duration::days(7),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let state = AppState::builder()
            .issuer(test_issuer())
            .users(Arc::new(MemoryUserStore::new()))
            .build()
            .unwrap();

        assert!(!state.policy.is_empty());
        assert!(state.hierarchy.has_access("ADMIN", "USER"));
        assert_eq!(state.config.port, 8080);
    }

    #[test]
    fn test_builder_requires_issuer() {
        let result = AppState::builder()
            .users(Arc::new(MemoryUserStore::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_users() {
        let result = AppState::builder().issuer(test_issuer()).build();
        assert!(result.is_err());
    }
}
