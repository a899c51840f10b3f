// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sympta-api
//!
//! REST API core for the Sympta symptom/disease diagnosis service.
//!
//! This crate provides the HTTP server with the authentication and
//! authorization pipeline: JWK key material loading, signed tokens (JWS)
//! wrapping encrypted identity payloads (JWE), a declarative route policy
//! table, and a hierarchical role-based access control resolver.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;
pub mod users;

pub use auth::{
    AuthContext, KeyMaterial, PayloadCipher, RoleHierarchy, RoutePolicy, TokenClaims, TokenIssuer,
    TokenSigner,
};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, AuthResponse};
pub use server::ApiServer;
pub use state::AppState;
pub use users::{MemoryUserStore, PasswordService, UserRecord, UserStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
