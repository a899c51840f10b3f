// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthLayer`] / [`AuthMiddleware`]: token authentication and
//!   role-based authorization driven by the route policy table.

mod auth;

pub use auth::{AuthLayer, AuthMiddleware};
