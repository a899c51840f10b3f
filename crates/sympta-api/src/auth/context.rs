// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authenticated identity attached to requests.

use std::sync::Arc;

use super::rbac::RoleHierarchy;
use crate::users::UserRecord;

// =============================================================================
// AuthContext
// =============================================================================

/// The trusted identity attached to a request after successful
/// authentication.
///
/// Carries the fields the user lookup returned (password and soft-delete
/// markers already stripped) plus a handle to the role hierarchy so
/// downstream handlers can run their own role checks. Owned by the request;
/// never cached across requests.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User identifier.
    pub id: String,
    /// User email address.
    pub email: String,
    /// User role, upper-case.
    pub role: String,
    hierarchy: Arc<RoleHierarchy>,
}

impl AuthContext {
    /// Creates a context from a freshly loaded user record.
    pub fn new(user: &UserRecord, hierarchy: Arc<RoleHierarchy>) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.to_uppercase(),
            hierarchy,
        }
    }

    /// Returns `true` if the identity has exactly the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role.to_uppercase()
    }

    /// Returns `true` if the identity has any of the given roles exactly.
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    /// Returns `true` if the identity's role satisfies `required_role`
    /// under the configured hierarchy.
    pub fn has_role_access(&self, required_role: &str) -> bool {
        self.hierarchy.has_access(&self.role, required_role)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: &str) -> AuthContext {
        AuthContext::new(
            &UserRecord {
                id: "c000000000000000000000001".to_string(),
                email: "alice@example.com".to_string(),
                role: role.to_string(),
            },
            Arc::new(RoleHierarchy::default_hierarchy()),
        )
    }

    #[test]
    fn test_exact_role_check() {
        let ctx = context("ADMIN");
        assert!(ctx.has_role("ADMIN"));
        assert!(ctx.has_role("admin"));
        assert!(!ctx.has_role("USER"));
    }

    #[test]
    fn test_any_role_check() {
        let ctx = context("USER");
        assert!(ctx.has_any_role(&["ADMIN", "USER"]));
        assert!(!ctx.has_any_role(&["ADMIN", "EDITOR"]));
    }

    #[test]
    fn test_hierarchy_aware_check() {
        let admin = context("ADMIN");
        assert!(admin.has_role_access("USER"));
        assert!(!admin.has_role("USER"));

        let user = context("USER");
        assert!(!user.has_role_access("ADMIN"));
    }

    #[test]
    fn test_role_normalized_from_record() {
        let ctx = context("admin");
        assert_eq!(ctx.role, "ADMIN");
    }
}
