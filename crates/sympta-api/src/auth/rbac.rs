// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Hierarchical Role-Based Access Control.
//!
//! A flat role-equality check stops working once an admin must satisfy every
//! check written for lesser roles without the policy table listing one rule
//! per concrete role per route. The hierarchy declares which roles each role
//! directly inherits; access checks resolve the transitive closure.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Error raised when a declared hierarchy contains an inheritance cycle.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Role hierarchy contains a cycle through role {role}")]
pub struct RoleCycleError {
    /// A role participating in the cycle.
    pub role: String,
}

// =============================================================================
// RoleHierarchy
// =============================================================================

/// Mapping from role name to the roles it directly inherits.
///
/// Role names are normalized to upper-case at construction so comparisons
/// are case-stable everywhere. Built once at startup (cycles rejected there)
/// and shared read-only across requests; the closure walk still carries a
/// visited set so it terminates on any input.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    inherits: HashMap<String, Vec<String>>,
}

impl RoleHierarchy {
    /// Creates a builder.
    pub fn builder() -> RoleHierarchyBuilder {
        RoleHierarchyBuilder::new()
    }

    /// The application's default hierarchy:
    /// `ADMIN → [EDITOR, USER]`, `EDITOR → [USER]`, `USER → []`.
    pub fn default_hierarchy() -> Self {
        let mut inherits = HashMap::new();
        inherits.insert(
            "ADMIN".to_string(),
            vec!["EDITOR".to_string(), "USER".to_string()],
        );
        inherits.insert("EDITOR".to_string(), vec!["USER".to_string()]);
        inherits.insert("USER".to_string(), Vec::new());
        Self { inherits }
    }

    /// Returns `true` if `user_role` satisfies `required_role`.
    ///
    /// Either the roles are equal, or `required_role` appears in the
    /// transitive closure of the roles `user_role` inherits.
    pub fn has_access(&self, user_role: &str, required_role: &str) -> bool {
        let user_role = user_role.to_uppercase();
        let required_role = required_role.to_uppercase();

        if user_role == required_role {
            return true;
        }

        self.inherited_roles(&user_role).contains(&required_role)
    }

    /// Returns every role transitively inherited by `role`, de-duplicated.
    fn inherited_roles(&self, role: &str) -> HashSet<String> {
        let mut inherited = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();

        if let Some(direct) = self.inherits.get(role) {
            stack.extend(direct.iter().map(String::as_str));
        }

        while let Some(current) = stack.pop() {
            if !inherited.insert(current.to_string()) {
                continue;
            }
            if let Some(direct) = self.inherits.get(current) {
                stack.extend(direct.iter().map(String::as_str));
            }
        }

        inherited
    }

    /// Returns all declared role names.
    pub fn roles(&self) -> Vec<&str> {
        self.inherits.keys().map(String::as_str).collect()
    }
}

// =============================================================================
// RoleHierarchyBuilder
// =============================================================================

/// Builder validating the hierarchy before use.
#[derive(Debug, Default)]
pub struct RoleHierarchyBuilder {
    inherits: HashMap<String, Vec<String>>,
}

impl RoleHierarchyBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the roles directly inherited by `role`.
    pub fn inherit<I, S>(mut self, role: impl Into<String>, inherited: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherits.insert(
            role.into().to_uppercase(),
            inherited
                .into_iter()
                .map(|r| r.into().to_uppercase())
                .collect(),
        );
        self
    }

    /// Builds the hierarchy, rejecting inheritance cycles.
    ///
    /// A cycle would have made the original recursive walk diverge; here it
    /// is a configuration error surfaced at startup.
    pub fn build(self) -> Result<RoleHierarchy, RoleCycleError> {
        for start in self.inherits.keys() {
            let mut visited = HashSet::new();
            let mut stack: Vec<&str> = vec![start];

            while let Some(current) = stack.pop() {
                if !visited.insert(current.to_string()) {
                    continue;
                }
                if let Some(direct) = self.inherits.get(current) {
                    for next in direct {
                        if next == start {
                            return Err(RoleCycleError {
                                role: start.clone(),
                            });
                        }
                        stack.push(next);
                    }
                }
            }
        }

        Ok(RoleHierarchy {
            inherits: self.inherits,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
