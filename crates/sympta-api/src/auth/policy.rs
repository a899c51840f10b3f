// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Declarative route protection rules.
//!
//! Route protection is data, not code: the middleware consults a table of
//! `(path matcher, method, required role)` rules that can be audited and
//! tested on its own. Rules are matched in declaration order and the first
//! match wins; a path no rule matches is public.

use axum::http::Method;
use regex::Regex;

// =============================================================================
// PathMatcher
// =============================================================================

/// How a rule matches the request path.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Matches the path exactly.
    Exact(String),
    /// Matches the path against a compiled regular expression.
    ///
    /// Needed for parameterized resources (`/resource/{id}`) and collection
    /// endpoints with optional query strings.
    Pattern(Regex),
}

impl PathMatcher {
    /// Returns `true` if the matcher accepts the given path.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(exact) => exact == path,
            PathMatcher::Pattern(pattern) => pattern.is_match(path),
        }
    }
}

// =============================================================================
// RouteRule
// =============================================================================

/// One entry in the route policy table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    matcher: PathMatcher,
    method: Option<Method>,
    required_role: Option<String>,
}

impl RouteRule {
    /// Creates a rule with an exact path.
    pub fn exact(path: impl Into<String>) -> Self {
        Self {
            matcher: PathMatcher::Exact(path.into()),
            method: None,
            required_role: None,
        }
    }

    /// Creates a rule with a regex path pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            matcher: PathMatcher::Pattern(Regex::new(pattern)?),
            method: None,
            required_role: None,
        })
    }

    /// Restricts the rule to one HTTP method; absent means any method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Requires a minimum role; absent means "authenticated, any role".
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.required_role = Some(role.into().to_uppercase());
        self
    }

    fn matches(&self, path: &str, method: &Method) -> bool {
        let method_matches = match &self.method {
            Some(required) => required == method,
            None => true,
        };
        method_matches && self.matcher.matches(path)
    }
}

// =============================================================================
// RouteProtection
// =============================================================================

/// The outcome of evaluating a request against the policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteProtection {
    /// Whether the route requires authentication.
    pub protected: bool,
    /// Role required by the matched rule, if any.
    pub required_role: Option<String>,
}

impl RouteProtection {
    /// A public route.
    pub fn public() -> Self {
        Self {
            protected: false,
            required_role: None,
        }
    }
}

// =============================================================================
// RoutePolicy
// =============================================================================

/// The route policy table.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Creates a policy from an ordered list of rules.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Creates an empty policy (every route public).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates a request against the table.
    ///
    /// Rules are scanned in declaration order; the first rule whose path and
    /// method both match decides the outcome. No match means the route is
    /// public.
    pub fn evaluate(&self, path: &str, method: &Method) -> RouteProtection {
        match self.rules.iter().find(|rule| rule.matches(path, method)) {
            Some(rule) => RouteProtection {
                protected: true,
                required_role: rule.required_role.clone(),
            },
            None => RouteProtection::public(),
        }
    }

    /// The application's default protection table.
    pub fn default_table() -> Self {
        // Static patterns; compilation cannot fail.
        let pattern = |p: &str| RouteRule::pattern(p).expect("valid route pattern");

        Self::new(vec![
            // Users
            RouteRule::exact("/api/v1/users").with_method(Method::PUT),
            pattern(r"^/api/v1/users/.*$")
                .with_method(Method::DELETE)
                .with_role("admin"),
            pattern(r"^/api/v1/users(\?.*)?$")
                .with_method(Method::GET)
                .with_role("admin"),
            pattern(r"^/api/v1/users/cursor(\?.*)?$")
                .with_method(Method::GET)
                .with_role("admin"),
            RouteRule::exact("/api/v1/users/profile").with_method(Method::GET),
            // Diseases and symptoms are admin-managed
            pattern(r"^/api/v1/diseases/[^/]+$")
                .with_method(Method::PUT)
                .with_role("admin"),
            pattern(r"^/api/v1/symptoms/[^/]+$")
                .with_method(Method::PUT)
                .with_role("admin"),
            // Diagnoses
            RouteRule::exact("/api/v1/diagnoses").with_method(Method::POST),
            pattern(r"^/api/v1/diagnoses/[^/]+$").with_method(Method::PUT),
            pattern(r"^/api/v1/diagnoses/[^/]+$").with_method(Method::DELETE),
            pattern(r"^/api/v1/diagnoses/relationship/users/[^/]+$")
                .with_method(Method::GET)
                .with_role("admin"),
            RouteRule::exact("/api/v1/diagnoses/self/relationship/users").with_method(Method::GET),
            pattern(r"^/api/v1/diagnoses/self/relationship/diseases/[^/]+$")
                .with_method(Method::GET),
            pattern(r"^/api/v1/diagnoses/relationship/diseases/[^/]+$")
                .with_method(Method::GET)
                .with_role("admin"),
            pattern(r"^/api/v1/diagnoses/relationship/symptoms(\?.*)?$")
                .with_method(Method::GET)
                .with_role("admin"),
            pattern(r"^/api/v1/diagnoses(\?.*)?$")
                .with_method(Method::GET)
                .with_role("admin"),
            pattern(r"^/api/v1/diagnoses/self/relationship/symptoms(\?.*)?$")
                .with_method(Method::GET),
            pattern(r"^/api/v1/diagnoses/relationship/users/[^/]+/statistics$")
                .with_method(Method::GET)
                .with_role("admin"),
            RouteRule::exact("/api/v1/diagnoses/self/relationship/users/statistics")
                .with_method(Method::GET),
        ])
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let policy = RoutePolicy::new(vec![
            RouteRule::exact("/api/v1/users/profile").with_method(Method::GET)
        ]);

        let result = policy.evaluate("/api/v1/users/profile", &Method::GET);
        assert!(result.protected);
        assert_eq!(result.required_role, None);

        // Different method is public.
        let result = policy.evaluate("/api/v1/users/profile", &Method::POST);
        assert!(!result.protected);
    }

    #[test]
    fn test_pattern_match_with_role() {
        let policy = RoutePolicy::new(vec![RouteRule::pattern(r"^/api/v1/users/.*$")
            .unwrap()
            .with_method(Method::DELETE)
            .with_role("admin")]);

        let result = policy.evaluate("/api/v1/users/abc123", &Method::DELETE);
        assert!(result.protected);
        assert_eq!(result.required_role, Some("ADMIN".to_string()));
    }

    #[test]
    fn test_no_match_is_public() {
        let policy = RoutePolicy::default_table();
        let result = policy.evaluate("/api/v1/diseases", &Method::GET);
        assert_eq!(result, RouteProtection::public());
    }

    #[test]
    fn test_rule_without_method_matches_any() {
        let policy =
            RoutePolicy::new(vec![RouteRule::pattern(r"^/api/v1/admin(/.*)?$")
                .unwrap()
                .with_role("ADMIN")]);

        for method in [Method::GET, Method::POST, Method::DELETE] {
            assert!(policy.evaluate("/api/v1/admin/keys", &method).protected);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let policy = RoutePolicy::new(vec![
            RouteRule::exact("/api/v1/diagnoses").with_method(Method::POST),
            RouteRule::pattern(r"^/api/v1/diagnoses.*$")
                .unwrap()
                .with_method(Method::POST)
                .with_role("admin"),
        ]);

        // The earlier, role-free rule decides.
        let result = policy.evaluate("/api/v1/diagnoses", &Method::POST);
        assert!(result.protected);
        assert_eq!(result.required_role, None);
    }

    #[test]
    fn test_query_string_pattern() {
        let policy = RoutePolicy::default_table();

        let result = policy.evaluate("/api/v1/diagnoses?size=10", &Method::GET);
        assert!(result.protected);
        assert_eq!(result.required_role, Some("ADMIN".to_string()));
    }

    #[test]
    fn test_default_table_samples() {
        let policy = RoutePolicy::default_table();

        // Self-service diagnosis listing requires auth but no role.
        let result = policy.evaluate(
            "/api/v1/diagnoses/self/relationship/users",
            &Method::GET,
        );
        assert!(result.protected);
        assert_eq!(result.required_role, None);

        // Per-user diagnosis listing is admin only.
        let result = policy.evaluate(
            "/api/v1/diagnoses/relationship/users/c000000000000000000000001",
            &Method::GET,
        );
        assert_eq!(result.required_role, Some("ADMIN".to_string()));

        // Login and register are public.
        assert!(!policy.evaluate("/api/v1/users/login", &Method::POST).protected);
        assert!(!policy.evaluate("/api/v1/users/register", &Method::POST).protected);
    }
}
