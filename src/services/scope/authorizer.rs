//! Scope authorization: (path, method) → required scopes → allow/deny.
//!
//! Pure and lock-free. Token authenticity is not checked here; callers hand in
//! the scope set of an already-validated token.

use serde::Serialize;

use super::rules::{ROUTE_SCOPE_RULES, RouteScopeRule};
use super::types::{Scope, format_scopes};

/// Outcome of a scope check.
///
/// `required_scopes` is filled from the matched rule whether or not the
/// request is allowed. For an unknown route it is empty and `route` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationResult {
    pub allowed: bool,
    pub required_scopes: Vec<Scope>,
    pub route: Option<&'static str>,
}

impl AuthorizationResult {
    fn unknown_route() -> Self {
        Self {
            allowed: false,
            required_scopes: Vec::new(),
            route: None,
        }
    }

    pub fn is_unknown_route(&self) -> bool {
        self.route.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("this action requires one of: {}", format_scopes(.required_scopes))]
    AccessDenied { required_scopes: Vec<Scope> },

    #[error("no scope rule for {method} {path}")]
    UnknownRoute { method: String, path: String },
}

/// Check `token_scopes` against the compiled-in route table.
pub fn has_required_scope(token_scopes: &[Scope], path: &str, method: &str) -> AuthorizationResult {
    ScopeAuthorizer::default().check(token_scopes, path, method)
}

#[derive(Debug, Clone, Copy)]
pub struct ScopeAuthorizer {
    rules: &'static [RouteScopeRule],
}

impl Default for ScopeAuthorizer {
    fn default() -> Self {
        Self::new(ROUTE_SCOPE_RULES)
    }
}

impl ScopeAuthorizer {
    pub const fn new(rules: &'static [RouteScopeRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [RouteScopeRule] {
        self.rules
    }

    /// First rule matching (path, method) wins.
    pub fn find_rule(&self, path: &str, method: &str) -> Option<&'static RouteScopeRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    pub fn check(&self, token_scopes: &[Scope], path: &str, method: &str) -> AuthorizationResult {
        // deny-by-default: an unmapped route is never forwarded, even for `all`
        let Some(rule) = self.find_rule(path, method) else {
            return AuthorizationResult::unknown_route();
        };

        let allowed = if token_scopes.contains(&Scope::All) {
            true
        } else {
            rule.scopes.iter().any(|required| token_scopes.contains(required))
        };

        AuthorizationResult {
            allowed,
            required_scopes: rule.scopes.to_vec(),
            route: Some(rule.pattern),
        }
    }

    /// Same as [`check`](Self::check), but a denial comes back as an error.
    pub fn authorize(
        &self,
        token_scopes: &[Scope],
        path: &str,
        method: &str,
    ) -> Result<AuthorizationResult, AuthzError> {
        let result = self.check(token_scopes, path, method);

        if result.is_unknown_route() {
            return Err(AuthzError::UnknownRoute {
                method: method.to_ascii_uppercase(),
                path: path.to_string(),
            });
        }
        if !result.allowed {
            return Err(AuthzError::AccessDenied {
                required_scopes: result.required_scopes,
            });
        }

        Ok(result)
    }
}
