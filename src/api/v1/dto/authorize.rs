use serde::{Deserialize, Serialize};

use crate::services::scope::{AuthorizationResult, Scope, ScopeParseError, parse_scopes};

/// `scopes` (array) and `scope` (OAuth-style string) are merged.
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub path: String,
    pub method: String,
}

impl AuthorizeRequest {
    pub fn token_scopes(&self) -> Result<Vec<Scope>, ScopeParseError> {
        let mut scopes = self
            .scopes
            .iter()
            .map(|s| s.parse::<Scope>())
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(raw) = self.scope.as_deref() {
            scopes.extend(parse_scopes(raw)?);
        }

        Ok(scopes)
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    pub required_scopes: Vec<Scope>,
    pub route: Option<&'static str>,
}

impl From<AuthorizationResult> for AuthorizeResponse {
    fn from(result: AuthorizationResult) -> Self {
        Self {
            allowed: result.allowed,
            required_scopes: result.required_scopes,
            route: result.route,
        }
    }
}
