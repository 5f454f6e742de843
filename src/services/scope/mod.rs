pub mod authorizer;
pub mod rules;
pub mod types;

pub use authorizer::{AuthorizationResult, AuthzError, ScopeAuthorizer, has_required_scope};
pub use rules::{ROUTE_SCOPE_RULES, RouteScopeRule};
pub use types::{Scope, ScopeParseError, parse_scopes};
