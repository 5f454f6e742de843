//! Compiled-in route → scope table.
//!
//! Adding a proxied route means adding an entry here; anything not listed is
//! denied by the authorizer.

use super::types::Scope;

/// One entry of the route table. `scopes` is an OR-set: any one of them is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteScopeRule {
    pub method: &'static str,
    // Segments like `{id}` match exactly one non-empty path segment.
    pub pattern: &'static str,
    pub scopes: &'static [Scope],
}

impl RouteScopeRule {
    pub const fn new(method: &'static str, pattern: &'static str, scopes: &'static [Scope]) -> Self {
        Self {
            method,
            pattern,
            scopes,
        }
    }

    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method.trim()) && pattern_matches(self.pattern, path)
    }
}

const CHAT_READ: &[Scope] = &[Scope::ChatRead, Scope::ChatWrite];
const CHAT_WRITE: &[Scope] = &[Scope::ChatWrite];
const COMPLETIONS_WRITE: &[Scope] = &[Scope::CompletionsWrite];
const EMBEDDINGS_WRITE: &[Scope] = &[Scope::EmbeddingsWrite];
const IMAGES_WRITE: &[Scope] = &[Scope::ImagesWrite];
const AUDIO_WRITE: &[Scope] = &[Scope::AudioWrite];
const FILES_READ: &[Scope] = &[Scope::FilesRead, Scope::FilesWrite];
const FILES_WRITE: &[Scope] = &[Scope::FilesWrite];
const MODELS_READ: &[Scope] = &[Scope::ModelsRead];
const USAGE_READ: &[Scope] = &[Scope::UsageRead];

pub static ROUTE_SCOPE_RULES: &[RouteScopeRule] = &[
    // OpenAI-compatible surface
    RouteScopeRule::new("POST", "/v1/chat/completions", CHAT_WRITE),
    RouteScopeRule::new("GET", "/v1/chat/completions", CHAT_READ),
    RouteScopeRule::new("GET", "/v1/chat/completions/{completion_id}", CHAT_READ),
    RouteScopeRule::new("DELETE", "/v1/chat/completions/{completion_id}", CHAT_WRITE),
    RouteScopeRule::new("POST", "/v1/completions", COMPLETIONS_WRITE),
    RouteScopeRule::new("POST", "/v1/embeddings", EMBEDDINGS_WRITE),
    RouteScopeRule::new("POST", "/v1/images/generations", IMAGES_WRITE),
    RouteScopeRule::new("POST", "/v1/images/edits", IMAGES_WRITE),
    RouteScopeRule::new("POST", "/v1/audio/speech", AUDIO_WRITE),
    RouteScopeRule::new("POST", "/v1/audio/transcriptions", AUDIO_WRITE),
    RouteScopeRule::new("GET", "/v1/files", FILES_READ),
    RouteScopeRule::new("POST", "/v1/files", FILES_WRITE),
    RouteScopeRule::new("GET", "/v1/files/{file_id}", FILES_READ),
    RouteScopeRule::new("DELETE", "/v1/files/{file_id}", FILES_WRITE),
    RouteScopeRule::new("GET", "/v1/files/{file_id}/content", FILES_READ),
    RouteScopeRule::new("GET", "/v1/models", MODELS_READ),
    RouteScopeRule::new("GET", "/v1/models/{model}", MODELS_READ),
    RouteScopeRule::new("GET", "/v1/usage", USAGE_READ),
    // Dashboard proxy endpoints
    RouteScopeRule::new("POST", "/api/proxy/chat", CHAT_WRITE),
    RouteScopeRule::new("POST", "/api/proxy/completions", COMPLETIONS_WRITE),
    RouteScopeRule::new("POST", "/api/proxy/embeddings", EMBEDDINGS_WRITE),
    RouteScopeRule::new("GET", "/api/proxy/models", MODELS_READ),
];

/// Strip query/fragment and a single trailing slash.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];

    match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let path = normalize_path(path);

    let mut expected = pattern.split('/');
    let mut actual = path.split('/');

    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(p), Some(a)) => {
                let is_param = p.starts_with('{') && p.ends_with('}');
                if is_param {
                    if a.is_empty() {
                        return false;
                    }
                } else if p != a {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_drops_query_and_trailing_slash() {
        assert_eq!(normalize_path("/v1/models?limit=10"), "/v1/models");
        assert_eq!(normalize_path("/v1/models/"), "/v1/models");
        assert_eq!(normalize_path("/v1/models#frag"), "/v1/models");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn param_segment_matches_one_segment() {
        let rule = RouteScopeRule::new("GET", "/v1/files/{file_id}", FILES_READ);
        assert!(rule.matches("GET", "/v1/files/file-abc"));
        assert!(!rule.matches("GET", "/v1/files"));
        assert!(!rule.matches("GET", "/v1/files//"));
        assert!(!rule.matches("GET", "/v1/files/file-abc/content"));
    }

    #[test]
    fn method_match_ignores_ascii_case() {
        let rule = RouteScopeRule::new("POST", "/v1/chat/completions", CHAT_WRITE);
        assert!(rule.matches("post", "/v1/chat/completions"));
        assert!(!rule.matches("GET", "/v1/chat/completions"));
    }

    #[test]
    fn literal_segments_are_case_sensitive() {
        let rule = RouteScopeRule::new("GET", "/v1/models", MODELS_READ);
        assert!(!rule.matches("GET", "/V1/Models"));
    }

    #[test]
    fn every_rule_has_at_least_one_scope_and_no_wildcard() {
        for rule in ROUTE_SCOPE_RULES {
            assert!(!rule.scopes.is_empty(), "{} {}", rule.method, rule.pattern);
            assert!(!rule.scopes.contains(&Scope::All));
        }
    }
}
