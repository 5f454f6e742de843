use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Capability granted to a token.
///
/// Wire names are `resource:action` (e.g. `chat:write`), plus `all` for the
/// wildcard. `All` satisfies every route rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Scope {
    All,
    ChatRead,
    ChatWrite,
    CompletionsRead,
    CompletionsWrite,
    EmbeddingsRead,
    EmbeddingsWrite,
    ImagesRead,
    ImagesWrite,
    AudioRead,
    AudioWrite,
    FilesRead,
    FilesWrite,
    ModelsRead,
    UsageRead,
}

impl Scope {
    pub const VARIANTS: [Scope; 15] = [
        Scope::All,
        Scope::ChatRead,
        Scope::ChatWrite,
        Scope::CompletionsRead,
        Scope::CompletionsWrite,
        Scope::EmbeddingsRead,
        Scope::EmbeddingsWrite,
        Scope::ImagesRead,
        Scope::ImagesWrite,
        Scope::AudioRead,
        Scope::AudioWrite,
        Scope::FilesRead,
        Scope::FilesWrite,
        Scope::ModelsRead,
        Scope::UsageRead,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::ChatRead => "chat:read",
            Scope::ChatWrite => "chat:write",
            Scope::CompletionsRead => "completions:read",
            Scope::CompletionsWrite => "completions:write",
            Scope::EmbeddingsRead => "embeddings:read",
            Scope::EmbeddingsWrite => "embeddings:write",
            Scope::ImagesRead => "images:read",
            Scope::ImagesWrite => "images:write",
            Scope::AudioRead => "audio:read",
            Scope::AudioWrite => "audio:write",
            Scope::FilesRead => "files:read",
            Scope::FilesWrite => "files:write",
            Scope::ModelsRead => "models:read",
            Scope::UsageRead => "usage:read",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope: {0}")]
pub struct ScopeParseError(pub String);

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw == "*" {
            return Ok(Scope::All);
        }

        Scope::VARIANTS
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| ScopeParseError(raw.to_string()))
    }
}

impl TryFrom<String> for Scope {
    type Error = ScopeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Scope> for &'static str {
    fn from(scope: Scope) -> Self {
        scope.as_str()
    }
}

/// Parse an OAuth-style scope string (`"chat:read chat:write"`, commas also accepted).
pub fn parse_scopes(raw: &str) -> Result<Vec<Scope>, ScopeParseError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Scope::from_str)
        .collect()
}

/// `chat:read, chat:write` (used in user-facing messages).
pub fn format_scopes(scopes: &[Scope]) -> String {
    scopes
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
