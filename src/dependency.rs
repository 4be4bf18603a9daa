use crate::error::{ModpkgError, ModpkgResult};
use regex::Regex;
use std::{fmt, sync::LazyLock};

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9\-]*):([0-9+.]*)$").expect("dependency token pattern")
});

/// A `name:version` reference to another mod's exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyToken {
    pub mod_slug: String,
    pub version_number: String,
}

impl DependencyToken {
    pub fn new(mod_slug: impl Into<String>, version_number: impl Into<String>) -> Self {
        DependencyToken {
            mod_slug: mod_slug.into(),
            version_number: version_number.into(),
        }
    }

    /// Parse a single token such as `fabric-api:0.92.0`.
    pub fn parse(token: &str) -> ModpkgResult<Self> {
        let caps = TOKEN_PATTERN
            .captures(token)
            .ok_or_else(|| ModpkgError::MalformedDependencyToken(token.to_string()))?;
        Ok(DependencyToken::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for DependencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mod_slug, self.version_number)
    }
}

/// Split a version's `dependencies` field into tokens.
///
/// An empty (or all-whitespace) field means no dependencies. Any piece that is not a
/// valid token fails the whole parse, including empty pieces from stray commas.
pub fn parse_dependencies(raw: &str) -> ModpkgResult<Vec<DependencyToken>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|piece| DependencyToken::parse(piece.trim()))
        .collect()
}
