use crate::error::{ModpkgError, ModpkgResult};
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^modpkg://([a-zA-Z0-9\-]*)/([A-Za-z0-9_-]*)").expect("protocol link pattern")
});

/// A parsed `modpkg://<mod-slug>/<version-slug>` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLink {
    pub mod_slug: String,
    pub version_slug: String,
}

impl ProtocolLink {
    /// Parse a protocol link handed over by the OS.
    ///
    /// The pattern only anchors the start, so trailing path segments or a query
    /// (browsers like to append `/`) are ignored. Both slugs must be non-empty.
    pub fn parse(link: &str) -> ModpkgResult<Self> {
        if !is_url(link) {
            return Err(ModpkgError::MalformedLink(link.to_string()));
        }
        let caps = LINK_PATTERN
            .captures(link)
            .ok_or_else(|| ModpkgError::MalformedLink(link.to_string()))?;
        let (mod_slug, version_slug) = (&caps[1], &caps[2]);
        if mod_slug.is_empty() || version_slug.is_empty() {
            return Err(ModpkgError::MalformedLink(link.to_string()));
        }
        Ok(ProtocolLink {
            mod_slug: mod_slug.to_string(),
            version_slug: version_slug.to_string(),
        })
    }
}

/// Whether `arg` is a well-formed absolute URL.
pub fn is_url(arg: &str) -> bool {
    Url::parse(arg).is_ok()
}
