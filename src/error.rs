use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by every library module.
///
/// Command handlers wrap it in `anyhow` for context; `main` digs it back out of the
/// chain with [`exit_code`] so each failure kind gets its own process exit status.
#[derive(Debug, Error)]
pub enum ModpkgError {
    // ── Parsing ─────────────────────────────────────────
    #[error("malformed link '{0}': expected modpkg://<mod>/<version>")]
    MalformedLink(String),

    #[error("malformed dependency token '{0}': expected <mod>:<version>")]
    MalformedDependencyToken(String),

    // ── Resolution ──────────────────────────────────────
    #[error("no version {version_number} of '{mod_slug}' published for loader '{mod_loader}'")]
    VersionNotFound {
        mod_slug: String,
        version_number: String,
        mod_loader: String,
    },

    // ── Registry ────────────────────────────────────────
    #[error("registry unreachable at {url}: {source}")]
    RegistryUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry returned HTTP {status} for {url}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    RegistryResponse {
        url: String,
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response shape from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not build request: {0}")]
    Client(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    // ── Local ───────────────────────────────────────────
    #[error("filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("refusing to write artifact with unsafe file name '{0}'")]
    InvalidArtifactName(String),

    // ── Install ─────────────────────────────────────────
    #[error("downloaded {actual} bytes to {path:?}, registry advertised {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("{failed} of {total} installs failed")]
    IncompleteInstall { failed: usize, total: usize },
}

pub type ModpkgResult<T> = Result<T, ModpkgError>;

impl ModpkgError {
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModpkgError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ModpkgError::MalformedLink(_) => 2,
            ModpkgError::MalformedDependencyToken(_) => 3,
            ModpkgError::VersionNotFound { .. } => 4,
            ModpkgError::RegistryUnreachable { .. } => 5,
            ModpkgError::RegistryResponse { .. } => 6,
            ModpkgError::MalformedResponse { .. } => 7,
            ModpkgError::Filesystem { .. } => 8,
            ModpkgError::Client(_) => 9,
            ModpkgError::Config(_) => 10,
            ModpkgError::Archive(_) => 11,
            ModpkgError::Auth(_) => 12,
            ModpkgError::IncompleteInstall { .. } => 13,
            ModpkgError::SizeMismatch { .. } => 14,
            ModpkgError::InvalidArtifactName(_) => 15,
        }
    }
}

/// Exit status for an error bubbled up through `anyhow`; 1 when no [`ModpkgError`] is
/// found in the chain.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ModpkgError>())
        .map_or(1, ModpkgError::exit_code)
}
