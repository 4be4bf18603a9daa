use crate::constants::{ENV_TOKEN_PATH, TOKEN_FILE};
use crate::error::{ModpkgError, ModpkgResult};
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Durable storage for the registry session token.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// `~/.modpkg_token`, or the file named by `MODPKG_TOKEN_PATH`.
    pub fn default_location() -> ModpkgResult<Self> {
        if let Ok(path) = env::var(ENV_TOKEN_PATH) {
            return Ok(CredentialStore::at(path));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| ModpkgError::Config("cannot determine home directory".into()))?;
        Ok(CredentialStore::at(home.join(TOKEN_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, if any. Blank files count as logged out.
    pub fn load(&self) -> ModpkgResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ModpkgError::fs(&self.path, e)),
        }
    }

    pub fn save(&self, token: &str) -> ModpkgResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ModpkgError::fs(parent, e))?;
            }
        }
        fs::write(&self.path, token).map_err(|e| ModpkgError::fs(&self.path, e))?;
        restrict_permissions(&self.path)?;
        debug!("stored session token in {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Returns whether there was one.
    pub fn clear(&self) -> ModpkgResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ModpkgError::fs(&self.path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> ModpkgResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| ModpkgError::fs(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> ModpkgResult<()> {
    Ok(())
}
