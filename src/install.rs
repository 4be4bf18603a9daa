//! Install executor: puts one resolved version's artifact into the mods directory.

use crate::error::{ModpkgError, ModpkgResult};
use crate::models::Version;
use crate::registry::RegistryClient;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default mods directory for an OS name as reported by `std::env::consts::OS`.
pub fn mods_dir_for(os: &str, home: &Path) -> Option<PathBuf> {
    match os {
        "windows" => Some(home.join("AppData/Roaming/.minecraft/mods/")),
        "macos" => Some(home.join("Library/Application Support/minecraft/mods")),
        "linux" => Some(home.join(".minecraft/mods")),
        _ => None,
    }
}

/// Mods directory for this machine, or the configured override.
pub fn detect_mods_dir(configured: Option<&Path>) -> ModpkgResult<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let home = dirs::home_dir()
        .ok_or_else(|| ModpkgError::Config("cannot determine home directory".into()))?;
    mods_dir_for(std::env::consts::OS, &home).ok_or_else(|| {
        ModpkgError::Config(format!(
            "no default mods directory for platform '{}'; set modsDir in the settings file",
            std::env::consts::OS
        ))
    })
}

/// `<mod>-<version>-<loader>.jar`, the on-disk identity of an installed artifact.
pub fn artifact_file_name(mod_slug: &str, version: &Version) -> ModpkgResult<String> {
    let name = format!(
        "{}-{}-{}.jar",
        mod_slug, version.version_number, version.mod_loader
    );
    let unsafe_part = [mod_slug, version.version_number.as_str(), version.mod_loader.as_str()]
        .iter()
        .any(|part| part.contains(['/', '\\']) || part.contains(".."));
    if unsafe_part {
        return Err(ModpkgError::InvalidArtifactName(name));
    }
    Ok(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { path: PathBuf, bytes: u64 },
    AlreadyInstalled { path: PathBuf },
}

impl InstallOutcome {
    pub fn path(&self) -> &Path {
        match self {
            InstallOutcome::Installed { path, .. } | InstallOutcome::AlreadyInstalled { path } => {
                path
            }
        }
    }
}

pub struct Installer<'a> {
    client: &'a RegistryClient,
    mods_dir: PathBuf,
    verify_size: bool,
}

impl<'a> Installer<'a> {
    pub fn new(client: &'a RegistryClient, mods_dir: impl Into<PathBuf>) -> Self {
        Installer {
            client,
            mods_dir: mods_dir.into(),
            verify_size: false,
        }
    }

    pub fn with_size_check(mut self, verify_size: bool) -> Self {
        self.verify_size = verify_size;
        self
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    pub fn destination(&self, mod_slug: &str, version: &Version) -> ModpkgResult<PathBuf> {
        Ok(self.mods_dir.join(artifact_file_name(mod_slug, version)?))
    }

    /// Download `version` unless its artifact is already on disk.
    ///
    /// An existing file is trusted as-is, and a failed transfer leaves whatever was
    /// written in place.
    pub async fn install(&self, mod_slug: &str, version: &Version) -> ModpkgResult<InstallOutcome> {
        let dest = self.destination(mod_slug, version)?;
        let exists = tokio::fs::try_exists(&dest)
            .await
            .map_err(|e| ModpkgError::fs(&dest, e))?;
        if exists {
            info!(
                "already installed mod {mod_slug}:{}",
                version.version_number
            );
            return Ok(InstallOutcome::AlreadyInstalled { path: dest });
        }

        info!("installing {mod_slug}:{}", version.version_number);
        tokio::fs::create_dir_all(&self.mods_dir)
            .await
            .map_err(|e| ModpkgError::fs(&self.mods_dir, e))?;

        let mut stream = Box::pin(self.client.get_stream(&version.download_url).await?);
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| ModpkgError::fs(&dest, e))?;
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ModpkgError::fs(&dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| ModpkgError::fs(&dest, e))?;
        drop(file);

        if self.verify_size && written != version.filesize {
            return Err(ModpkgError::SizeMismatch {
                path: dest,
                expected: version.filesize,
                actual: written,
            });
        }

        debug!("wrote {written} bytes to {}", dest.display());
        Ok(InstallOutcome::Installed {
            path: dest,
            bytes: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Session;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn version(number: &str, loader: &str, url: String, filesize: u64) -> Version {
        Version {
            id: format!("v-{number}"),
            version_number: number.to_string(),
            filesize,
            download_url: url,
            mod_id: "m1".to_string(),
            game_version: "1.20.1".to_string(),
            mod_loader: loader.to_string(),
            dependencies: String::new(),
        }
    }

    #[test]
    fn test_platform_mods_dirs() {
        let home = Path::new("/home/steve");
        assert_eq!(
            mods_dir_for("linux", home).unwrap(),
            PathBuf::from("/home/steve/.minecraft/mods")
        );
        assert_eq!(
            mods_dir_for("macos", home).unwrap(),
            PathBuf::from("/home/steve/Library/Application Support/minecraft/mods")
        );
        assert!(mods_dir_for("windows", home)
            .unwrap()
            .starts_with("/home/steve/AppData/Roaming/.minecraft/mods"));
        assert_eq!(mods_dir_for("haiku", home), None);
    }

    #[test]
    fn test_configured_mods_dir_wins() {
        let dir = detect_mods_dir(Some(Path::new("/srv/mods"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/mods"));
    }

    #[test]
    fn test_artifact_file_name() {
        let v = version("1.0", "fabric", String::new(), 0);
        assert_eq!(artifact_file_name("dep1", &v).unwrap(), "dep1-1.0-fabric.jar");

        let sneaky = version("../../evil", "fabric", String::new(), 0);
        assert!(matches!(
            artifact_file_name("dep1", &sneaky),
            Err(ModpkgError::InvalidArtifactName(_))
        ));
    }

    #[tokio::test]
    async fn test_session_cookie_stays_on_registry_origin() {
        let registry = MockServer::start_async().await;
        let cdn = MockServer::start_async().await;
        let with_cookie = cdn
            .mock_async(|when, then| {
                when.method(GET).path("/a.jar").header_exists("cookie");
                then.status(200).body("jar");
            })
            .await;
        let plain = cdn
            .mock_async(|when, then| {
                when.method(GET).path("/a.jar").header_missing("cookie");
                then.status(200).body("jar");
            })
            .await;

        let mut session = Session::anonymous(registry.base_url());
        session.token = Some("secret".to_string());
        let client = RegistryClient::new(&session).unwrap();
        let mods = TempDir::new().unwrap();
        let installer = Installer::new(&client, mods.path());
        let v = version("1.0", "fabric", cdn.url("/a.jar"), 3);

        installer.install("a", &v).await.unwrap();
        assert_eq!(with_cookie.hits_async().await, 0);
        assert_eq!(plain.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_existing_file_skips_network() {
        let server = MockServer::start_async().await;
        let download = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/examplemod.jar");
                then.status(200).body("jar bytes");
            })
            .await;

        let mods = TempDir::new().unwrap();
        std::fs::write(mods.path().join("examplemod-v1-fabric.jar"), "partial").unwrap();

        let client = RegistryClient::new(&Session::anonymous(server.base_url())).unwrap();
        let installer = Installer::new(&client, mods.path());
        let v = version("v1", "fabric", server.url("/files/examplemod.jar"), 9);

        let outcome = installer.install("examplemod", &v).await.unwrap();
        assert!(matches!(outcome, InstallOutcome::AlreadyInstalled { .. }));
        assert_eq!(download.hits_async().await, 0);
        assert_eq!(
            std::fs::read_to_string(mods.path().join("examplemod-v1-fabric.jar")).unwrap(),
            "partial"
        );
    }

    #[tokio::test]
    async fn test_download_streams_to_destination() {
        let server = MockServer::start_async().await;
        let body = vec![7u8; 64 * 1024];
        let download = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/dep1.jar");
                then.status(200).body(&body);
            })
            .await;

        let mods = TempDir::new().unwrap();
        let mods_dir = mods.path().join("nested/mods");
        let client = RegistryClient::new(&Session::anonymous(server.base_url())).unwrap();
        let installer = Installer::new(&client, &mods_dir).with_size_check(true);

        // relative download URL, joined onto the registry base
        let v = version("1.0", "fabric", "/files/dep1.jar".to_string(), body.len() as u64);
        let outcome = installer.install("dep1", &v).await.unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                path: mods_dir.join("dep1-1.0-fabric.jar"),
                bytes: body.len() as u64,
            }
        );
        assert_eq!(std::fs::read(outcome.path()).unwrap(), body);
        download.assert_async().await;
    }

    #[tokio::test]
    async fn test_size_check_flags_short_download() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/dep1.jar");
                then.status(200).body("short");
            })
            .await;

        let mods = TempDir::new().unwrap();
        let client = RegistryClient::new(&Session::anonymous(server.base_url())).unwrap();
        let v = version("1.0", "fabric", server.url("/files/dep1.jar"), 1000);

        let checked = Installer::new(&client, mods.path()).with_size_check(true);
        assert!(matches!(
            checked.install("dep1", &v).await,
            Err(ModpkgError::SizeMismatch {
                expected: 1000,
                actual: 5,
                ..
            })
        ));

        // without the check the same artifact is accepted
        std::fs::remove_file(mods.path().join("dep1-1.0-fabric.jar")).unwrap();
        let unchecked = Installer::new(&client, mods.path());
        assert!(unchecked.install("dep1", &v).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_registry_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/gone.jar");
                then.status(404);
            })
            .await;

        let mods = TempDir::new().unwrap();
        let client = RegistryClient::new(&Session::anonymous(server.base_url())).unwrap();
        let installer = Installer::new(&client, mods.path());
        let v = version("1.0", "fabric", server.url("/files/gone.jar"), 1);

        assert!(matches!(
            installer.install("gone", &v).await,
            Err(ModpkgError::RegistryResponse { status: 404, .. })
        ));
        assert!(!mods.path().join("gone-1.0-fabric.jar").exists());
    }
}
