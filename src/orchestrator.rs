//! Install orchestration for `modpkg://` links.
//!
//! The root version and each of its declared dependencies (one level deep) become
//! independent tasks that are polled together. One task failing never cancels the
//! others; every outcome is collected into an [`InstallSummary`].

use crate::dependency::{parse_dependencies, DependencyToken};
use crate::error::{ModpkgError, ModpkgResult};
use crate::install::{InstallOutcome, Installer};
use crate::link::ProtocolLink;
use crate::models::Version;
use crate::registry::RegistryClient;
use crate::resolver::resolve_dependency;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, error};

/// An artifact that is on disk after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledMod {
    pub mod_slug: String,
    pub version_number: String,
    pub mod_loader: String,
    pub path: PathBuf,
    /// The file was already present and nothing was downloaded
    pub already_present: bool,
}

#[derive(Debug)]
pub struct FailedMod {
    pub mod_slug: String,
    pub version_number: String,
    pub error: ModpkgError,
}

#[derive(Debug, Default)]
pub struct InstallSummary {
    pub installed: Vec<InstalledMod>,
    pub failed: Vec<FailedMod>,
}

impl InstallSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.installed.len() + self.failed.len()
    }

    fn record(&mut self, mod_slug: &str, version_number: &str, result: ModpkgResult<Installed>) {
        match result {
            Ok((version, outcome)) => self.installed.push(InstalledMod {
                mod_slug: mod_slug.to_string(),
                version_number: version.version_number,
                mod_loader: version.mod_loader,
                already_present: matches!(outcome, InstallOutcome::AlreadyInstalled { .. }),
                path: outcome.path().to_path_buf(),
            }),
            Err(error) => {
                error!("failed to install {mod_slug}:{version_number}: {error}");
                self.failed.push(FailedMod {
                    mod_slug: mod_slug.to_string(),
                    version_number: version_number.to_string(),
                    error,
                });
            }
        }
    }
}

type Installed = (Version, InstallOutcome);

/// Install everything a protocol link points at.
///
/// A malformed link fails before any request is made.
pub async fn install_from_link(
    client: &RegistryClient,
    installer: &Installer<'_>,
    link: &str,
) -> ModpkgResult<InstallSummary> {
    let link = ProtocolLink::parse(link)?;
    install_version(client, installer, &link.mod_slug, &link.version_slug).await
}

/// Install one version of `mod_slug` plus its direct dependencies.
///
/// Fetching the root version and parsing its dependency list are fatal; everything
/// after that is best-effort per artifact.
pub async fn install_version(
    client: &RegistryClient,
    installer: &Installer<'_>,
    mod_slug: &str,
    version_slug: &str,
) -> ModpkgResult<InstallSummary> {
    let root = client.version(version_slug).await?;
    let tokens = distinct_dependencies(mod_slug, &root, parse_dependencies(&root.dependencies)?);
    debug!(
        "{mod_slug}:{} ({}) declares {} dependencies",
        root.version_number,
        root.mod_loader,
        tokens.len()
    );

    let loader = root.mod_loader.as_str();
    let root_task = async {
        let outcome = installer.install(mod_slug, &root).await?;
        Ok::<_, ModpkgError>((root.clone(), outcome))
    };
    let dependency_tasks = tokens.iter().map(|token| async move {
        let version =
            resolve_dependency(client, &token.mod_slug, &token.version_number, loader).await?;
        let outcome = installer.install(&token.mod_slug, &version).await?;
        Ok::<_, ModpkgError>((version, outcome))
    });

    let (root_result, dependency_results) = futures::join!(root_task, join_all(dependency_tasks));

    let mut summary = InstallSummary::default();
    summary.record(mod_slug, &root.version_number, root_result);
    for (token, result) in tokens.iter().zip(dependency_results) {
        summary.record(&token.mod_slug, &token.version_number, result);
    }
    Ok(summary)
}

/// Drop repeated tokens and any token naming the root itself, keeping first-seen order.
fn distinct_dependencies(
    mod_slug: &str,
    root: &Version,
    tokens: Vec<DependencyToken>,
) -> Vec<DependencyToken> {
    let mut seen = HashSet::new();
    seen.insert(DependencyToken::new(mod_slug, &root.version_number));
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(dependencies: &str) -> Version {
        Version {
            id: "v1".into(),
            version_number: "1.0".into(),
            filesize: 1,
            download_url: "/files/root.jar".into(),
            mod_id: "m-root".into(),
            game_version: "1.20.1".into(),
            mod_loader: "fabric".into(),
            dependencies: dependencies.into(),
        }
    }

    #[test]
    fn test_distinct_dependencies() {
        let root = root("");
        let tokens = vec![
            DependencyToken::new("dep1", "1.0"),
            DependencyToken::new("dep2", "2.0"),
            DependencyToken::new("dep1", "1.0"),
            DependencyToken::new("examplemod", "1.0"),
            DependencyToken::new("dep1", "1.1"),
        ];
        assert_eq!(
            distinct_dependencies("examplemod", &root, tokens),
            vec![
                DependencyToken::new("dep1", "1.0"),
                DependencyToken::new("dep2", "2.0"),
                DependencyToken::new("dep1", "1.1"),
            ]
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = InstallSummary::default();
        summary.record(
            "dep1",
            "1.0",
            Ok((
                root(""),
                InstallOutcome::AlreadyInstalled {
                    path: PathBuf::from("/mods/dep1-1.0-fabric.jar"),
                },
            )),
        );
        summary.record(
            "dep2",
            "2.0",
            Err(ModpkgError::VersionNotFound {
                mod_slug: "dep2".into(),
                version_number: "2.0".into(),
                mod_loader: "fabric".into(),
            }),
        );
        assert_eq!(summary.total(), 2);
        assert!(!summary.is_complete());
        assert!(summary.installed[0].already_present);
        assert_eq!(summary.failed[0].mod_slug, "dep2");
    }
}
