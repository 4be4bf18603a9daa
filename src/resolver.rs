use crate::error::{ModpkgError, ModpkgResult};
use crate::models::Version;
use crate::registry::RegistryClient;
use tracing::{debug, warn};

/// Pick the published version matching `version_number` built for `mod_loader`.
///
/// When several records match, the first one in registry order wins.
pub fn select_version<'a>(
    versions: &'a [Version],
    version_number: &str,
    mod_loader: &str,
) -> Option<&'a Version> {
    let mut matches = versions
        .iter()
        .filter(|v| v.version_number == version_number && v.mod_loader == mod_loader);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            "{} versions numbered {version_number} target {mod_loader}; using {}",
            extra + 1,
            first.id
        );
    }
    Some(first)
}

/// Resolve a dependency token to a concrete version on the registry.
///
/// The loader is the root version's loader, not whatever the dependency would pick for
/// itself, so every artifact of one install targets the same runtime.
pub async fn resolve_dependency(
    client: &RegistryClient,
    mod_slug: &str,
    version_number: &str,
    required_loader: &str,
) -> ModpkgResult<Version> {
    let record = client.mod_by_slug(mod_slug).await?;
    let versions = client.versions_for_mod(&record.id).await?;
    debug!(
        "{mod_slug} ({}) has {} published versions",
        record.id,
        versions.len()
    );

    select_version(&versions, version_number, required_loader)
        .cloned()
        .ok_or_else(|| ModpkgError::VersionNotFound {
            mod_slug: mod_slug.to_string(),
            version_number: version_number.to_string(),
            mod_loader: required_loader.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Session;
    use httpmock::prelude::*;

    fn version(id: &str, number: &str, loader: &str) -> Version {
        Version {
            id: id.to_string(),
            version_number: number.to_string(),
            filesize: 10,
            download_url: format!("/files/{id}.jar"),
            mod_id: "m1".to_string(),
            game_version: "1.20.1".to_string(),
            mod_loader: loader.to_string(),
            dependencies: String::new(),
        }
    }

    #[test]
    fn test_select_respects_loader() {
        let versions = vec![
            version("forge-build", "1.0", "forge"),
            version("fabric-build", "1.0", "fabric"),
        ];
        assert_eq!(
            select_version(&versions, "1.0", "fabric").unwrap().id,
            "fabric-build"
        );
        assert_eq!(
            select_version(&versions, "1.0", "forge").unwrap().id,
            "forge-build"
        );
        assert!(select_version(&versions, "1.0", "quilt").is_none());
        assert!(select_version(&versions, "2.0", "fabric").is_none());
    }

    #[test]
    fn test_select_first_match_wins() {
        let versions = vec![
            version("first", "1.0", "fabric"),
            version("second", "1.0", "fabric"),
        ];
        assert_eq!(select_version(&versions, "1.0", "fabric").unwrap().id, "first");
    }

    #[tokio::test]
    async fn test_resolve_dependency_over_http() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/mods/dep1");
                then.status(200)
                    .json_body(serde_json::json!({"id": "mod-dep1", "slug": "dep1"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/versions")
                    .query_param("mod_id", "mod-dep1");
                then.status(200).json_body(serde_json::json!([
                    version("dep1-forge", "1.0", "forge"),
                    version("dep1-fabric", "1.0", "fabric"),
                ]));
            })
            .await;

        let client = RegistryClient::new(&Session::anonymous(server.base_url())).unwrap();
        let resolved = resolve_dependency(&client, "dep1", "1.0", "fabric")
            .await
            .unwrap();
        assert_eq!(resolved.id, "dep1-fabric");

        match resolve_dependency(&client, "dep1", "3.0", "fabric").await {
            Err(ModpkgError::VersionNotFound {
                mod_slug,
                version_number,
                mod_loader,
            }) => {
                assert_eq!(mod_slug, "dep1");
                assert_eq!(version_number, "3.0");
                assert_eq!(mod_loader, "fabric");
            }
            other => panic!("expected version not found, got {other:?}"),
        }
    }
}
