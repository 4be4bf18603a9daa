//! Archive builder: turns a mod directory into `<dir>-<version>.zip`.

use crate::constants::MANIFEST_FILE;
use crate::error::{ModpkgError, ModpkgResult};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// `manifest.json` at the root of a mod directory.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PackagedArchive {
    pub path: PathBuf,
    pub manifest: Manifest,
    pub entries: usize,
    pub elapsed: Duration,
}

pub fn read_manifest(dir: &Path) -> ModpkgResult<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&path).map_err(|e| ModpkgError::fs(&path, e))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .map_err(|e| ModpkgError::Config(format!("invalid {}: {e}", path.display())))?;
    if semver::Version::parse(&manifest.version).is_err() {
        warn!(
            "manifest version '{}' is not semver (https://semver.org/)",
            manifest.version
        );
    }
    Ok(manifest)
}

/// `<basename>-<version>.zip` for a mod directory.
pub fn archive_file_name(dir: &Path, version: &str) -> ModpkgResult<String> {
    let canonical = fs::canonicalize(dir).map_err(|e| ModpkgError::fs(dir, e))?;
    let base = canonical
        .file_name()
        .ok_or_else(|| ModpkgError::Config(format!("{} has no directory name", dir.display())))?
        .to_string_lossy()
        .to_string();
    Ok(format!("{base}-{version}.zip"))
}

/// Zip the contents of `dir` (not the directory itself) into `out_dir`.
///
/// Runs synchronously; returns once the archive is finalized on disk.
pub fn package_directory(dir: &Path, out_dir: &Path) -> ModpkgResult<PackagedArchive> {
    let started = Instant::now();
    let manifest = read_manifest(dir)?;
    let output = out_dir.join(archive_file_name(dir, &manifest.version)?);

    fs::create_dir_all(out_dir).map_err(|e| ModpkgError::fs(out_dir, e))?;
    let mut entries = Vec::new();
    collect_entries(dir, dir, &mut entries).map_err(|e| ModpkgError::fs(dir, e))?;
    entries.sort();

    // The archive may be written inside the directory being packaged.
    let output_canonical = out_dir
        .canonicalize()
        .map_err(|e| ModpkgError::fs(out_dir, e))?
        .join(output.file_name().unwrap_or_default());

    let file = File::create(&output).map_err(|e| ModpkgError::fs(&output, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut written = 0;
    for (path, name) in &entries {
        if path.is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
            continue;
        }
        if path.canonicalize().ok().as_deref() == Some(output_canonical.as_path()) {
            continue;
        }
        zip.start_file(name.as_str(), options)?;
        let mut src = File::open(path).map_err(|e| ModpkgError::fs(path, e))?;
        io::copy(&mut src, &mut zip).map_err(|e| ModpkgError::fs(path, e))?;
        written += 1;
        debug!("added {name}");
    }
    zip.finish()?;

    Ok(PackagedArchive {
        path: output,
        manifest,
        entries: written,
        elapsed: started.elapsed(),
    })
}

fn collect_entries(dir: &Path, base: &Path, out: &mut Vec<(PathBuf, String)>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let rel = path.strip_prefix(base).map_err(io::Error::other)?;
        let name = rel.to_string_lossy().replace('\\', "/");
        if path.is_dir() {
            out.push((path.clone(), name));
            collect_entries(&path, base, out)?;
        } else {
            out.push((path, name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn mod_dir(root: &Path) -> PathBuf {
        let dir = root.join("coolmod");
        fs::create_dir_all(dir.join("assets/textures")).unwrap();
        fs::write(
            dir.join("manifest.json"),
            r#"{"name":"coolmod","version":"1.2.0","title":"Cool Mod","game":"minecraft"}"#,
        )
        .unwrap();
        fs::write(dir.join("assets/textures/block.png"), b"\x89PNG").unwrap();
        fs::write(dir.join("README.md"), "# Cool Mod").unwrap();
        dir
    }

    #[test]
    fn test_read_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = read_manifest(&mod_dir(tmp.path())).unwrap();
        assert_eq!(manifest.name, "coolmod");
        assert_eq!(manifest.version, "1.2.0");
        assert_eq!(manifest.title.as_deref(), Some("Cool Mod"));
        assert_eq!(manifest.owner, None);
    }

    #[test]
    fn test_missing_manifest_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_manifest(tmp.path()),
            Err(ModpkgError::Filesystem { .. })
        ));
    }

    #[test]
    fn test_package_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = mod_dir(tmp.path());
        let out = tmp.path().join("dist");

        let packaged = package_directory(&dir, &out).unwrap();
        assert_eq!(packaged.path, out.join("coolmod-1.2.0.zip"));
        assert_eq!(packaged.entries, 3);

        let mut archive = zip::ZipArchive::new(File::open(&packaged.path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "README.md",
                "assets/",
                "assets/textures/",
                "assets/textures/block.png",
                "manifest.json"
            ]
        );

        let mut readme = String::new();
        archive
            .by_name("README.md")
            .unwrap()
            .read_to_string(&mut readme)
            .unwrap();
        assert_eq!(readme, "# Cool Mod");
    }

    #[test]
    fn test_package_into_own_directory_skips_output() {
        let tmp = TempDir::new().unwrap();
        let dir = mod_dir(tmp.path());

        let packaged = package_directory(&dir, &dir).unwrap();
        let archive = zip::ZipArchive::new(File::open(&packaged.path).unwrap()).unwrap();
        assert!(archive.file_names().all(|n| n != "coolmod-1.2.0.zip"));
    }
}
