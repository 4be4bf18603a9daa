use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::archive::{package_directory, PackagedArchive};

pub async fn run(directory: PathBuf, out_dir: Option<PathBuf>) -> Result<()> {
    let packaged = package(directory, out_dir).await?;
    let file_name = archive_name(&packaged.path);
    println!("Upload using `modpkg upload {file_name}`");
    Ok(())
}

/// Package `directory` off the async executor and report the result.
pub(crate) async fn package(directory: PathBuf, out_dir: Option<PathBuf>) -> Result<PackagedArchive> {
    let out_dir = match out_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    println!("Packaging {}...", directory.display());

    let source = directory.clone();
    let packaged = tokio::task::spawn_blocking(move || package_directory(&source, &out_dir))
        .await
        .context("packaging task panicked")?
        .with_context(|| format!("packaging {}", directory.display()))?;

    println!(
        "Packaged v{} of {} into {} in {}ms ({} files)",
        packaged.manifest.version,
        packaged.manifest.name,
        archive_name(&packaged.path),
        packaged.elapsed.as_millis(),
        packaged.entries
    );
    Ok(packaged)
}

fn archive_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
