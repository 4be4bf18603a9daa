use anyhow::{Context as _, Result};
use std::path::Path;

use super::{login::ensure_authenticated, pkg, Context};

pub async fn run(ctx: &Context, target: &Path) -> Result<()> {
    let archive = if target.is_dir() {
        pkg::package(target.to_path_buf(), None).await?.path
    } else {
        target.to_path_buf()
    };

    let client = ensure_authenticated(ctx).await?;
    let reply = client
        .upload_version(&archive)
        .await
        .with_context(|| format!("uploading {}", archive.display()))?;

    match reply.message {
        Some(message) => println!("Uploaded {} successfully: {message}", archive.display()),
        None => println!("Uploaded {} successfully", archive.display()),
    }
    Ok(())
}
