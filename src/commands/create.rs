use anyhow::{Context as _, Result};
use std::{fs, path::Path};

use super::{login::ensure_authenticated, Context};
use crate::{
    archive::{archive_file_name, read_manifest, Manifest},
    constants::{README_FILE, README_PLACEHOLDER},
    models::NewMod,
};

pub async fn run(ctx: &Context, directory: &Path) -> Result<()> {
    let manifest = read_manifest(directory)?;
    let readme_path = directory.join(README_FILE);
    let readme = if readme_path.exists() {
        fs::read_to_string(&readme_path)
            .with_context(|| format!("reading {}", readme_path.display()))?
    } else {
        println!("no {README_FILE} found, edit on site");
        README_PLACEHOLDER.to_string()
    };

    let client = ensure_authenticated(ctx).await?;
    client
        .create_mod(&listing(&manifest, readme))
        .await
        .with_context(|| format!("creating mod '{}'", manifest.name))?;

    println!(
        "Created mod on server ({}/mods/{})",
        client.base_url(),
        manifest.name
    );
    println!(
        "Upload a version using `modpkg upload {}`",
        archive_file_name(directory, &manifest.version)?
    );
    Ok(())
}

fn listing(manifest: &Manifest, readme: String) -> NewMod {
    NewMod {
        name: manifest.name.clone(),
        title: manifest.title.clone(),
        description: manifest.description.clone(),
        owner: manifest.owner.clone(),
        game: manifest.game.clone(),
        readme,
    }
}
