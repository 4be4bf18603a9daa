use anyhow::{Context as _, Result};

use super::Context;
use crate::{
    error::ModpkgError,
    install::{detect_mods_dir, Installer},
    link::ProtocolLink,
    orchestrator::{install_version, InstallSummary},
    registry::RegistryClient,
};

pub async fn run(registry: Option<&str>, link: &str) -> Result<()> {
    // reject bad links before touching settings or the network
    let parsed = ProtocolLink::parse(link)?;

    // install endpoints are public; the stored token stays out of it
    let ctx = Context::load(registry)?;
    let client = RegistryClient::new(&ctx.anonymous_session())?;
    let mods_dir = detect_mods_dir(ctx.settings.mods_dir.as_deref())?;
    let installer = Installer::new(&client, mods_dir).with_size_check(ctx.settings.verify_size);

    println!(
        "Installing {}/{} into {}",
        parsed.mod_slug,
        parsed.version_slug,
        installer.mods_dir().display()
    );
    let summary = install_version(&client, &installer, &parsed.mod_slug, &parsed.version_slug)
        .await
        .with_context(|| format!("installing from {link}"))?;

    report(&summary);
    if !summary.is_complete() {
        return Err(ModpkgError::IncompleteInstall {
            failed: summary.failed.len(),
            total: summary.total(),
        }
        .into());
    }

    println!("Installed mod and dependencies! You can close this window.");
    Ok(())
}

fn report(summary: &InstallSummary) {
    for m in &summary.installed {
        if m.already_present {
            println!(
                "✔️  {}:{} already installed ({})",
                m.mod_slug,
                m.version_number,
                m.path.display()
            );
        } else {
            println!(
                "✅ {}:{} [{}] → {}",
                m.mod_slug,
                m.version_number,
                m.mod_loader,
                m.path.display()
            );
        }
    }
    for f in &summary.failed {
        println!("❌ {}:{}: {}", f.mod_slug, f.version_number, f.error);
    }
}
