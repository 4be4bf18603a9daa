use anyhow::{Context as _, Result};
use dialoguer::{Input, Password};
use tracing::debug;

use super::Context;
use crate::registry::RegistryClient;

pub async fn run(ctx: &Context) -> Result<()> {
    let client = sign_in(ctx).await?;
    println!("✅ Signed in to {}", client.base_url());
    Ok(())
}

/// A client for an authenticated session, prompting for credentials only when the
/// stored token is missing or no longer accepted.
pub async fn ensure_authenticated(ctx: &Context) -> Result<RegistryClient> {
    if ctx.credentials.load()?.is_some() {
        let client = ctx.client()?;
        if client.whoami().await?.is_some() {
            return Ok(client);
        }
        debug!("stored token was rejected, signing in again");
    }
    sign_in(ctx).await
}

async fn sign_in(ctx: &Context) -> Result<RegistryClient> {
    let username: String = Input::new().with_prompt("username").interact_text()?;
    let password = Password::new().with_prompt("password").interact()?;

    let token = RegistryClient::new(&ctx.anonymous_session())?
        .sign_in(&username, &password)
        .await
        .with_context(|| format!("signing in as {username}"))?;
    ctx.credentials.save(&token)?;
    ctx.client()
}
