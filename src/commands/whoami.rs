use anyhow::Result;

use super::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    if ctx.credentials.load()?.is_none() {
        println!("Not logged in");
        return Ok(());
    }
    match ctx.client()?.whoami().await? {
        Some(user) => {
            let name = user
                .get("username")
                .and_then(|u| u.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| user.to_string());
            println!("Logged in to {} as {name}", ctx.settings.registry);
        }
        None => println!("Stored token is no longer valid; run `modpkg login`"),
    }
    Ok(())
}
