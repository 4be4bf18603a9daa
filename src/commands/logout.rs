use anyhow::Result;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    if ctx.credentials.clear()? {
        println!("Removed token from {}", ctx.credentials.path().display());
    } else {
        println!("Not logged in");
    }
    Ok(())
}
