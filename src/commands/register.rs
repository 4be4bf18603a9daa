use anyhow::{Context, Result};

use crate::protocol::{register, Registration};

pub fn run() -> Result<()> {
    let exe = std::env::current_exe().context("locating the modpkg executable")?;
    match register(&exe)? {
        Registration::DesktopEntry(path) => {
            println!("Successfully registered (desktop entry {})", path.display())
        }
        Registration::WindowsRegistry(key) => println!("Successfully registered ({key})"),
    }
    Ok(())
}
