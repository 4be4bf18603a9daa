//! # modpkg
//!
//! Command-line client for a mod registry.
//!
//! ## Quick Start
//!
//! ```bash
//! # Package a mod directory (reads manifest.json)
//! modpkg pkg ./coolmod
//!
//! # Create the listing, then publish a version
//! modpkg create ./coolmod
//! modpkg upload coolmod-1.2.0.zip
//!
//! # Let the browser hand modpkg:// links to this binary
//! modpkg register
//!
//! # Install a version and its dependencies
//! modpkg install modpkg://coolmod/AbC123
//! ```
//!
//! ## Configuration
//!
//! - `~/.config/modpkg/config.yaml` - optional settings (registry, timeouts, mods dir)
//! - `~/.modpkg_token` - session token written by `modpkg login`

use clap::Parser;
use modpkg::{commands, error::exit_code, link, logging, Cli};

/// Main entry point for modpkg
///
/// A lone URL argument is a protocol link forwarded by the OS; anything else is parsed
/// as a normal command line. Failures map to a per-kind exit status.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match args.as_slice() {
        [_, arg] if link::is_url(arg) => Cli::for_link(arg.clone()),
        _ => Cli::parse(),
    };
    logging::init(cli.verbose);

    let Some(cmd) = cli.cmd else {
        eprintln!("No command provided. Use --help to see available commands.");
        std::process::exit(1);
    };

    if let Err(err) = commands::run(cmd, cli.registry.as_deref()).await {
        eprintln!("❌ {err:#}");
        std::process::exit(exit_code(&err));
    }
}
