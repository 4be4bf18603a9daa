//! # modpkg
//!
//! Core library for the `modpkg` command-line client: packaging mod directories,
//! talking to a mod registry, and installing mods (plus their direct dependencies)
//! from `modpkg://` links.

use clap::Parser;

pub mod archive;
pub mod commands;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod dependency;
pub mod error;
pub mod install;
pub mod link;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod protocol;
pub mod registry;
pub mod resolver;

/// Package, publish and install mods
///
/// When launched by the operating system with a `modpkg://<mod>/<version>` link as the
/// only argument, the mod and its dependencies are installed into the game's mods folder.
#[derive(Parser, Debug)]
#[command(
    name = "modpkg",
    version,
    about = "Package, publish and install mods from a modpkg registry",
    long_about = "Package mod directories into versioned archives, publish them to a modpkg registry,\nand install mods together with their dependencies from modpkg:// links."
)]
pub struct Cli {
    /// Registry base URL (overrides MODPKG_REGISTRY and the settings file)
    #[arg(long, global = true)]
    pub registry: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Option<commands::Commands>,
}

impl Cli {
    /// The invocation the OS handler produces: just a link, no subcommand.
    pub fn for_link(link: String) -> Self {
        Cli {
            registry: None,
            verbose: 0,
            cmd: Some(commands::Commands::Install { link }),
        }
    }
}
