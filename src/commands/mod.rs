use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::{
    config::{load_settings, Settings},
    credentials::CredentialStore,
    registry::{RegistryClient, Session},
};

pub mod completions;
pub mod create;
pub mod install;
pub mod login;
pub mod logout;
pub mod pkg;
pub mod register;
pub mod upload;
pub mod whoami;

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Install a mod version and its dependencies from a modpkg:// link")]
    Install { link: String },
    #[command(about = "Zip up a directory (with manifest.json) to make it ready for upload")]
    Pkg {
        directory: PathBuf,
        /// Where to write the archive (defaults to the current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    #[command(about = "Create a listing for a mod from a directory")]
    Create { directory: PathBuf },
    #[command(about = "Upload a packaged mod (or package a directory first) and publish a new version")]
    Upload { mod_archive_or_directory: PathBuf },
    #[command(about = "Sign in to the registry and store the session token")]
    Login,
    #[command(about = "Forget the stored session token")]
    Logout,
    #[command(about = "Show which account the stored token belongs to")]
    Whoami,
    #[command(about = "Register the modpkg:// protocol with the operating system")]
    Register,
    #[command(about = "Emit shell completion scripts (bash/zsh/fish)")]
    Completions { shell: String },
}

/// Settings and stored credentials shared by the command handlers.
pub struct Context {
    pub settings: Settings,
    pub credentials: CredentialStore,
}

impl Context {
    pub fn load(registry: Option<&str>) -> Result<Self> {
        Ok(Context {
            settings: load_settings()?.with_overrides(registry),
            credentials: CredentialStore::default_location()?,
        })
    }

    /// Session carrying the stored token, if there is one.
    pub fn session(&self) -> Result<Session> {
        Ok(Session::from_settings(&self.settings, self.credentials.load()?))
    }

    pub fn anonymous_session(&self) -> Session {
        Session::from_settings(&self.settings, None)
    }

    pub fn client(&self) -> Result<RegistryClient> {
        Ok(RegistryClient::new(&self.session()?)?)
    }
}

pub async fn run(cmd: Commands, registry: Option<&str>) -> Result<()> {
    match cmd {
        Commands::Install { link } => install::run(registry, &link).await,
        Commands::Pkg { directory, out_dir } => pkg::run(directory, out_dir).await,
        Commands::Create { directory } => create::run(&Context::load(registry)?, &directory).await,
        Commands::Upload {
            mod_archive_or_directory,
        } => upload::run(&Context::load(registry)?, &mod_archive_or_directory).await,
        Commands::Login => login::run(&Context::load(registry)?).await,
        Commands::Logout => logout::run(&Context::load(registry)?),
        Commands::Whoami => whoami::run(&Context::load(registry)?).await,
        Commands::Register => register::run(),
        Commands::Completions { shell } => completions::run(shell),
    }
}
