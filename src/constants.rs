pub const DEFAULT_REGISTRY: &str = "https://modsfolder.com";
pub const PROTOCOL_SCHEME: &str = "modpkg";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const README_FILE: &str = "README.md";
pub const README_PLACEHOLDER: &str = "Edit this readme on the site!";
pub const TOKEN_FILE: &str = ".modpkg_token";
pub const TOKEN_COOKIE: &str = "token";

pub const ENV_CONFIG_PATH: &str = "MODPKG_CONFIG_PATH";
pub const ENV_REGISTRY: &str = "MODPKG_REGISTRY";
pub const ENV_MODS_DIR: &str = "MODPKG_MODS_DIR";
pub const ENV_TOKEN_PATH: &str = "MODPKG_TOKEN_PATH";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
