//! Configuration management for modpkg
//!
//! Settings come from three layers, later wins:
//! 1. Built-in defaults (production registry, 120s transfer timeout)
//! 2. The optional settings file `~/.config/modpkg/config.yaml`, or the path in
//!    `MODPKG_CONFIG_PATH`
//! 3. Environment overrides (`MODPKG_REGISTRY`, `MODPKG_MODS_DIR`) and the `--registry` flag
//!
//! ## Environment Variable Expansion
//!
//! The settings file supports environment variable expansion with the following syntax:
//! - `${VAR}` - Simple substitution
//! - `${VAR:-default}` - Use default if VAR is unset or empty
//! - `${VAR-default}` - Use default if VAR is unset
//! - `${VAR:+alt}` - Use alt if VAR is set and non-empty
//! - `${VAR+alt}` - Use alt if VAR is set

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REGISTRY, DEFAULT_TIMEOUT_SECS, ENV_CONFIG_PATH,
    ENV_MODS_DIR, ENV_REGISTRY,
};
use crate::error::{ModpkgError, ModpkgResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use std::{env, fs, path::PathBuf};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?[-+])([^}]*))?\}")
        .expect("placeholder pattern")
});

/// User settings loaded from `config.yaml`
///
/// # Example
///
/// ```yaml
/// registry: ${MODPKG_STAGING_URL:-https://modsfolder.com}
/// timeoutSecs: 300
/// modsDir: /srv/minecraft/mods
/// verifySize: true
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Settings {
    /// Base URL of the registry
    pub registry: String,
    /// Upper bound for a whole request, body transfer included
    pub timeout_secs: u64,
    /// Upper bound for establishing a connection
    pub connect_timeout_secs: u64,
    /// Where artifacts are installed; platform default when unset
    pub mods_dir: Option<PathBuf>,
    /// Compare downloaded byte counts against the advertised `filesize`
    pub verify_size: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            registry: DEFAULT_REGISTRY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            mods_dir: None,
            verify_size: false,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Apply environment overrides, then the `--registry` flag if given.
    pub fn with_overrides(mut self, registry_flag: Option<&str>) -> Self {
        if let Ok(registry) = env::var(ENV_REGISTRY) {
            if !registry.is_empty() {
                self.registry = registry;
            }
        }
        if let Ok(dir) = env::var(ENV_MODS_DIR) {
            if !dir.is_empty() {
                self.mods_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(registry) = registry_flag {
            self.registry = registry.to_string();
        }
        self
    }
}

/// Location of the settings file, honoring `MODPKG_CONFIG_PATH`.
pub fn settings_path() -> PathBuf {
    env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("modpkg/config.yaml");
            p
        })
}

/// Load settings from `path`; a missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> ModpkgResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let data = preprocess_config(path)?;
    if data.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&data)
        .map_err(|e| ModpkgError::Config(format!("parsing {}: {e}", path.display())))
}

pub fn load_settings() -> ModpkgResult<Settings> {
    load_settings_from(&settings_path())
}

pub fn expand_env_placeholders(input: &str) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let op = caps.get(2).map_or("", |m| m.as_str());
            let val = caps.get(3).map_or("", |m| m.as_str());
            let var = env::var(var_name).ok();

            match (var.as_deref(), op) {
                (Some(v), _) if op.is_empty() => v.to_string(), // ${VAR}
                (Some(v), ":-") if !v.is_empty() => v.to_string(), // ${VAR:-default}
                (Some(_), ":-") | (None, ":-") => val.to_string(),
                (Some(v), "-") => v.to_string(), // ${VAR-default}
                (None, "-") => val.to_string(),
                (Some(v), ":+") if !v.is_empty() => val.to_string(), // ${VAR:+alt}
                (Some(_), "+") => val.to_string(),                   // ${VAR+alt}
                _ => "".to_string(),
            }
        })
        .to_string()
}

pub fn preprocess_config(path: &Path) -> ModpkgResult<String> {
    let raw_data = fs::read_to_string(path).map_err(|e| ModpkgError::fs(path, e))?;
    Ok(expand_env_placeholders(&raw_data))
}
