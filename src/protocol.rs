//! Registration of the `modpkg://` URI scheme with the operating system.

use crate::constants::PROTOCOL_SCHEME;
use crate::error::{ModpkgError, ModpkgResult};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, warn};

const DESKTOP_FILE: &str = "modpkg-handler.desktop";

/// Where the handler ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    DesktopEntry(PathBuf),
    WindowsRegistry(String),
}

/// XDG desktop entry that routes `x-scheme-handler/modpkg` to `exe`.
pub fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=modpkg\n\
         Comment=Install mods from {PROTOCOL_SCHEME}:// links\n\
         Exec=\"{}\" %u\n\
         Terminal=true\n\
         NoDisplay=true\n\
         MimeType=x-scheme-handler/{PROTOCOL_SCHEME};\n",
        exe.display()
    )
}

/// `reg add` invocations that register `exe` as the scheme handler for the current user.
pub fn windows_registry_commands(exe: &Path) -> Vec<Vec<String>> {
    let key = format!(r"HKCU\Software\Classes\{PROTOCOL_SCHEME}");
    let command = format!("\"{}\" \"%1\"", exe.display());
    vec![
        reg_add(&key, None, &format!("URL:{PROTOCOL_SCHEME} Protocol")),
        reg_add(&key, Some("URL Protocol"), ""),
        reg_add(&format!(r"{key}\shell\open\command"), None, &command),
    ]
}

fn reg_add(key: &str, value: Option<&str>, data: &str) -> Vec<String> {
    let mut args = vec!["add".to_string(), key.to_string()];
    match value {
        Some(name) => args.extend(["/v".to_string(), name.to_string()]),
        None => args.push("/ve".to_string()),
    }
    args.extend(["/d".to_string(), data.to_string(), "/f".to_string()]);
    args
}

/// Register `exe` as the handler for `modpkg://` links on this platform.
pub fn register(exe: &Path) -> ModpkgResult<Registration> {
    match std::env::consts::OS {
        "linux" => register_xdg(exe),
        "windows" => register_windows(exe),
        other => Err(ModpkgError::Config(format!(
            "registering the {PROTOCOL_SCHEME}:// scheme is not supported on '{other}'"
        ))),
    }
}

fn register_xdg(exe: &Path) -> ModpkgResult<Registration> {
    let apps = dirs::data_dir()
        .ok_or_else(|| ModpkgError::Config("cannot determine data directory".into()))?
        .join("applications");
    fs::create_dir_all(&apps).map_err(|e| ModpkgError::fs(&apps, e))?;
    let entry = apps.join(DESKTOP_FILE);
    fs::write(&entry, desktop_entry(exe)).map_err(|e| ModpkgError::fs(&entry, e))?;
    debug!("wrote {}", entry.display());

    let mime = format!("x-scheme-handler/{PROTOCOL_SCHEME}");
    match Command::new("xdg-mime")
        .args(["default", DESKTOP_FILE, &mime])
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("xdg-mime exited with {status}; the handler may need to be selected manually"),
        Err(e) => warn!("could not run xdg-mime: {e}"),
    }
    Ok(Registration::DesktopEntry(entry))
}

fn register_windows(exe: &Path) -> ModpkgResult<Registration> {
    for args in windows_registry_commands(exe) {
        let status = Command::new("reg")
            .args(&args)
            .status()
            .map_err(|e| ModpkgError::Config(format!("could not run reg.exe: {e}")))?;
        if !status.success() {
            return Err(ModpkgError::Config(format!(
                "reg {} failed with {status}",
                args.join(" ")
            )));
        }
    }
    Ok(Registration::WindowsRegistry(format!(
        r"HKCU\Software\Classes\{PROTOCOL_SCHEME}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_entry() {
        let entry = desktop_entry(Path::new("/usr/local/bin/modpkg"));
        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Exec=\"/usr/local/bin/modpkg\" %u\n"));
        assert!(entry.contains("MimeType=x-scheme-handler/modpkg;\n"));
        assert!(entry.contains("Terminal=true\n"));
    }

    #[test]
    fn test_windows_registry_commands() {
        let cmds = windows_registry_commands(Path::new(r"C:\tools\modpkg.exe"));
        assert_eq!(cmds.len(), 3);
        assert_eq!(
            cmds[0],
            vec![
                "add",
                r"HKCU\Software\Classes\modpkg",
                "/ve",
                "/d",
                "URL:modpkg Protocol",
                "/f"
            ]
        );
        assert_eq!(cmds[1][2..4], ["/v".to_string(), "URL Protocol".to_string()]);
        assert_eq!(cmds[2][1], r"HKCU\Software\Classes\modpkg\shell\open\command");
        assert_eq!(cmds[2][4], "\"C:\\tools\\modpkg.exe\" \"%1\"");
    }
}
