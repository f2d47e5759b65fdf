//! OCI credential profile selection.
//!
//! Only the profile name and its `region` are read here; key material is
//! left to the `oci` tool.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROFILE: &str = "DEFAULT";
pub const PROFILE_ENV: &str = "OCI_PROFILE";
pub const CONFIG_FILE_ENV: &str = "OCI_CLI_CONFIG_FILE";

/// A profile that exists in the profile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciProfile {
    pub name: String,
    pub config_file: PathBuf,
    pub region: Option<String>,
}

/// Pick the profile name: CLI flag, then `OCI_PROFILE`, then the config file, then `DEFAULT`.
pub fn resolve_profile_name(
    cli: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
) -> String {
    [cli, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PROFILE)
        .to_string()
}

/// `$OCI_CLI_CONFIG_FILE`, else `~/.oci/config`.
pub fn default_config_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().context("home directory not found; cannot locate ~/.oci/config")?;
    Ok(home.join(".oci").join("config"))
}

/// Load `name` from the INI-style profile store at `path`.
pub fn load_profile(path: &Path, name: &str) -> Result<OciProfile> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read OCI config {}", path.display()))?;
    let Some(section) = find_section(&data, name) else {
        bail!("profile [{}] not found in {}", name, path.display());
    };
    let region = section
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("region"))
        .map(|(_, v)| v.to_string());
    Ok(OciProfile {
        name: name.to_string(),
        config_file: path.to_path_buf(),
        region,
    })
}

fn find_section<'a>(data: &'a str, name: &str) -> Option<Vec<(&'a str, &'a str)>> {
    let mut current: Option<&str> = None;
    let mut found = false;
    let mut entries = Vec::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = Some(header.trim());
            found |= current == Some(name);
            continue;
        }
        if current == Some(name) {
            if let Some((k, v)) = line.split_once('=') {
                entries.push((k.trim(), v.trim()));
            }
        }
    }
    found.then_some(entries)
}
