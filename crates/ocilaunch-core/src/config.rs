use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::retry::RetryPolicy;

/// Retry parameters (optional section; each field falls back to its default).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of launch attempts (including the first).
    pub max_attempts: u32,
    /// First backoff wait in seconds.
    pub initial_delay_seconds: f64,
    /// Upper bound on any single wait, in seconds.
    pub max_delay_seconds: f64,
    /// Factor applied to the previous wait.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            initial_delay_seconds: 5.0,
            max_delay_seconds: 300.0,
            backoff_multiplier: 1.5,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.max_attempts,
            self.initial_delay_seconds,
            self.max_delay_seconds,
            self.backoff_multiplier,
        )
        .context("invalid retry_config")
    }
}

/// OCPU/memory for flexible shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub ocpus: Option<f64>,
    pub memory_in_gbs: Option<f64>,
}

/// The instance to launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmConfig {
    pub compartment_id: String,
    pub availability_domain: String,
    pub image_id: String,
    pub shape: String,
    pub subnet_id: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub boot_volume_size_in_gbs: Option<u64>,
    #[serde(default)]
    pub assign_public_ip: Option<bool>,
    #[serde(default)]
    pub shape_config: Option<ShapeConfig>,
    /// Path to an OpenSSH public key, or the key itself.
    #[serde(default)]
    pub ssh_public_key: Option<String>,
}

pub const DEFAULT_DISPLAY_NAME: &str = "compute-instance";

impl VmConfig {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Flex shapes need an explicit OCPU/memory pair.
    pub fn is_flex_shape(&self) -> bool {
        self.shape.contains("Flex")
    }
}

/// Top-level configuration file (`config.json` by default, TOML when the
/// extension is `.toml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub oci_profile: Option<String>,
    pub vm_config: VmConfig,
    #[serde(default)]
    pub retry_config: RetryConfig,
}

impl AppConfig {
    /// Reject configs that would only fail at the provider.
    pub fn validate(&self) -> Result<()> {
        let vm = &self.vm_config;
        for (field, value) in [
            ("compartment_id", &vm.compartment_id),
            ("image_id", &vm.image_id),
            ("subnet_id", &vm.subnet_id),
        ] {
            if value.trim().is_empty() {
                bail!("missing required field in vm_config: {field}");
            }
            if !value.starts_with("ocid1.") {
                bail!("invalid OCID format for {field}: {value}");
            }
        }
        if vm.shape.trim().is_empty() {
            bail!("missing required field in vm_config: shape");
        }
        if vm.availability_domain.trim().is_empty() {
            bail!("missing required field in vm_config: availability_domain");
        }
        if vm.is_flex_shape() {
            let complete = vm
                .shape_config
                .as_ref()
                .map(|sc| sc.ocpus.is_some() && sc.memory_in_gbs.is_some())
                .unwrap_or(false);
            if !complete {
                bail!(
                    "flex shape {} requires vm_config.shape_config.ocpus and vm_config.shape_config.memory_in_gbs",
                    vm.shape
                );
            }
        }
        self.retry_config.to_policy()?;
        Ok(())
    }
}

/// Parse a config document. TOML when `is_toml`, JSON otherwise.
pub fn parse(data: &str, is_toml: bool) -> Result<AppConfig> {
    let cfg: AppConfig = if is_toml {
        toml::from_str(data).context("invalid TOML config")?
    } else {
        serde_json::from_str(data).context("invalid JSON config")?
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Load and validate configuration from disk.
pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("config file not found or unreadable: {}", path.display()))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let cfg = parse(&data, is_toml).with_context(|| format!("config {}", path.display()))?;
    tracing::info!("configuration loaded from {}", path.display());
    Ok(cfg)
}
