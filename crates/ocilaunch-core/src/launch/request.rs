//! LaunchInstanceDetails payload, built from `VmConfig`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::config::VmConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDetails {
    pub source_type: String,
    pub image_id: String,
    #[serde(rename = "bootVolumeSizeInGBs", skip_serializing_if = "Option::is_none")]
    pub boot_volume_size_in_gbs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfigDetails {
    pub ocpus: f64,
    #[serde(rename = "memoryInGBs")]
    pub memory_in_gbs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicDetails {
    pub subnet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_public_ip: Option<bool>,
}

/// Request handed to the provider's launch call, in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub compartment_id: String,
    pub display_name: String,
    pub availability_domain: String,
    pub shape: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_config: Option<ShapeConfigDetails>,
    pub source_details: SourceDetails,
    pub create_vnic_details: VnicDetails,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl LaunchRequest {
    pub fn from_vm_config(vm: &VmConfig) -> Result<Self> {
        let shape_config = match &vm.shape_config {
            Some(sc) => match (sc.ocpus, sc.memory_in_gbs) {
                (Some(ocpus), Some(memory_in_gbs)) => Some(ShapeConfigDetails {
                    ocpus,
                    memory_in_gbs,
                }),
                _ => bail!("shape_config needs both ocpus and memory_in_gbs"),
            },
            None => None,
        };

        let mut metadata = BTreeMap::new();
        if let Some(key) = load_ssh_authorized_keys(vm.ssh_public_key.as_deref())? {
            metadata.insert("ssh_authorized_keys".to_string(), key);
        }

        let request = Self {
            compartment_id: vm.compartment_id.clone(),
            display_name: vm.display_name().to_string(),
            availability_domain: vm.availability_domain.clone(),
            shape: vm.shape.clone(),
            shape_config,
            source_details: SourceDetails {
                source_type: "image".to_string(),
                image_id: vm.image_id.clone(),
                boot_volume_size_in_gbs: vm.boot_volume_size_in_gbs,
            },
            create_vnic_details: VnicDetails {
                subnet_id: vm.subnet_id.clone(),
                assign_public_ip: vm.assign_public_ip,
            },
            metadata,
        };
        tracing::debug!(?request, "built launch request");
        Ok(request)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize launch request")
    }
}

/// Resolve `ssh_public_key`: a readable file's content, or the value itself.
/// Returns `None` when unset or empty.
pub fn load_ssh_authorized_keys(value: Option<&str>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let path = expand_home(value);
    let text = if path.is_file() {
        fs::read_to_string(&path)
            .with_context(|| format!("failed reading ssh_public_key file {}", path.display()))?
            .trim()
            .to_string()
    } else {
        value.trim().to_string()
    };
    if text.is_empty() {
        return Ok(None);
    }
    if !text.starts_with("ssh-") {
        let preview: String = text.chars().take(40).collect();
        bail!("ssh_public_key must be an OpenSSH public key (starts with 'ssh-'), got: {preview:?}...");
    }
    Ok(Some(text))
}

/// `~/x` relative to the home directory; anything else unchanged.
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}
