//! `ProviderClient` backed by the `oci` command-line tool.
//!
//! Each attempt writes the payload to a temp file and runs
//! `oci compute instance launch --from-json file://...`. Stdout carries the
//! created instance on success; stderr carries a `ServiceError:` JSON block
//! on failure.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::{InstanceHandle, ProviderClient};
use crate::launch::LaunchRequest;
use crate::retry::ProviderError;

/// Code attached to failures that happened before the provider answered.
pub const CLIENT_ERROR_CODE: &str = "ClientError";

const SERVICE_ERROR_MARKER: &str = "ServiceError:";

#[derive(Debug, Clone)]
pub struct OciCliClient {
    binary: PathBuf,
    profile: String,
    region: Option<String>,
    config_file: Option<PathBuf>,
    debug: bool,
}

impl OciCliClient {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("oci"),
            profile: profile.into(),
            region: None,
            config_file: None,
            debug: false,
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Pass `--debug` so `oci` logs its HTTP request and response.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    fn args(&self, payload: &Path) -> Vec<OsString> {
        let mut from_json = OsString::from("file://");
        from_json.push(payload);
        let mut args: Vec<OsString> = vec![
            "compute".into(),
            "instance".into(),
            "launch".into(),
            "--from-json".into(),
            from_json,
            "--profile".into(),
            self.profile.clone().into(),
        ];
        if let Some(region) = &self.region {
            args.push("--region".into());
            args.push(region.into());
        }
        if let Some(path) = &self.config_file {
            args.push("--config-file".into());
            args.push(path.into());
        }
        if self.debug {
            args.push("--debug".into());
        }
        args
    }
}

fn client_error(message: String) -> ProviderError {
    ProviderError::new(message).with_code(CLIENT_ERROR_CODE)
}

fn write_payload(request: &LaunchRequest) -> Result<NamedTempFile, ProviderError> {
    let json = serde_json::to_vec(request)
        .map_err(|e| client_error(format!("serialize launch request: {e}")))?;
    let mut file = tempfile::Builder::new()
        .prefix("ocilaunch-")
        .suffix(".json")
        .tempfile()
        .map_err(|e| client_error(format!("create payload file: {e}")))?;
    file.write_all(&json)
        .and_then(|_| file.flush())
        .map_err(|e| client_error(format!("write payload file: {e}")))?;
    Ok(file)
}

impl ProviderClient for OciCliClient {
    async fn launch_instance(&self, request: &LaunchRequest) -> Result<InstanceHandle, ProviderError> {
        let payload = write_payload(request)?;
        let output = Command::new(&self.binary)
            .args(self.args(payload.path()))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| client_error(format!("failed to run {}: {e}", self.binary.display())))?;

        if output.status.success() {
            parse_launch_output(&String::from_utf8_lossy(&output.stdout))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(status = ?output.status, "oci stderr: {}", stderr.trim());
            Err(parse_service_error(&stderr))
        }
    }
}

#[derive(Deserialize)]
struct LaunchResponse {
    data: InstanceHandle,
}

/// Extract the created instance from `oci` stdout.
pub fn parse_launch_output(stdout: &str) -> Result<InstanceHandle, ProviderError> {
    let body = json_block(stdout)
        .ok_or_else(|| client_error(format!("unexpected oci output: {}", stdout.trim())))?;
    let resp: LaunchResponse = serde_json::from_str(body)
        .map_err(|e| client_error(format!("unparseable oci output: {e}")))?;
    Ok(resp.data)
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    code: Option<String>,
    message: Option<String>,
    status: Option<u16>,
    #[serde(rename = "opc-request-id")]
    opc_request_id: Option<String>,
}

/// Turn `oci` stderr into a `ProviderError`. Falls back to the raw text
/// when no `ServiceError` JSON block is present.
///
/// With `--debug`, request/response dumps precede the block, so parsing
/// starts at the `ServiceError:` marker when there is one.
pub fn parse_service_error(stderr: &str) -> ProviderError {
    let tail = stderr
        .rfind(SERVICE_ERROR_MARKER)
        .map(|i| &stderr[i..])
        .unwrap_or(stderr);
    let parsed = json_block(tail).and_then(|b| serde_json::from_str::<ServiceErrorBody>(b).ok());
    match parsed {
        Some(body) => ProviderError {
            message: body.message.unwrap_or_default(),
            code: body.code,
            status: body.status,
            opc_request_id: body.opc_request_id,
        },
        None => ProviderError::new(stderr.trim()),
    }
}

fn json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
