//! Provider boundary: the single `launch_instance` operation and its
//! `oci` command-line implementation.

mod oci_cli;

pub use oci_cli::{parse_launch_output, parse_service_error, OciCliClient, CLIENT_ERROR_CODE};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::launch::LaunchRequest;
use crate::retry::ProviderError;

/// Identifier of a launched instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceHandle {
    pub id: String,
    #[serde(default, rename = "lifecycle-state")]
    pub lifecycle_state: Option<String>,
}

/// Executes one launch attempt. Implementations must not retry internally.
pub trait ProviderClient {
    fn launch_instance(
        &self,
        request: &LaunchRequest,
    ) -> impl Future<Output = Result<InstanceHandle, ProviderError>> + Send;
}
