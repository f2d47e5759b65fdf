//! Scripted `ProviderClient` for integration tests.
//!
//! Replays a queue of results, one per call, then repeats `fallback` once
//! the queue is empty. Records how many calls were made.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use ocilaunch_core::launch::{LaunchRequest, SourceDetails, VnicDetails};
use ocilaunch_core::provider::{InstanceHandle, ProviderClient};
use ocilaunch_core::retry::ProviderError;

pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<InstanceHandle, ProviderError>>>,
    fallback: Result<InstanceHandle, ProviderError>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<InstanceHandle, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Err(capacity()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn always(result: Result<InstanceHandle, ProviderError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: result,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProviderClient for ScriptedProvider {
    async fn launch_instance(&self, _request: &LaunchRequest) -> Result<InstanceHandle, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn capacity() -> ProviderError {
    ProviderError::new("Out of host capacity.")
        .with_code("InternalError")
        .with_status(500)
}

pub fn instance(id: &str) -> InstanceHandle {
    InstanceHandle {
        id: id.to_string(),
        lifecycle_state: Some("PROVISIONING".to_string()),
    }
}

pub fn request() -> LaunchRequest {
    LaunchRequest {
        compartment_id: "ocid1.compartment.oc1..aaa".into(),
        display_name: "test-instance".into(),
        availability_domain: "Uocm:PHX-AD-1".into(),
        shape: "VM.Standard.E2.1.Micro".into(),
        shape_config: None,
        source_details: SourceDetails {
            source_type: "image".into(),
            image_id: "ocid1.image.oc1..bbb".into(),
            boot_volume_size_in_gbs: None,
        },
        create_vnic_details: VnicDetails {
            subnet_id: "ocid1.subnet.oc1..ccc".into(),
            assign_public_ip: None,
        },
        metadata: Default::default(),
    }
}
