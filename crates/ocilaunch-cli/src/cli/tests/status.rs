//! Tests for run status mapping and the dry-run path.

use super::parse;
use crate::cli::RunStatus;
use ocilaunch_core::provider::InstanceHandle;
use ocilaunch_core::retry::LaunchOutcome;
use std::io::Write;

#[test]
fn exit_codes_are_distinct_per_terminal_state() {
    let codes = [
        RunStatus::Launch(LaunchOutcome::Succeeded(InstanceHandle {
            id: "ocid1.instance.oc1..x".into(),
            lifecycle_state: None,
        }))
        .exit_code(),
        RunStatus::Launch(LaunchOutcome::FailedFatal {
            reason: "Authorization failed".into(),
            code: Some("NotAuthorizedOrNotFound".into()),
        })
        .exit_code(),
        RunStatus::Launch(LaunchOutcome::FailedExhausted {
            last_reason: "Out of host capacity.".into(),
            attempts: 30,
        })
        .exit_code(),
        RunStatus::Launch(LaunchOutcome::Cancelled { attempts: 2 }).exit_code(),
    ];
    assert_eq!(codes, [0, 1, 2, 130]);
    assert_eq!(RunStatus::DryRun.exit_code(), 0);
}

#[tokio::test]
async fn dry_run_succeeds_without_profile_store() {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    f.write_all(
        br#"{"vm_config": {
            "compartment_id": "ocid1.compartment.oc1..aaa",
            "availability_domain": "AD-1",
            "image_id": "ocid1.image.oc1..bbb",
            "shape": "VM.Standard.E2.1.Micro",
            "subnet_id": "ocid1.subnet.oc1..ccc"
        }}"#,
    )
    .unwrap();
    f.flush().unwrap();
    let path = f.path().to_str().unwrap().to_string();

    let cli = parse(&["ocilaunch", "--dry-run", "--config", path.as_str()]);
    assert_eq!(cli.run().await.unwrap(), RunStatus::DryRun);
}

#[tokio::test]
async fn missing_config_is_an_error() {
    let cli = parse(&["ocilaunch", "--config", "/nonexistent/config.json"]);
    assert!(cli.run().await.is_err());
}
