//! `ocilaunch` (execute mode): resolve the profile and run the retry loop.

use anyhow::Result;
use ocilaunch_core::config::AppConfig;
use ocilaunch_core::control;
use ocilaunch_core::launch::LaunchRequest;
use ocilaunch_core::profile;
use ocilaunch_core::provider::OciCliClient;
use ocilaunch_core::retry::{self, CapacityPatterns, LaunchOutcome};
use tokio_util::sync::CancellationToken;

/// `provider_debug` turns on the `oci` tool's own request/response logging.
pub async fn run_launch_command(
    cfg: &AppConfig,
    profile_override: Option<&str>,
    provider_debug: bool,
) -> Result<LaunchOutcome> {
    let policy = cfg.retry_config.to_policy()?;
    let request = LaunchRequest::from_vm_config(&cfg.vm_config)?;

    let env_profile = std::env::var(profile::PROFILE_ENV).ok();
    let name = profile::resolve_profile_name(
        profile_override,
        env_profile.as_deref(),
        cfg.oci_profile.as_deref(),
    );
    let store = profile::default_config_file()?;
    let oci_profile = profile::load_profile(&store, &name)?;
    let region = cfg.vm_config.region.clone().or(oci_profile.region);

    tracing::info!(
        profile = %oci_profile.name,
        region = region.as_deref().unwrap_or("-"),
        shape = %cfg.vm_config.shape,
        display_name = cfg.vm_config.display_name(),
        max_attempts = policy.max_attempts(),
        "starting instance provisioning"
    );

    let client = OciCliClient::new(oci_profile.name)
        .with_region(region)
        .with_config_file(Some(oci_profile.config_file))
        .with_debug(provider_debug);
    if provider_debug {
        tracing::debug!("enabled oci debug logging");
    }

    let cancel = CancellationToken::new();
    let interrupts = control::install_interrupt_handler(cancel.clone());
    let report = retry::run_launch(
        &request,
        &client,
        &policy,
        &CapacityPatterns::default(),
        &cancel,
    )
    .await;
    interrupts.abort();

    tracing::info!(
        attempts = report.attempts,
        waits = report.waits.len(),
        "provisioning finished: {}",
        report.outcome
    );
    Ok(report.outcome)
}
