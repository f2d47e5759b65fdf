//! `ocilaunch --dry-run`: build and show the payload; no provider, no retries.

use anyhow::Result;
use ocilaunch_core::config::AppConfig;
use ocilaunch_core::launch::{self, LaunchRequest};

pub fn run_dry_run(cfg: &AppConfig) -> Result<String> {
    let request = LaunchRequest::from_vm_config(&cfg.vm_config)?;
    launch::render_dry_run(&request)
}
