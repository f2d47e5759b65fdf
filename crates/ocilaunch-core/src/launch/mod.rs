//! Launch request building and dry-run rendering.

mod request;

pub use request::{
    load_ssh_authorized_keys, LaunchRequest, ShapeConfigDetails, SourceDetails, VnicDetails,
};

use anyhow::Result;

/// Render the would-be request for a dry run. Never contacts the provider.
pub fn render_dry_run(request: &LaunchRequest) -> Result<String> {
    let json = request.to_json_pretty()?;
    tracing::info!("DRY RUN: launch payload below (no instance will be created)");
    tracing::debug!("{}", json);
    Ok(json)
}
