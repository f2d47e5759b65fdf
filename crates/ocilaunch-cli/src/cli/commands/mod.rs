//! CLI command handlers.

mod dry_run;
mod launch;

pub use dry_run::run_dry_run;
pub use launch::run_launch_command;
