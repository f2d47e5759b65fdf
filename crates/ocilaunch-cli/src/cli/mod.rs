//! CLI for launching an OCI compute instance.

mod commands;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use ocilaunch_core::config;
use ocilaunch_core::logging::LogLevel;
use ocilaunch_core::retry::LaunchOutcome;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_dry_run, run_launch_command};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ocilaunch")]
#[command(
    about = "Launch an OCI compute instance, retrying through host capacity shortages",
    long_about = None
)]
pub struct Cli {
    /// Path to the configuration file (JSON, or TOML with a .toml extension).
    #[arg(long, default_value = "config.json", value_name = "PATH")]
    pub config: PathBuf,

    /// OCI profile to use (overrides the config file and OCI_PROFILE).
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Logging level.
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevelArg::Info)]
    pub log_level: LogLevelArg,

    /// Validate the config and print the launch payload without launching.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warning => LogLevel::Warning,
            LogLevelArg::Error => LogLevel::Error,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    DryRun,
    Launch(LaunchOutcome),
}

impl RunStatus {
    /// 0 success, 1 fatal, 2 exhausted, 130 cancelled.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::DryRun | RunStatus::Launch(LaunchOutcome::Succeeded(_)) => 0,
            RunStatus::Launch(LaunchOutcome::FailedFatal { .. }) => 1,
            RunStatus::Launch(LaunchOutcome::FailedExhausted { .. }) => 2,
            RunStatus::Launch(LaunchOutcome::Cancelled { .. }) => 130,
        }
    }

    /// Print the terminal message: stdout on success, stderr otherwise.
    pub fn report(&self) -> ExitCode {
        match self {
            RunStatus::DryRun => {}
            RunStatus::Launch(outcome @ LaunchOutcome::Succeeded(_)) => println!("{outcome}"),
            RunStatus::Launch(outcome) => eprintln!("ocilaunch: {outcome}"),
        }
        ExitCode::from(self.exit_code())
    }
}

impl Cli {
    /// `--log-level debug` also enables the provider tool's debug output.
    pub fn provider_debug(&self) -> bool {
        self.log_level == LogLevelArg::Debug
    }

    pub async fn run(&self) -> Result<RunStatus> {
        let cfg = config::load_from_path(&self.config)?;
        tracing::debug!("loaded config: {:?}", cfg);

        if self.dry_run {
            let payload = run_dry_run(&cfg)?;
            println!("{payload}");
            return Ok(RunStatus::DryRun);
        }

        let outcome =
            run_launch_command(&cfg, self.profile.as_deref(), self.provider_debug()).await?;
        Ok(RunStatus::Launch(outcome))
    }
}

#[cfg(test)]
mod tests;
