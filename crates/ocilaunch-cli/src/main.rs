use clap::Parser;
use ocilaunch_core::logging;
use std::process::ExitCode;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    logging::init_logging(cli.log_level.into());

    match cli.run().await {
        Ok(status) => status.report(),
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("ocilaunch error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
