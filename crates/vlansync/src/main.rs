mod cli;
mod commands;
mod error;
mod logging;
mod server;

use clap::Parser;

use vlansync_config::Settings;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(vlansync_config::config_path);
    let settings = Settings::from_figment(&vlansync_config::figment(&path))?;
    let verbose = cli.global.verbose;

    match cli.command.unwrap_or(Command::Worker) {
        Command::Worker => {
            // Validate everything before the first log line or connection.
            let worker = settings.worker_config()?;
            let log = settings.log_config()?;
            let _guard = logging::init_worker(&log, verbose)?;
            tracing::debug!(config = %path.display(), "configuration loaded");
            commands::worker::run(worker).await
        }
        Command::Serve => {
            let serve = settings.serve_config()?;
            let log = settings.log_config()?;
            let _guard = logging::init_worker(&log, verbose)?;
            commands::serve::run(serve).await
        }
        Command::Enqueue(args) => {
            logging::init_console(verbose);
            commands::enqueue::handle(&args, &settings).await
        }
        Command::Sign(args) => {
            logging::init_console(verbose);
            commands::sign::handle(&args, &settings)
        }
        Command::CheckConfig => {
            logging::init_console(verbose);
            commands::check_config::handle(&settings, &path)
        }
    }
}
