use clap::Parser;
use std::process::ExitCode;

use gdman_platform::AppPaths;

mod cli;
mod logging;
mod prompt;
mod settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let paths = AppPaths::new();
    let settings = settings::AppSettings::load(&paths);
    logging::init_logging(&paths, cli.debug || settings.debug_logging);

    log::info!("gdman {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run(cli, &paths, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
