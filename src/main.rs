//! rtsp-streamer - re-stream local videos over RTSP
//!
//! # Usage
//!
//! ```bash
//! rtsp-streamer init
//! rtsp-streamer download --url https://example.com/clip.mp4 --name clip
//! rtsp-streamer stream --video clip --loop
//! rtsp-streamer stop
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rtsp_streamer::cli::{Cli, Command, ExitCode, Output};
use rtsp_streamer::commands;
use rtsp_streamer::config::{Config, CONFIG_FILE};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Log to stderr. RUST_LOG wins over --verbose.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rtsp_streamer=debug")
        } else {
            EnvFilter::new("rtsp_streamer=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let config_path = Config::resolve_path(cli.config.as_deref());
    tracing::debug!(config = %config_path.display(), "using config");

    match cli.command {
        Command::List(cmd) => commands::list_cmd(cmd, &config_path, &output).await,

        Command::Download(cmd) => commands::download_cmd(cmd, &config_path, &output).await,

        Command::Stream(cmd) => {
            if let Err(e) = cmd.validate() {
                return output.error(e, ExitCode::InvalidArgs);
            }
            commands::stream_cmd(cmd, &config_path, &output).await
        }

        Command::Stop(cmd) => commands::stop_cmd(cmd, &config_path, &output).await,

        Command::Status(cmd) => commands::status_cmd(cmd, &config_path, &output).await,

        Command::Doctor(cmd) => commands::doctor_cmd(cmd, &config_path, &output).await,

        Command::Init(cmd) => {
            // Without --config, init always writes to the working directory
            let path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
            commands::init_cmd(cmd, &path, &output).await
        }
    }
}
