mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli, &matches).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli, matches: &ArgMatches) -> Result<(), CliError> {
    let defaults = config::load_config_or_default().defaults;
    config::apply_display_defaults(&mut cli.global, matches, &defaults)?;

    match cli.command {
        // Config commands don't need the API
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ifwatch", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let session = config::resolve_session(&cli.global)?;
            tracing::debug!(command = ?cmd, device = %session.device, "dispatching command");
            commands::dispatch(cmd, session, &cli.global).await
        }
    }
}
