mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "eero", &mut std::io::stdout());
            Ok(())
        }

        // Config commands never touch the network or the session.
        Command::Config(args) => {
            let cfg = config::load_config_or_default();
            config::apply_display_defaults(&mut global, &cfg);
            commands::config_cmd::handle(args, &global)
        }

        cmd => {
            let mut cfg = config::load_config()?;
            config::apply_overrides(&mut cfg, &global)?;
            config::apply_display_defaults(&mut global, &cfg);
            let client = config::build_client(&cfg)?;

            tracing::debug!(api_url = %cfg.api_url, "dispatching command");
            commands::dispatch(cmd, &client, &cfg, &global).await
        }
    }
}
