//! Config command handlers. These run without a client or a session.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.format() {
                OutputFormat::Table => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Render(e.to_string()))?,
                format => output::render_single(format, &cfg, |_| String::new(), |_| {
                    config::config_path().display().to_string()
                })?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetNetwork { network } => {
            let network = network.trim();
            if network.is_empty() {
                return Err(CliError::Validation {
                    field: "network".into(),
                    reason: "must not be empty".into(),
                });
            }
            config::update_config(|cfg| cfg.default_network = Some(network.to_owned()))?;
            output::notice(&format!("Default network set to {network}"), global.quiet);
            Ok(())
        }
    }
}
