//! CLI configuration: thin layer over `eero_config`.
//!
//! Applies `GlobalOpts` flag overrides on top of the loaded config and
//! builds the client the command handlers share.

use clap::ValueEnum;

use eero_api::ApiClient;
use eero_config::{Config, CredentialBackend, open_credential_store};
use eero_core::{EeroClient, ResourceId};

use crate::cli::{ColorMode, CredentialStoreKind, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use eero_config::{config_path, load_config, load_config_or_default, update_config};

/// Fold per-invocation flags into the loaded config.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        cfg.timeout_secs = timeout;
    }
    if let Some(kind) = global.credential_store {
        cfg.credential_store = match kind {
            CredentialStoreKind::File => CredentialBackend::File,
            CredentialStoreKind::Keyring => CredentialBackend::Keyring,
        };
    }
    if global.refresh {
        cfg.cache_ttl_secs = 0;
    }
    if let Some(network) = global.network.as_deref().filter(|n| !n.is_empty()) {
        cfg.default_network = Some(network.to_owned());
    }
    Ok(())
}

/// Fill `--output` / `--color` from the config's `[defaults]` when the
/// flags were not given. Unknown values fall back to the built-in default.
pub fn apply_display_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
    }
}

/// Build the shared client: credential store, pipeline and default network.
pub fn build_client(cfg: &Config) -> Result<EeroClient, CliError> {
    cfg.validate()?;
    let store = open_credential_store(cfg, cfg.credential_store);
    let api = ApiClient::new(cfg.api_config(), store)?;
    let default_network = cfg
        .default_network
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(ResourceId::new);
    Ok(EeroClient::new(api).with_default_network(default_network))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["eero"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config() {
        let mut cfg = Config::default();
        let opts = global(&[
            "--timeout",
            "5",
            "--credential-store",
            "keyring",
            "--refresh",
            "--network",
            "net-9",
        ]);
        apply_overrides(&mut cfg, &opts).unwrap();

        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.credential_store, CredentialBackend::Keyring);
        assert_eq!(cfg.cache_ttl_secs, 0);
        assert_eq!(cfg.default_network.as_deref(), Some("net-9"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = Config::default();
        let err = apply_overrides(&mut cfg, &global(&["--timeout", "0"])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn display_defaults_come_from_config_unless_flagged() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();
        cfg.defaults.color = "never".into();

        let mut opts = global(&[]);
        apply_display_defaults(&mut opts, &cfg);
        assert_eq!(opts.format(), OutputFormat::Json);
        assert_eq!(opts.color_mode(), ColorMode::Never);

        let mut opts = global(&["-o", "yaml"]);
        apply_display_defaults(&mut opts, &cfg);
        assert_eq!(opts.format(), OutputFormat::Yaml);
    }

    #[test]
    fn unknown_display_default_falls_back() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();
        let mut opts = global(&[]);
        apply_display_defaults(&mut opts, &cfg);
        assert_eq!(opts.format(), OutputFormat::Table);
    }

    #[test]
    fn client_picks_up_default_network() {
        let mut cfg = Config::default();
        cfg.default_network = Some("net-1".into());
        cfg.session_file = Some(std::env::temp_dir().join("eero-cli-config-test.json"));
        let client = build_client(&cfg).unwrap();
        assert_eq!(client.default_network().map(ResourceId::as_str), Some("net-1"));
    }
}
