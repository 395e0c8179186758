//! Command dispatch: bridges CLI args -> `EeroClient` calls -> output formatting.

pub mod account;
pub mod auth;
pub mod config_cmd;
pub mod devices;
pub mod eeros;
pub mod guest;
pub mod networks;
pub mod profiles;
pub mod speedtest;
pub mod util;

use eero_config::Config;
use eero_core::EeroClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    client: &EeroClient,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(client, args, global).await,
        Command::Logout => auth::logout(client, global).await,
        Command::Status => auth::status(client, cfg, global),
        Command::RefreshSession => auth::refresh_session(client, global).await,
        Command::Account => account::show(client, global).await,
        Command::Networks(args) => networks::handle(client, args, global).await,
        Command::Eeros(args) => eeros::handle(client, args, global).await,
        Command::Devices(args) => devices::handle(client, args, global).await,
        Command::Profiles(args) => profiles::handle(client, args, global).await,
        Command::Guest(args) => guest::handle(client, args, global).await,
        Command::Speedtest(args) => speedtest::handle(client, args, global).await,
        // Handled in main before a client is built.
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}
