//! Guest network command handlers.

use secrecy::SecretString;

use eero_core::{EeroClient, GuestNetwork, GuestNetworkUpdate};

use crate::cli::{GlobalOpts, GuestArgs, GuestCommand};
use crate::error::CliError;
use crate::output;

fn detail(g: &GuestNetwork) -> String {
    [
        format!("Enabled: {}", g.enabled),
        format!("Name:    {}", output::or_dash(g.name.as_deref())),
    ]
    .join("\n")
}

pub async fn handle(
    client: &EeroClient,
    args: GuestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let network = client.resolve_network(None).await?;

    match args.command {
        GuestCommand::Show => {
            let guest = client.network(&network).await?.guest_network;
            let out = output::render_single(global.format(), &guest, detail, |g| {
                (if g.enabled { "enabled" } else { "disabled" }).into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GuestCommand::Enable { name, password } => {
            if password.as_deref().is_some_and(|p| p.len() < 8) {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "must be at least 8 characters".into(),
                });
            }
            let update = GuestNetworkUpdate {
                enabled: true,
                name,
                password: password.map(SecretString::from),
            };
            client.set_guest_network(&network, &update).await?;
            output::notice("Guest network enabled", global.quiet);
            Ok(())
        }

        GuestCommand::Disable => {
            let update = GuestNetworkUpdate {
                enabled: false,
                ..GuestNetworkUpdate::default()
            };
            client.set_guest_network(&network, &update).await?;
            output::notice("Guest network disabled", global.quiet);
            Ok(())
        }
    }
}
