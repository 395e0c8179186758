//! Client device command handlers.

use tabled::Tabled;

use eero_core::{ClientDevice, ClientStatus, EeroClient, MacAddress, ResourceId};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, Lookup};

const DEVICES: Lookup = Lookup {
    resource_type: "device",
    list_command: "devices list",
};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Eero")]
    eero: String,
}

impl DeviceRow {
    fn new(d: &ClientDevice, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name().to_owned(),
            mac: d.mac.to_string(),
            ip: output::or_dash(d.ip.as_deref()),
            status: output::paint_status(
                &d.status.to_string(),
                d.status == ClientStatus::Connected,
                color,
            ),
            link: link(d),
            eero: output::or_dash(d.source_location.as_deref()),
        }
    }
}

fn link(d: &ClientDevice) -> String {
    d.connection_type.clone().unwrap_or_else(|| {
        (if d.wireless { "wireless" } else { "wired" }).into()
    })
}

fn detail(d: &ClientDevice) -> String {
    let mut lines = vec![
        format!("ID:           {}", d.id),
        format!("Name:         {}", d.name()),
        format!("MAC:          {}", d.mac),
        format!("IP:           {}", output::or_dash(d.ip.as_deref())),
        format!("Status:       {}", d.status),
        format!("Link:         {}", link(d)),
        format!("Manufacturer: {}", output::or_dash(d.manufacturer.as_deref())),
        format!("Eero:         {}", output::or_dash(d.source_location.as_deref())),
        format!("Guest:        {}", d.is_guest),
        format!("Paused:       {}", d.paused),
    ];
    if let Some(ref profile) = d.profile_id {
        lines.push(format!("Profile:      {profile}"));
    }
    if let Some(seen) = d.last_active {
        lines.push(format!("Last active:  {}", seen.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.join("\n")
}

async fn resolve(
    client: &EeroClient,
    network: &ResourceId,
    identifier: &str,
) -> Result<ClientDevice, CliError> {
    let devices = client.devices(network).await?.to_vec()?;
    let mac = MacAddress::new(identifier);
    util::find_one(
        devices,
        identifier,
        DEVICES,
        |d| d.id.as_str(),
        |d, ident| d.mac == mac || d.name().eq_ignore_ascii_case(ident),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &EeroClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let network = client.resolve_network(None).await?;

    match args.command {
        DevicesCommand::List { connected, blocked } => {
            let color = output::should_color(global.color_mode());
            let devices: Vec<ClientDevice> = client
                .devices(&network)
                .await?
                .to_vec()?
                .into_iter()
                .filter(|d| !connected || d.connected)
                .filter(|d| !blocked || d.blocked)
                .collect();
            let out = output::render_list(
                global.format(),
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = resolve(client, &network, &device).await?;
            let dev = client.device(&network, &found.id).await?;
            let out = output::render_single(global.format(), &dev, detail, |d| d.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Block { device } => {
            let dev = resolve(client, &network, &device).await?;
            client.block_device(&network, &dev.id, true).await?;
            output::notice(&format!("Blocked {}", dev.name()), global.quiet);
            Ok(())
        }

        DevicesCommand::Unblock { device } => {
            let dev = resolve(client, &network, &device).await?;
            client.block_device(&network, &dev.id, false).await?;
            output::notice(&format!("Unblocked {}", dev.name()), global.quiet);
            Ok(())
        }

        DevicesCommand::Rename { device, name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "nickname must not be empty".into(),
                });
            }
            let dev = resolve(client, &network, &device).await?;
            client.rename_device(&network, &dev.id, name).await?;
            output::notice(&format!("Renamed {} to {name}", dev.name()), global.quiet);
            Ok(())
        }
    }
}
