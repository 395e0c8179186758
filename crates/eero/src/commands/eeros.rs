//! Eero node command handlers.

use tabled::Tabled;

use eero_core::{EeroClient, EeroDevice, MacAddress, ResourceId};

use crate::cli::{EerosArgs, EerosCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, Lookup};

const EEROS: Lookup = Lookup {
    resource_type: "eero",
    list_command: "eeros list",
};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EeroRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Clients")]
    clients: u32,
}

impl EeroRow {
    fn new(e: &EeroDevice, color: bool) -> Self {
        let status = e.status.clone().unwrap_or_else(|| {
            (if e.connected { "connected" } else { "disconnected" }).into()
        });
        Self {
            id: e.id.to_string(),
            location: e.label().to_owned(),
            model: e.model.clone(),
            serial: e.serial.clone(),
            status: output::paint_status(&status, e.connected, color),
            gateway: (if e.is_gateway { "yes" } else { "" }).into(),
            clients: e.connected_clients_count,
        }
    }
}

fn detail(e: &EeroDevice) -> String {
    let mut lines = vec![
        format!("ID:        {}", e.id),
        format!("Location:  {}", e.label()),
        format!("Model:     {}", e.model),
        format!("Serial:    {}", e.serial),
        format!("MAC:       {}", e.mac_address),
        format!("IP:        {}", output::or_dash(e.ip_address.as_deref())),
        format!("Firmware:  {}", output::or_dash(e.os_version.as_deref())),
        format!("Connected: {}", e.connected),
        format!("Gateway:   {}", e.is_gateway),
        format!("Clients:   {}", e.connected_clients_count),
    ];
    if let Some(bars) = e.mesh_quality_bars {
        lines.push(format!("Mesh:      {bars}/5"));
    }
    lines.join("\n")
}

async fn resolve(
    client: &EeroClient,
    network: &ResourceId,
    identifier: &str,
) -> Result<EeroDevice, CliError> {
    let eeros = client.eeros(network).await?.to_vec()?;
    let mac = MacAddress::new(identifier);
    util::find_one(
        eeros,
        identifier,
        EEROS,
        |e| e.id.as_str(),
        |e, ident| {
            e.serial.eq_ignore_ascii_case(ident)
                || e.mac_address == mac
                || util::eq_opt(e.location.as_deref(), ident)
        },
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &EeroClient,
    args: EerosArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let network = client.resolve_network(None).await?;

    match args.command {
        EerosCommand::List => {
            let color = output::should_color(global.color_mode());
            let eeros = client.eeros(&network).await?.to_vec()?;
            let out = output::render_list(
                global.format(),
                &eeros,
                |e| EeroRow::new(e, color),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EerosCommand::Get { eero } => {
            let found = resolve(client, &network, &eero).await?;
            let node = client.eero(&network, &found.id).await?;
            let out = output::render_single(global.format(), &node, detail, |e| e.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EerosCommand::Reboot { eero } => {
            let node = resolve(client, &network, &eero).await?;
            let prompt = format!(
                "Reboot eero '{}'? Devices attached to it will drop off briefly.",
                node.label()
            );
            if !util::confirm("reboot", &prompt, global.yes)? {
                return Ok(());
            }
            client.reboot_eero(&network, &node.id).await?;
            output::notice(&format!("Reboot requested for {}", node.label()), global.quiet);
            Ok(())
        }
    }
}
