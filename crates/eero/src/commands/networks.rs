//! Network command handlers.

use tabled::Tabled;

use eero_core::{EeroClient, Network, NetworkResource, NetworkStatus};

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand, ResourceKind};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, Lookup};

const NETWORKS: Lookup = Lookup {
    resource_type: "network",
    list_command: "networks list",
};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ISP")]
    isp: String,
    #[tabled(rename = "Public IP")]
    public_ip: String,
    #[tabled(rename = "Guest")]
    guest: String,
}

impl NetworkRow {
    fn new(n: &Network, color: bool) -> Self {
        Self {
            id: n.id.to_string(),
            name: n.name.clone(),
            status: output::paint_status(
                &n.status.to_string(),
                n.status == NetworkStatus::Online,
                color,
            ),
            isp: output::or_dash(n.isp_name.as_deref()),
            public_ip: output::or_dash(n.public_ip.as_deref()),
            guest: (if n.guest_network.enabled { "on" } else { "off" }).into(),
        }
    }
}

fn detail(n: &Network) -> String {
    let mut lines = vec![
        format!("ID:         {}", n.id),
        format!("Name:       {}", n.name),
        format!("Status:     {}", n.status),
        format!("ISP:        {}", output::or_dash(n.isp_name.as_deref())),
        format!("Public IP:  {}", output::or_dash(n.public_ip.as_deref())),
        format!("Gateway IP: {}", output::or_dash(n.gateway_ip.as_deref())),
        format!("WAN type:   {}", output::or_dash(n.wan_type.as_deref())),
        format!(
            "Guest:      {}{}",
            if n.guest_network.enabled { "enabled" } else { "disabled" },
            n.guest_network
                .name
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default()
        ),
    ];
    if let Some(ref speed) = n.speed {
        lines.push(format!(
            "Speed:      {} down / {} up",
            super::speedtest::mbps(speed.down_mbps),
            super::speedtest::mbps(speed.up_mbps)
        ));
    }
    if let Some(created) = n.created_at {
        lines.push(format!("Created:    {}", created.format("%Y-%m-%d")));
    }
    lines.join("\n")
}

impl From<ResourceKind> for NetworkResource {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Diagnostics => Self::Diagnostics,
            ResourceKind::Settings => Self::Settings,
            ResourceKind::Insights => Self::Insights,
            ResourceKind::Routing => Self::Routing,
            ResourceKind::Thread => Self::Thread,
            ResourceKind::Support => Self::Support,
            ResourceKind::Blacklist => Self::Blacklist,
            ResourceKind::Reservations => Self::Reservations,
            ResourceKind::Forwards => Self::Forwards,
            ResourceKind::Transfer => Self::Transfer,
            ResourceKind::BurstReporters => Self::BurstReporters,
            ResourceKind::AcCompat => Self::AcCompat,
            ResourceKind::Ouicheck => Self::Ouicheck,
            ResourceKind::Password => Self::Password,
            ResourceKind::Updates => Self::Updates,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &EeroClient,
    args: NetworksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());

    match args.command {
        NetworksCommand::List => {
            let networks = client.networks().await?.to_vec()?;
            let out = output::render_list(
                global.format(),
                &networks,
                |n| NetworkRow::new(n, color),
                |n| n.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Get { network } => {
            let id = client.resolve_network(network.as_deref()).await?;
            let net = client.network(&id).await?;
            let out = output::render_single(global.format(), &net, detail, |n| n.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Use { network } => {
            let networks = client.networks().await?.to_vec()?;
            let chosen = util::find_one(
                networks,
                &network,
                NETWORKS,
                |n| n.id.as_str(),
                |n, ident| n.name.eq_ignore_ascii_case(ident),
            )?;

            config::update_config(|cfg| cfg.default_network = Some(chosen.id.to_string()))?;
            output::notice(
                &format!("Default network set to {} ({})", chosen.name, chosen.id),
                global.quiet,
            );
            Ok(())
        }

        NetworksCommand::Reboot => {
            let id = client.resolve_network(None).await?;
            let net = client.network(&id).await?;
            let prompt = format!(
                "Reboot every eero on '{}'? The whole network will be offline for a few minutes.",
                net.name
            );
            if !util::confirm("reboot the network", &prompt, global.yes)? {
                return Ok(());
            }
            client.reboot_network(&id).await?;
            output::notice(&format!("Reboot requested for network {}", net.name), global.quiet);
            Ok(())
        }

        NetworksCommand::Diagnose => {
            let id = client.resolve_network(None).await?;
            let bar = util::spinner("Running diagnostics...", global.quiet);
            let report = client.run_diagnostics(&id).await;
            bar.finish_and_clear();
            let out = output::render_raw(global.format(), &*report?)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Inspect { resource, item } => {
            let id = client.resolve_network(None).await?;
            let data = client
                .network_resource(&id, resource.into(), item.as_deref())
                .await?;
            let out = output::render_raw(global.format(), &data)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
