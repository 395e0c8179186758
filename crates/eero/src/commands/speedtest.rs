//! Speed test command handler.

use eero_core::{EeroClient, SpeedTest};

use crate::cli::{GlobalOpts, SpeedtestArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub(crate) fn mbps(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.1} Mbps"))
}

fn detail(s: &SpeedTest) -> String {
    let mut lines = vec![
        format!("Download: {}", mbps(s.down_mbps)),
        format!("Upload:   {}", mbps(s.up_mbps)),
    ];
    if let Some(at) = s.tested_at {
        lines.push(format!("Tested:   {}", at.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.join("\n")
}

pub async fn handle(
    client: &EeroClient,
    args: SpeedtestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let network = client.resolve_network(None).await?;

    if args.last {
        let Some(speed) = client.network(&network).await?.speed else {
            output::notice("No speed test result recorded yet", global.quiet);
            return Ok(());
        };
        return show(&speed, global);
    }

    let bar = util::spinner("Running speed test...", global.quiet);
    let result = client.run_speed_test(&network).await;
    bar.finish_and_clear();

    match result? {
        Some(speed) => show(&speed, global),
        None => {
            output::notice(
                "Speed test started. Results take about a minute: eero speedtest --last",
                global.quiet,
            );
            Ok(())
        }
    }
}

fn show(speed: &SpeedTest, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.format(), speed, detail, |s| {
        format!("{} {}", mbps(s.down_mbps), mbps(s.up_mbps))
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
