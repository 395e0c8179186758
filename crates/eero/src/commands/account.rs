//! Account details.

use eero_core::EeroClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn show(client: &EeroClient, global: &GlobalOpts) -> Result<(), CliError> {
    let account = client.account().await?;
    let out = output::render_raw(global.format(), &account)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
