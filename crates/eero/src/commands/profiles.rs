//! Profile command handlers.

use tabled::Tabled;

use eero_core::{ContentFilter, DomainList, EeroClient, Profile, ResourceId};

use crate::cli::{FilterCategory, GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, Lookup};

const PROFILES: Lookup = Lookup {
    resource_type: "profile",
    list_command: "profiles list",
};

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Devices")]
    devices: usize,
}

impl ProfileRow {
    fn new(p: &Profile, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            state: output::paint_status(state(p), !p.paused, color),
            devices: p.device_count(),
        }
    }
}

fn state(p: &Profile) -> &'static str {
    if p.paused { "paused" } else { "active" }
}

fn detail(p: &Profile) -> String {
    let mut lines = vec![
        format!("ID:      {}", p.id),
        format!("Name:    {}", p.name),
        format!("State:   {}", state(p)),
        format!("Devices: {}", p.device_count()),
    ];
    for id in &p.device_ids {
        lines.push(format!("  - {id}"));
    }
    lines.join("\n")
}

async fn resolve(
    client: &EeroClient,
    network: &ResourceId,
    identifier: &str,
) -> Result<Profile, CliError> {
    let profiles = client.profiles(network).await?.to_vec()?;
    util::find_one(
        profiles,
        identifier,
        PROFILES,
        |p| p.id.as_str(),
        |p, ident| p.name.eq_ignore_ascii_case(ident),
    )
}

impl From<FilterCategory> for ContentFilter {
    fn from(category: FilterCategory) -> Self {
        match category {
            FilterCategory::Adblock => Self::Adblock,
            FilterCategory::AdblockPlus => Self::AdblockPlus,
            FilterCategory::SafeSearch => Self::SafeSearch,
            FilterCategory::BlockMalware => Self::BlockMalware,
            FilterCategory::BlockIllegal => Self::BlockIllegal,
            FilterCategory::BlockViolent => Self::BlockViolent,
            FilterCategory::BlockAdult => Self::BlockAdult,
            FilterCategory::YoutubeRestricted => Self::YoutubeRestricted,
        }
    }
}

/// Merge `--enable` and `--disable` into one change set. A category may
/// appear in only one of them, and at least one must be given.
fn filter_changes(
    enable: &[FilterCategory],
    disable: &[FilterCategory],
) -> Result<Vec<(ContentFilter, bool)>, CliError> {
    if enable.is_empty() && disable.is_empty() {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: "pass --enable or --disable with at least one category".into(),
        });
    }
    if let Some(both) = enable.iter().find(|c| disable.contains(c)) {
        return Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("{} is both enabled and disabled", ContentFilter::from(*both)),
        });
    }
    Ok(enable
        .iter()
        .map(|c| (ContentFilter::from(*c), true))
        .chain(disable.iter().map(|c| (ContentFilter::from(*c), false)))
        .collect())
}

/// Trimmed, non-empty domains. An empty result clears the list.
fn clean_domains(domains: Vec<String>) -> Vec<String> {
    domains
        .into_iter()
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

pub async fn handle(
    client: &EeroClient,
    args: ProfilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let network = client.resolve_network(None).await?;

    match args.command {
        ProfilesCommand::List => {
            let color = output::should_color(global.color_mode());
            let profiles = client.profiles(&network).await?.to_vec()?;
            let out = output::render_list(
                global.format(),
                &profiles,
                |p| ProfileRow::new(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Get { profile } => {
            let found = resolve(client, &network, &profile).await?;
            let p = client.profile(&network, &found.id).await?;
            let out = output::render_single(global.format(), &p, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Pause { profile } => {
            let p = resolve(client, &network, &profile).await?;
            client.pause_profile(&network, &p.id, true).await?;
            output::notice(&format!("Paused profile {}", p.name), global.quiet);
            Ok(())
        }

        ProfilesCommand::Resume { profile } => {
            let p = resolve(client, &network, &profile).await?;
            client.pause_profile(&network, &p.id, false).await?;
            output::notice(&format!("Resumed profile {}", p.name), global.quiet);
            Ok(())
        }

        ProfilesCommand::Filter {
            profile,
            enable,
            disable,
        } => {
            let changes = filter_changes(&enable, &disable)?;
            let p = resolve(client, &network, &profile).await?;
            client.set_content_filter(&network, &p.id, &changes).await?;
            output::notice(&format!("Updated content filter for {}", p.name), global.quiet);
            Ok(())
        }

        ProfilesCommand::BlockList { profile, domains } => {
            set_domains(client, &network, &profile, DomainList::Block, domains, global).await
        }

        ProfilesCommand::AllowList { profile, domains } => {
            set_domains(client, &network, &profile, DomainList::Allow, domains, global).await
        }
    }
}

async fn set_domains(
    client: &EeroClient,
    network: &ResourceId,
    profile: &str,
    list: DomainList,
    domains: Vec<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let domains = clean_domains(domains);
    let p = resolve(client, network, profile).await?;
    client.set_domain_list(network, &p.id, list, &domains).await?;
    output::notice(
        &format!("Set {list} list for {} ({} domains)", p.name, domains.len()),
        global.quiet,
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_changes_merge_enable_and_disable() {
        let changes = filter_changes(
            &[FilterCategory::SafeSearch],
            &[FilterCategory::Adblock, FilterCategory::BlockAdult],
        )
        .unwrap();
        assert_eq!(
            changes,
            vec![
                (ContentFilter::SafeSearch, true),
                (ContentFilter::Adblock, false),
                (ContentFilter::BlockAdult, false),
            ]
        );
    }

    #[test]
    fn filter_changes_reject_empty_and_conflicting() {
        assert!(matches!(
            filter_changes(&[], &[]),
            Err(CliError::Validation { .. })
        ));
        let err = filter_changes(&[FilterCategory::Adblock], &[FilterCategory::Adblock]).unwrap_err();
        assert!(err.to_string().contains("adblock"), "got: {err}");
    }

    #[test]
    fn domains_are_normalized() {
        let cleaned = clean_domains(vec![" Ads.Example ".into(), String::new(), "x.test".into()]);
        assert_eq!(cleaned, vec!["ads.example", "x.test"]);
    }
}
