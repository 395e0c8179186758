//! Login, logout and session status.

use serde::Serialize;

use eero_config::{Config, config_path};
use eero_core::{EeroClient, Error, SessionState};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// Wrong codes tolerated before the interactive login gives up.
const MAX_CODE_ATTEMPTS: u32 = 3;

const RESEND: &str = "r";

// ── Login ───────────────────────────────────────────────────────────

pub async fn login(client: &EeroClient, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if client.session_state() == SessionState::Authenticated {
        if !args.force {
            output::notice("Already logged in (use --force to start a new session)", global.quiet);
            return Ok(());
        }
        client.logout().await?;
    }

    let identifier = match args.identifier {
        Some(id) => id,
        None => util::prompt("Email or phone number")?,
    };
    let identifier = identifier.trim();

    let bar = util::spinner("Requesting verification code...", global.quiet);
    let started = client.start_login(identifier).await;
    bar.finish_and_clear();
    started?;

    if let Some(code) = args.code {
        client.verify(code.trim()).await?;
        output::notice("Logged in", global.quiet);
        return Ok(());
    }

    output::notice(
        &format!("Verification code sent to {identifier}. Enter `{RESEND}` to get a new one."),
        global.quiet,
    );
    verify_interactively(client, global).await
}

async fn verify_interactively(client: &EeroClient, global: &GlobalOpts) -> Result<(), CliError> {
    let mut failures = 0;
    while failures < MAX_CODE_ATTEMPTS {
        let input = util::prompt("Verification code")?;
        let input = input.trim();

        if input.eq_ignore_ascii_case(RESEND) {
            client.resend_code().await?;
            output::notice("A new code is on its way", global.quiet);
            continue;
        }

        match client.verify(input).await {
            Ok(_) => {
                output::notice("Logged in", global.quiet);
                return Ok(());
            }
            Err(Error::Verification { message }) => {
                failures += 1;
                let left = MAX_CODE_ATTEMPTS - failures;
                if left > 0 {
                    eprintln!("{message} ({left} attempt(s) left)");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(CliError::TooManyAttempts)
}

// ── Logout ──────────────────────────────────────────────────────────

pub async fn logout(client: &EeroClient, global: &GlobalOpts) -> Result<(), CliError> {
    let was = client.session_state();
    client.logout().await?;
    if was == SessionState::Unauthenticated {
        output::notice("Not logged in", global.quiet);
    } else {
        output::notice("Logged out", global.quiet);
    }
    Ok(())
}

pub async fn refresh_session(client: &EeroClient, global: &GlobalOpts) -> Result<(), CliError> {
    let bar = util::spinner("Refreshing session...", global.quiet);
    let result = client.refresh_session().await;
    bar.finish_and_clear();
    result?;
    output::notice("Session refreshed", global.quiet);
    Ok(())
}

// ── Status ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct StatusView {
    session: String,
    default_network: Option<String>,
    api_url: String,
    credential_store: String,
    session_file: Option<String>,
    config_file: String,
}

pub fn status(client: &EeroClient, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let state = client.session_state();
    let view = StatusView {
        session: state.to_string(),
        default_network: client.default_network().map(ToString::to_string),
        api_url: cfg.api_url.clone(),
        credential_store: cfg.credential_store.to_string(),
        session_file: (cfg.credential_store == eero_config::CredentialBackend::File)
            .then(|| cfg.session_path().display().to_string()),
        config_file: config_path().display().to_string(),
    };

    let color = output::should_color(global.color_mode());
    let out = output::render_single(
        global.format(),
        &view,
        |v| {
            let session = output::paint_status(
                &v.session,
                state == SessionState::Authenticated,
                color,
            );
            let mut lines = vec![
                format!("Session:      {session}"),
                format!("Network:      {}", output::or_dash(v.default_network.as_deref())),
                format!("API:          {}", v.api_url),
                format!("Credentials:  {}", v.credential_store),
            ];
            if let Some(ref path) = v.session_file {
                lines.push(format!("Session file: {path}"));
            }
            lines.push(format!("Config file:  {}", v.config_file));
            lines.join("\n")
        },
        |v| v.session.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
