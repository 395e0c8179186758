//! Clap derive structures for the `eero` CLI.
//!
//! Only clap and clap_complete may be used here: build.rs includes this file
//! to render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "eero",
    version,
    about = "Manage eero home networks from the command line",
    long_about = "Manage eero home networks from the command line.\n\n\
        Talks to the eero cloud service: log in with your email or phone\n\
        number, then inspect networks, eero nodes, connected devices and\n\
        profiles, or change them.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Network ID to act on (defaults to the configured network)
    #[arg(long, short = 'n', env = "EERO_NETWORK", global = true)]
    pub network: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "EERO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Where the session token is kept (overrides config)
    #[arg(long, value_enum, global = true)]
    pub credential_store: Option<CredentialStoreKind>,

    /// Bypass the response cache for this invocation
    #[arg(long, global = true)]
    pub refresh: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

// ── Value enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CredentialStoreKind {
    /// JSON session file in the data directory
    File,
    /// OS keyring
    Keyring,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with a verification code sent by email or SMS
    Login(LoginArgs),

    /// End the session and forget the stored token
    Logout,

    /// Show session state and active settings
    Status,

    /// Exchange the session token for a fresh one
    RefreshSession,

    /// Show account details
    Account,

    /// List and select networks
    #[command(alias = "net")]
    Networks(NetworksArgs),

    /// Inspect and reboot eero nodes
    #[command(alias = "nodes")]
    Eeros(EerosArgs),

    /// Manage connected client devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage profiles (groups of devices that can be paused)
    #[command(alias = "p")]
    Profiles(ProfilesArgs),

    /// Configure the guest network
    Guest(GuestArgs),

    /// Run a speed test or show the latest result
    #[command(alias = "speed")]
    Speedtest(SpeedtestArgs),

    /// Inspect and change CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email address or phone number (prompted when omitted)
    pub identifier: Option<String>,

    /// Verification code (skips the interactive prompt)
    #[arg(long)]
    pub code: Option<String>,

    /// Start a new login even when a session already exists
    #[arg(long)]
    pub force: bool,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List networks on the account
    #[command(alias = "ls")]
    List,

    /// Show one network (defaults to the active network)
    Get {
        /// Network ID
        network: Option<String>,
    },

    /// Make a network the default for future commands
    Use {
        /// Network ID or name
        network: String,
    },

    /// Reboot every eero on the network
    Reboot,

    /// Run network diagnostics
    Diagnose,

    /// Show a network sub-resource as returned by the service
    Inspect {
        /// Resource to read
        #[arg(value_enum)]
        resource: ResourceKind,

        /// Item ID within the resource (an insight, a burst reporter, or a
        /// device for transfer stats)
        item: Option<String>,
    },
}

/// Per-network resources readable with `networks inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Diagnostics,
    Settings,
    Insights,
    Routing,
    Thread,
    Support,
    Blacklist,
    Reservations,
    Forwards,
    Transfer,
    BurstReporters,
    AcCompat,
    Ouicheck,
    Password,
    Updates,
}

// ── Eeros ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EerosArgs {
    #[command(subcommand)]
    pub command: EerosCommand,
}

#[derive(Debug, Subcommand)]
pub enum EerosCommand {
    /// List eero nodes on the network
    #[command(alias = "ls")]
    List,

    /// Show one eero node
    Get {
        /// Eero ID, serial or location
        eero: String,
    },

    /// Reboot an eero node
    Reboot {
        /// Eero ID, serial or location
        eero: String,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List client devices
    #[command(alias = "ls")]
    List {
        /// Only show connected devices
        #[arg(long)]
        connected: bool,

        /// Only show blocked devices
        #[arg(long)]
        blocked: bool,
    },

    /// Show one client device
    Get {
        /// Device ID, MAC address or name
        device: String,
    },

    /// Block a device from the network
    Block {
        /// Device ID, MAC address or name
        device: String,
    },

    /// Allow a blocked device back on the network
    Unblock {
        /// Device ID, MAC address or name
        device: String,
    },

    /// Set a device's nickname
    Rename {
        /// Device ID, MAC address or name
        device: String,

        /// New nickname
        name: String,
    },
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List profiles
    #[command(alias = "ls")]
    List,

    /// Show one profile
    Get {
        /// Profile ID or name
        profile: String,
    },

    /// Pause internet access for a profile
    Pause {
        /// Profile ID or name
        profile: String,
    },

    /// Resume internet access for a profile
    Resume {
        /// Profile ID or name
        profile: String,
    },

    /// Turn content filter categories on or off
    Filter {
        /// Profile ID or name
        profile: String,

        /// Categories to turn on
        #[arg(long, value_enum, value_delimiter = ',')]
        enable: Vec<FilterCategory>,

        /// Categories to turn off
        #[arg(long, value_enum, value_delimiter = ',')]
        disable: Vec<FilterCategory>,
    },

    /// Replace the profile's custom block list (no domains clears it)
    BlockList {
        /// Profile ID or name
        profile: String,

        /// Domains to block
        domains: Vec<String>,
    },

    /// Replace the profile's custom allow list (no domains clears it)
    AllowList {
        /// Profile ID or name
        profile: String,

        /// Domains to allow
        domains: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterCategory {
    Adblock,
    AdblockPlus,
    SafeSearch,
    BlockMalware,
    BlockIllegal,
    BlockViolent,
    BlockAdult,
    YoutubeRestricted,
}

// ── Guest network ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GuestArgs {
    #[command(subcommand)]
    pub command: GuestCommand,
}

#[derive(Debug, Subcommand)]
pub enum GuestCommand {
    /// Show guest network settings
    Show,

    /// Enable the guest network
    Enable {
        /// Guest network name (SSID)
        #[arg(long)]
        name: Option<String>,

        /// Guest network password
        #[arg(long)]
        password: Option<String>,
    },

    /// Disable the guest network
    Disable,
}

// ── Speed test ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SpeedtestArgs {
    /// Show the most recent result instead of starting a test
    #[arg(long)]
    pub last: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Store the default network ID without contacting the service
    SetNetwork {
        /// Network ID
        network: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
