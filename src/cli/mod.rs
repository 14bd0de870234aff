//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::store::Role;

/// Theme CLI - manage light/dark color themes for recovery-house dashboards.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "rtheme", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "RTHEME_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Config file (default: ~/.config/rtheme/config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Act as this signed-in user (overrides RTHEME_USER)
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    /// Theme database path (overrides RTHEME_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Themes ===
    /// List the themes visible to the current user
    #[command(visible_alias = "ls")]
    List,

    /// Show one theme's palettes
    Show(ShowArgs),

    /// Create a theme seeded from the default palette
    New(NewArgs),

    /// Change one color of a saved theme
    SetColor(SetColorArgs),

    /// Delete a saved theme
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Copy a theme into another user's themes
    Share(ShareArgs),

    // === Active theme ===
    /// Make a theme the active one
    Use(UseArgs),

    /// Flip between light and dark mode
    ToggleDark,

    /// Show the active theme and mode
    Active,

    /// Set a theme as active for every member of your organization
    ApplyOrg(ApplyOrgArgs),

    // === Import / export ===
    /// Write a theme as JSON
    Export(ExportArgs),

    /// Read a theme exported as JSON
    Import(ImportArgs),

    // === Rendering ===
    /// Print the active theme as CSS custom properties
    Css(ModeArgs),

    /// Print the active theme for native clients
    Native(ModeArgs),

    /// List the editor color categories with the active colors
    Categories(ModeArgs),

    /// Describe the phone preview drawn with the active colors
    Preview(ModeArgs),

    // === Administration ===
    /// Manage organization membership
    #[command(subcommand)]
    Member(MemberCommands),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Theme id, or "default" for the built-in theme
    pub id: String,

    /// Show only the dark palette
    #[arg(long)]
    pub dark: bool,
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Display name
    pub name: String,

    /// Share with your organization (owners only)
    #[arg(long)]
    pub organization: bool,
}

#[derive(Parser, Debug)]
pub struct SetColorArgs {
    /// Theme id
    pub id: String,

    /// Color slot, e.g. primary or backgroundSecondary
    pub key: String,

    /// Color value: #rgb, #rrggbb, rgb(...) or rgba(...)
    pub value: String,

    /// Edit the dark palette instead of the light one
    #[arg(long)]
    pub dark: bool,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Theme id
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct ShareArgs {
    /// Theme id
    pub id: String,

    /// Recipient user id
    pub user: String,
}

#[derive(Parser, Debug)]
pub struct UseArgs {
    /// Theme id, or "default" for the built-in theme
    pub id: String,

    /// Use dark mode
    #[arg(long)]
    pub dark: bool,
}

#[derive(Parser, Debug)]
pub struct ApplyOrgArgs {
    /// Theme id
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Theme id, or "default" for the built-in theme
    pub id: String,

    /// Output file or directory (stdout if omitted)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Exported theme file
    pub file: PathBuf,

    /// Save the imported theme as a new theme
    #[arg(long)]
    pub save: bool,
}

#[derive(Parser, Debug)]
pub struct ModeArgs {
    /// Use the dark variant regardless of the active mode
    #[arg(long)]
    pub dark: bool,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Add a user to an organization
    Add(MemberAddArgs),
}

#[derive(Parser, Debug)]
pub struct MemberAddArgs {
    /// Organization id
    pub organization: String,

    /// User id
    pub user: String,

    /// Role: owner, admin or member
    pub role: Role,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
