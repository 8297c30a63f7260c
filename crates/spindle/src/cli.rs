//! Clap derive structures for the `spindle` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// spindle -- storage-array console for a Spindle NAS appliance
#[derive(Debug, Parser)]
#[command(
    name = "spindle",
    version,
    about = "Manage storage arrays on a Spindle NAS appliance",
    long_about = "A console for administering the redundant storage arrays of a\n\
        Spindle NAS appliance: status, rebuilds, spares, caches, and disk\n\
        formatting, all driven through the appliance's management API.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "SPINDLE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance URL (overrides profile)
    #[arg(long, short = 'a', env = "SPINDLE_APPLIANCE", global = true)]
    pub appliance: Option<String>,

    /// API token for the management service
    #[arg(long, env = "SPINDLE_API_TOKEN", global = true, hide_env = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SPINDLE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SPINDLE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SPINDLE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show array status (all arrays, or one in detail)
    #[command(alias = "st")]
    Status(StatusArgs),

    /// List physical disks and their eligibility
    Disks,

    /// Array operations (rebuild, spares, bitmap, lifecycle)
    #[command(alias = "arr")]
    Array(ArrayArgs),

    /// Disk operations
    Disk(DiskArgs),

    /// Fetch fresh state from the appliance now
    Refresh,

    /// Live view: poll continuously and render on every change
    Watch,

    /// Configuration inspection
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Array name for a detail view
    pub array: Option<String>,
}

// ── Array commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ArrayArgs {
    #[command(subcommand)]
    pub command: ArrayCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArrayCommand {
    /// Start rebuilding onto a failed member device
    Rebuild {
        /// Array name
        array: String,
        /// Member device to rebuild onto
        device: String,
    },

    /// Mark a member device failed
    Fail {
        /// Array name
        array: String,
        /// Member device (omit to let the appliance pick the faulty one)
        device: Option<String>,
    },

    /// Acknowledge a completed rebuild and return the array to service
    Finalize {
        /// Array name
        array: String,
    },

    /// Toggle the dirty-region bitmap
    Bitmap {
        /// Array name
        array: String,
    },

    /// Trigger a consistency scrub
    Scrub {
        /// Array name
        array: String,
    },

    /// Add a standby spare device
    SpareAdd {
        /// Array name
        array: String,
        /// Disk to add as spare
        device: String,
    },

    /// Remove a standby spare device
    SpareRemove {
        /// Array name
        array: String,
        /// Spare device to remove
        device: String,
    },

    /// Set or clear write-mostly on a member device
    WriteMostly {
        /// Array name
        array: String,
        /// Member device
        device: String,
        /// Clear instead of set
        #[arg(long)]
        off: bool,
    },

    /// Set the global background sync speed limits (kB/s)
    Speed {
        /// Minimum speed
        #[arg(long)]
        min: Option<u64>,
        /// Maximum speed
        #[arg(long)]
        max: Option<u64>,
    },

    /// Delete an array (prompts for confirmation)
    Delete {
        /// Array name
        array: String,
        /// Delete even if the appliance considers it unsafe
        #[arg(long)]
        force: bool,
    },

    /// Create a new array
    Create {
        /// Disks to build the array from
        #[arg(long, num_args = 1.., required = true)]
        disks: Vec<String>,
        /// Redundancy level (e.g. raid1, raid5)
        #[arg(long)]
        level: String,
    },

    /// Attach an SSD acceleration cache to an array
    CacheCreate {
        /// Array name
        array: String,
        /// SSDs to build the cache from
        #[arg(long, num_args = 1.., required = true)]
        disks: Vec<String>,
    },
}

// ── Disk commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiskArgs {
    #[command(subcommand)]
    pub command: DiskCommand,
}

#[derive(Debug, Subcommand)]
pub enum DiskCommand {
    /// Format a free disk
    Format {
        /// Disk name
        disk: String,
        /// Filesystem to create (e.g. ext4, btrfs)
        #[arg(long)]
        filesystem: String,
        /// Volume label
        #[arg(long)]
        label: Option<String>,
    },
}

// ── Config & completions ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
