//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and the
//! subcommand arguments are passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::{Args, Parser};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config.json";

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "linux-toolset",
    about   = "A toolset for GNU/Linux",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Show debug output, including every command line that is run.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Subcommand,
}

/// Explicit subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Run the backup routine.
    ///
    /// Backs up the configured includes to every restic repository in order,
    /// then copies repositories to their destinations with rsync.
    Backup(BackupArgs),

    /// Run custom command.
    ///
    /// Executes the named procedure from `custom-commands`, one shell command
    /// at a time.
    CustomCommand(CustomArgs),

    /// Scaffold a starter config file.
    ///
    /// Exits with an error if the file already exists to avoid accidental
    /// overwrites.
    Init(ConfigArg),
}

/// `-c/--config`, shared by every subcommand.
#[derive(Args, Debug)]
pub struct ConfigArg {
    /// Path to config file (JSON, or TOML when it ends in `.toml`).
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackupArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Print the parsed configuration and the resolved plan, then exit.
    ///
    /// Handy for checking exclude templates and copy destinations before
    /// committing to a long backup run.
    #[arg(long)]
    pub print_config: bool,

    /// Skip the `forget --prune` retention step.
    ///
    /// All snapshots are kept; no disk space is reclaimed.
    #[arg(long)]
    pub no_prune: bool,

    /// Skip copying repositories to their destinations.
    #[arg(long)]
    pub no_copy: bool,

    /// Read the repository password from the first line of this file instead
    /// of prompting.  Meant for unattended runs.
    #[arg(long, value_name = "FILE")]
    pub password_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CustomArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Name of the procedure under `custom-commands`.
    pub procedure: String,
}
