//! `linux-toolset`: a config-driven helper for routine GNU/Linux chores.
//!
//! # Overview
//!
//! Two jobs, both driven by one `config.json` (or `.toml`):
//!
//! - **backup**: snapshot a list of paths into one or more restic
//!   repositories, prune by age, list snapshots, then mirror repositories to
//!   other locations with rsync.
//! - **custom-command**: run a named, ordered list of shell commands.
//!
//! # Usage
//!
//! ```text
//! linux-toolset init                       # scaffold config.json here
//! linux-toolset backup                     # full run with ./config.json
//! linux-toolset backup -c ~/toolset.toml   # another config
//! linux-toolset backup --print-config      # show parsed config and plan
//! linux-toolset backup --no-prune --no-copy
//! linux-toolset custom-command update
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                 |
//! |--------------------------|------------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                  |
//! | [`config`]               | `Config` struct, loader, plan resolution       |
//! | [`excludes`]             | Exclude-template glob expansion                |
//! | [`error`]                | Failure taxonomy                               |
//! | [`process`]              | `ProcessRunner` seam and the real runner       |
//! | [`prompt`]               | `Prompter` seam and the terminal prompter      |
//! | [`secret`]               | Scoped repository password                     |
//! | [`runner`]               | restic/rsync/sh argument construction          |
//! | [`repository`]           | Probe, confirm, init                           |
//! | [`backup`]               | Snapshot, prune, list for one repository       |
//! | [`replication`]          | rsync mirror of one repository                 |
//! | [`orchestrator`]         | Whole backup run with per-unit isolation       |
//! | [`procedures`]           | Custom command procedures                      |
//! | [`ui`]                   | Log lines, spinner, stage output               |
//! | [`commands`]             | Subcommand handlers                            |

mod backup;
mod cli;
mod commands;
mod config;
mod error;
mod excludes;
mod orchestrator;
mod procedures;
mod process;
mod prompt;
mod replication;
mod repository;
mod runner;
mod secret;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Subcommand};

fn main() {
    if let Err(e) = run() {
        ui::error(format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    ui::set_verbose(cli.verbose);

    match &cli.command {
        Subcommand::Backup(args) => commands::backup::run(args),
        Subcommand::CustomCommand(args) => commands::custom::run(args),
        Subcommand::Init(args) => commands::init::run(&args.config),
    }
}
