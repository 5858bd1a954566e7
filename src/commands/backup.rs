//! `linux-toolset backup`.
//!
//! Loads and resolves the config, writes the include/exclude lists into a
//! fresh temporary directory, logs what is about to happen, then hands over
//! to the [`Orchestrator`].  The temporary directory is removed when this
//! function returns, whichever way it returns.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};

use crate::{
    backup::BackupOptions,
    cli::BackupArgs,
    config::{self, BackupPlan},
    orchestrator::{BackupReport, BackupRequest, Orchestrator},
    process::{ProcessRunner, SystemRunner},
    prompt::{Prompter, TerminalPrompter},
    secret::SecretSource,
    ui,
};

const INCLUDE_FILE: &str = "i.txt";
const EXCLUDE_FILE: &str = "e.txt";

/// Entry point used by `main`.
pub fn run(args: &BackupArgs) -> Result<()> {
    ui::info("Running backup...");
    let (cfg, plan) = config::load_backup_plan(&args.config.config)?;

    if args.print_config {
        println!("{cfg:#?}");
        println!("{plan:#?}");
        return Ok(());
    }

    let report = execute(args, &plan, &mut SystemRunner, &mut TerminalPrompter)?;
    report.print_summary();

    ui::info("Done!");

    let failed = report.failure_count();
    if failed > 0 {
        let total = report.all().count();
        bail!("backup finished with {failed} of {total} units failed");
    }
    Ok(())
}

/// Run a resolved plan with the given capabilities.
pub fn execute(
    args: &BackupArgs,
    plan: &BackupPlan,
    runner: &mut dyn ProcessRunner,
    prompter: &mut dyn Prompter,
) -> Result<BackupReport> {
    let workdir = tempfile::Builder::new()
        .prefix("linux-toolset-")
        .tempdir()
        .context("creating temporary directory for include/exclude lists")?;
    let include_file = workdir.path().join(INCLUDE_FILE);
    let exclude_file = workdir.path().join(EXCLUDE_FILE);
    write_list(&include_file, &plan.includes)?;
    write_list(&exclude_file, &plan.excludes)?;

    let copies = if args.no_copy {
        Vec::new()
    } else {
        plan.replication.units()
    };

    ui::info_list("Include paths:", plan.includes.iter().map(String::as_str));
    ui::info_list("Exclude paths:", plan.excludes.iter().map(String::as_str));
    ui::info_list(
        "Local repository targets:",
        plan.repositories.iter().map(String::as_str),
    );
    let pairs: Vec<String> = copies
        .iter()
        .map(|u| format!("{} → {}", u.source, u.destination))
        .collect();
    ui::info_list("Copy repository targets:", pairs.iter().map(String::as_str));

    let request = BackupRequest {
        repositories: &plan.repositories,
        include_file: &include_file,
        exclude_file: &exclude_file,
        copies: &copies,
        secret: args
            .password_file
            .clone()
            .map_or(SecretSource::Prompt, SecretSource::File),
        options: BackupOptions {
            prune: !args.no_prune,
        },
    };
    let report = Orchestrator::new(runner, prompter).backup_all(&request)?;
    Ok(report)
}

/// One path per line.
fn write_list(path: &Path, lines: &[String]) -> Result<()> {
    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}
