//! One backup cycle against one repository.
//!
//! | # | Step     | restic subcommand                                        |
//! |---|----------|----------------------------------------------------------|
//! | 1 | Snapshot | `backup --files-from … --iexclude-file … --tag main`     |
//! | 2 | Prune    | `forget --keep-within-daily 7d --keep-within-weekly 1m`  |
//! | 3 | List     | `snapshots` (output printed)                             |
//!
//! Each step must succeed before the next one runs.  The first failure is
//! returned as [`ToolsetError::BackupStepFailed`] and the remaining steps are
//! skipped for this repository only.

use std::path::Path;

use crate::{
    error::{BackupStep, ToolsetError},
    process::{Invocation, ProcessRunner},
    runner::{backup_args, forget_args, snapshots_args},
    secret::Secret,
    ui,
};

/// Per-run switches for the backup cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    /// Run the retention step.  Off with `--no-prune`.
    pub prune: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self { prune: true }
    }
}

/// Snapshot, prune and list `target`.
pub fn run(
    runner: &mut dyn ProcessRunner,
    target: &str,
    include_file: &Path,
    exclude_file: &Path,
    secret: &Secret,
    options: BackupOptions,
) -> Result<(), ToolsetError> {
    ui::info(format!("Backup to local repository: {target}"));
    step(
        runner,
        target,
        BackupStep::Snapshot,
        backup_args(target, include_file, exclude_file),
        secret,
    )?;

    if options.prune {
        ui::info(format!("Prune old snapshots: {target}"));
        step(runner, target, BackupStep::Prune, forget_args(target), secret)?;
    } else {
        ui::info(format!("Skipping prune for {target} (--no-prune)"));
    }

    ui::info(format!("Snapshots for {target}:"));
    let listing = step(runner, target, BackupStep::List, snapshots_args(target), secret)?;
    listing.print_stdout();
    Ok(())
}

fn step(
    runner: &mut dyn ProcessRunner,
    target: &str,
    which: BackupStep,
    argv: Vec<String>,
    secret: &Secret,
) -> Result<ui::StageOutcome, ToolsetError> {
    let label = format!("{} {target}", capitalized(which));
    let outcome = runner.run(&Invocation::new(label, argv).with_secret(secret));
    outcome.print();
    if outcome.failed() {
        return Err(ToolsetError::BackupStepFailed {
            target: target.to_string(),
            step: which,
            detail: outcome.detail(),
        });
    }
    Ok(outcome)
}

fn capitalized(step: BackupStep) -> &'static str {
    match step {
        BackupStep::Snapshot => "Snapshot",
        BackupStep::Prune => "Prune",
        BackupStep::List => "List",
    }
}
