//! Backup orchestration across every repository and copy destination.
//!
//! # Phases
//!
//! 1. **Preconditions**: at least one repository, include and exclude list files exist.  Nothing
//!    is prompted or spawned if any of these fail.
//! 2. **Repositories** (inside the secret scope): for each repository in order, make it ready and
//!    run the backup cycle.
//! 3. **Copies** (secret already cleared): for each replication unit in order, run rsync.
//!
//! A failure in one repository or one copy is logged and recorded; the next
//! one still runs.

use std::path::Path;

use crate::{
    backup::{self, BackupOptions},
    config::ReplicationUnit,
    error::ToolsetError,
    process::ProcessRunner,
    prompt::Prompter,
    replication, repository,
    secret::{self, SecretSource},
    ui,
};

/// Result of one unit of work: a repository or a copy.
#[derive(Debug)]
pub struct UnitOutcome {
    pub label: String,
    pub error: Option<ToolsetError>,
}

impl UnitOutcome {
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything that happened during one orchestrated run.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub repositories: Vec<UnitOutcome>,
    pub copies: Vec<UnitOutcome>,
}

impl BackupReport {
    pub fn all(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.repositories.iter().chain(&self.copies)
    }

    pub fn failure_count(&self) -> usize {
        self.all().filter(|u| !u.succeeded()).count()
    }

    pub fn print_summary(&self) {
        ui::print_summary(self.all().map(|u| (u.label.as_str(), u.succeeded())));
    }
}

/// Inputs of one backup run.
#[derive(Debug)]
pub struct BackupRequest<'a> {
    pub repositories: &'a [String],
    pub include_file: &'a Path,
    pub exclude_file: &'a Path,
    pub copies: &'a [ReplicationUnit],
    pub secret: SecretSource,
    pub options: BackupOptions,
}

/// Drives a backup run with injected process and prompt capabilities.
pub struct Orchestrator<'a> {
    runner: &'a mut dyn ProcessRunner,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(runner: &'a mut dyn ProcessRunner, prompter: &'a mut dyn Prompter) -> Self {
        Self { runner, prompter }
    }

    /// Run every repository, then every copy.
    ///
    /// Returns `Err` only for run-level failures (preconditions, secret);
    /// per-unit failures are in the returned report.
    pub fn backup_all(&mut self, req: &BackupRequest<'_>) -> Result<BackupReport, ToolsetError> {
        check_preconditions(req)?;

        let runner = &mut *self.runner;
        let repositories = secret::with_secret(&req.secret, self.prompter, |secret, prompter| {
            req.repositories
                .iter()
                .map(|repo| {
                    let result = repository::ensure_ready(runner, prompter, repo, secret)
                        .and_then(|_| {
                            backup::run(
                                runner,
                                repo,
                                req.include_file,
                                req.exclude_file,
                                secret,
                                req.options,
                            )
                        });
                    unit_outcome(format!("Backup {repo}"), result)
                })
                .collect::<Vec<_>>()
        })?;

        let copies = req
            .copies
            .iter()
            .map(|unit| {
                let result = replication::replicate(self.runner, unit);
                unit_outcome(
                    format!("Copy {} → {}", unit.source, unit.destination),
                    result,
                )
            })
            .collect();

        Ok(BackupReport {
            repositories,
            copies,
        })
    }
}

fn check_preconditions(req: &BackupRequest<'_>) -> Result<(), ToolsetError> {
    if req.repositories.is_empty() {
        return Err(ToolsetError::PreconditionFailed("No repo for backup".into()));
    }
    for file in [req.include_file, req.exclude_file] {
        if !file.exists() {
            return Err(ToolsetError::PreconditionFailed(format!(
                "File does not exist '{}'",
                file.display()
            )));
        }
    }
    Ok(())
}

/// Log a per-unit result and turn it into an outcome.  Declined repositories
/// are warnings, everything else is an error.
fn unit_outcome(label: String, result: Result<(), ToolsetError>) -> UnitOutcome {
    match result {
        Ok(()) => UnitOutcome { label, error: None },
        Err(e) => {
            if e.is_declined() {
                ui::warn(format!("Skipping: {e}"));
            } else {
                ui::error(format!("{label}: {e}"));
            }
            UnitOutcome {
                label,
                error: Some(e),
            }
        },
    }
}
