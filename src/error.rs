//! Error taxonomy.
//!
//! Two kinds of failure exist and the distinction matters more than the
//! individual variants:
//!
//! - **Fatal** errors (`ConfigMissing`, `ConfigInvalid`, `PreconditionFailed`, `SecretUnavailable`)
//!   abort the whole command before any unit of work starts.  `UnknownProcedure` also stops before
//!   anything runs, but `custom-command` only logs it and exits normally.
//! - **Per-unit** errors (`RepoUnavailable`, `BackupStepFailed`, `ReplicationFailed`,
//!   `CommandStepFailed`) are caught where the unit runs, logged with their context and recorded in
//!   a report.  Sibling units keep running.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Every failure the toolset knows how to describe.
#[derive(Debug, Error)]
pub enum ToolsetError {
    #[error("config file does not exist: '{}'", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid config '{}': {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("could not read the repository password: {0}")]
    SecretUnavailable(String),

    #[error("repository '{target}' unavailable: {reason}")]
    RepoUnavailable { target: String, reason: Unavailable },

    #[error("{step} step failed for repository '{target}': {detail}")]
    BackupStepFailed {
        target: String,
        step: BackupStep,
        detail: String,
    },

    #[error("could not copy '{origin}' to '{destination}': {detail}")]
    ReplicationFailed {
        origin: String,
        destination: String,
        detail: String,
    },

    #[error("no procedure called '{name}' (available: {available})")]
    UnknownProcedure { name: String, available: String },

    #[error("command '{command}' failed: {detail}")]
    CommandStepFailed { command: String, detail: String },
}

impl ToolsetError {
    /// `true` when the operator chose to skip a repository rather than it
    /// failing on its own.
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            Self::RepoUnavailable {
                reason: Unavailable::Declined,
                ..
            }
        )
    }
}

/// Why a repository could not be made ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The operator answered "no" to the init prompt.
    Declined,
    /// The confirmation prompt itself could not be shown or read.
    PromptFailed(String),
    /// `restic init` exited non-zero or could not be spawned.
    InitFailed(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined => f.write_str("initialization declined by operator"),
            Self::PromptFailed(e) => write!(f, "could not ask for confirmation: {e}"),
            Self::InitFailed(e) => write!(f, "initialization failed: {e}"),
        }
    }
}

/// The three restic steps of one backup cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStep {
    Snapshot,
    Prune,
    List,
}

impl fmt::Display for BackupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Prune => "prune",
            Self::List => "list",
        })
    }
}
