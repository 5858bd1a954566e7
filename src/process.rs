//! Process execution seam.
//!
//! Every external tool call in the toolset is described by an [`Invocation`]
//! and handed to a [`ProcessRunner`].  The binary uses [`SystemRunner`], which
//! spawns real processes through [`crate::ui`]; tests use
//! [`testing::RecordingRunner`], which records the argv and fails on demand.

use crate::{secret::Secret, ui, ui::StageOutcome};

/// What to do with a child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture behind a spinner; replayed by the caller on failure.
    Captured,
    /// Discard everything.  Used for probes.
    Quiet,
    /// Share the parent's terminal.  Used for operator-defined commands.
    Inherit,
}

/// One external process call: argv, extra environment, output handling.
#[derive(Debug, Clone)]
pub struct Invocation<'s> {
    /// Stage label shown next to the spinner and in the ✓/✗ line.
    pub label: String,
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Environment entries set for this child only.
    pub env: Vec<(&'static str, &'s str)>,
    pub output: OutputMode,
}

impl<'s> Invocation<'s> {
    pub fn new(label: impl Into<String>, argv: Vec<String>) -> Self {
        Self {
            label: label.into(),
            argv,
            env: Vec::new(),
            output: OutputMode::Captured,
        }
    }

    /// Expose the repository password to this child only.
    pub fn with_secret(mut self, secret: &'s Secret) -> Self {
        self.env.push(secret.env_entry());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.output = OutputMode::Quiet;
        self
    }

    pub fn inherit(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }
}

/// Runs invocations, blocking until each child exits.
pub trait ProcessRunner {
    fn run(&mut self, invocation: &Invocation<'_>) -> StageOutcome;
}

/// Spawns real processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, inv: &Invocation<'_>) -> StageOutcome {
        ui::debug(format!("$ {}", inv.argv.join(" ")));
        match inv.output {
            OutputMode::Captured => ui::run_stage(&inv.label, &inv.argv, &inv.env),
            OutputMode::Quiet => ui::status_outcome(
                &inv.label,
                &inv.argv,
                ui::run_status(&inv.argv, &inv.env, true),
            ),
            OutputMode::Inherit => ui::status_outcome(
                &inv.label,
                &inv.argv,
                ui::run_status(&inv.argv, &inv.env, false),
            ),
        }
    }
}

// ─── Test doubles ─────────────────────────────────────────────────────────────
