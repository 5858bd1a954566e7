//! Terminal UI: log lines, spinners, stage banners and captured command output.
//!
//! Log lines go to stderr with a colored level tag.  `[DEBUG]` lines (the argv
//! of every command) only show up with `--verbose`.
//!
//! Long tool steps run behind a spinner with their output captured.  A stage
//! that fails gets its captured stdout and stderr replayed under the ✗ line,
//! so nothing needs to be re-run by hand to see what went wrong.
//!
//! ```no_run
//! use crate::ui::{self, run_stage};
//!
//! ui::info("Backup to local repository: /mnt/restic");
//! let outcome = run_stage("Snapshot /mnt/restic", &argv, &[]);
//! outcome.print();
//! ```

use std::{
    process::{Command, Output, Stdio},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::secret::{OVERRIDING_ENV, SECRET_ENV};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Green ✓ for a stage that succeeded.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗ for a stage that failed.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
/// Cyan ✓ next to the final summary.
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Log lines ────────────────────────────────────────────────────────────────

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enable or disable `[DEBUG]` output for the rest of the process.
pub fn set_verbose(on: bool) {
    VERBOSE.store(on, Ordering::Relaxed);
}

fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

/// Render `msg` with its colored level tag, e.g. `[INFO] Done!`.
pub fn format_line(level: Level, msg: &str) -> String {
    let tag = match level {
        Level::Debug => style("[DEBUG]").magenta(),
        Level::Info => style("[INFO]").green(),
        Level::Warning => style("[WARNING]").yellow(),
        Level::Error => style("[ERROR]").red(),
    };
    format!("{tag} {msg}")
}

fn log(level: Level, msg: &str) {
    if level == Level::Debug && !verbose() {
        return;
    }
    eprintln!("{}", format_line(level, msg));
}

pub fn debug(msg: impl AsRef<str>) {
    log(Level::Debug, msg.as_ref());
}

pub fn info(msg: impl AsRef<str>) {
    log(Level::Info, msg.as_ref());
}

pub fn warn(msg: impl AsRef<str>) {
    log(Level::Warning, msg.as_ref());
}

pub fn error(msg: impl AsRef<str>) {
    log(Level::Error, msg.as_ref());
}

/// Log a heading followed by one tab-indented line per item.
pub fn info_list<'a>(heading: &str, items: impl IntoIterator<Item = &'a str>) {
    info(heading);
    for item in items {
        info(format!("\t{item}"));
    }
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of a single tool invocation.
///
/// Carries the stage label plus whatever the command wrote to stdout/stderr so
/// it can be replayed to the terminal when something goes wrong.
#[derive(Debug)]
pub struct StageOutcome {
    /// Human-readable stage label, e.g. `"Snapshot /mnt/restic"`.
    pub label: String,
    /// Whether the stage completed without error.
    pub success: bool,
    /// Everything the command wrote to stdout (empty when output was not
    /// captured).
    pub stdout: String,
    /// Everything the command wrote to stderr.
    pub stderr: String,
    /// Why the stage failed, if it did.
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn succeeded(label: &str) -> Self {
        Self {
            label: label.to_string(),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
        }
    }

    pub fn failed_with(label: &str, error: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error.into()),
        }
    }

    /// Print the ✓/✗ stage line.  A failed stage also replays its error and
    /// whatever the tool wrote, on stderr.
    pub fn print(&self) {
        let icon = if self.success { icon_ok() } else { icon_err() };
        println!("  {icon}  {}", style(&self.label).bold());
        if self.success {
            return;
        }
        if let Some(msg) = &self.error {
            eprintln!("\n  {} {msg}", style("Error:").red().bold());
        }
        replay("stdout", &self.stdout);
        replay("stderr", &self.stderr);
    }

    /// Print the captured stdout as-is.  Used for steps whose output *is* the
    /// result, like the snapshot listing.
    pub fn print_stdout(&self) {
        for line in self.stdout.lines() {
            println!("{line}");
        }
    }

    /// Returns `true` if the stage did not succeed.
    pub const fn failed(&self) -> bool {
        !self.success
    }

    /// Short failure description for error values: the error message plus the
    /// last line the tool wrote to stderr, when there is one.
    pub fn detail(&self) -> String {
        let base = self
            .error
            .clone()
            .unwrap_or_else(|| "unknown failure".into());
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) => format!("{base} ({})", last.trim()),
            None => base,
        }
    }
}

fn replay(stream: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    eprintln!("\n  {} {stream}:", style("►").dim());
    for line in text.lines() {
        eprintln!("    {line}");
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(st) = ProgressStyle::with_template("  {spinner:.cyan}  {msg}") {
        pb.set_style(st.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Build a [`Command`] for `args` with scrubbed credential variables and the
/// given per-call environment overrides applied.
///
/// The credential variables are removed first so a child only ever sees the
/// password when the caller passes it explicitly in `env`, and an inherited
/// password file or command cannot take precedence over it.
pub fn command(args: &[String], env: &[(&str, &str)]) -> Result<Command> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;
    let mut cmd = Command::new(prog);
    cmd.args(rest).env_remove(SECRET_ENV);
    for var in OVERRIDING_ENV {
        cmd.env_remove(var);
    }
    for (k, v) in env {
        cmd.env(k, v);
    }
    Ok(cmd)
}

/// Run a command, capturing both stdout and stderr.
///
/// All output is buffered so the spinner can own the terminal while the
/// command runs.
///
/// Returns `(success, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String], env: &[(&str, &str)]) -> Result<(bool, String, String)> {
    let output: Output = command(args, env)?
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

/// Run a command with stdio either discarded (`quiet`) or inherited from the
/// parent.  Returns whether it exited zero.
pub fn run_status(args: &[String], env: &[(&str, &str)], quiet: bool) -> Result<bool> {
    let mut cmd = command(args, env)?;
    if quiet {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
    }
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;
    Ok(status.success())
}

/// Turn a `run_status` result into a [`StageOutcome`].
pub fn status_outcome(label: &str, args: &[String], result: Result<bool>) -> StageOutcome {
    match result {
        Ok(true) => StageOutcome::succeeded(label),
        Ok(false) => StageOutcome::failed_with(
            label,
            format!("command exited non-zero: {}", args.join(" ")),
        ),
        Err(e) => StageOutcome::failed_with(label, format!("{e:#}")),
    }
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run a tool behind a spinner with its output captured.
///
/// The spinner is cleared before returning so the caller's `print()` starts
/// on a clean line.
pub fn run_stage(label: &str, args: &[String], env: &[(&str, &str)]) -> StageOutcome {
    let spinner = make_spinner(label);
    let result = run_captured(args, env);
    spinner.finish_and_clear();

    let (success, stdout, stderr) = match result {
        Ok(captured) => captured,
        Err(e) => return StageOutcome::failed_with(label, format!("{e:#}")),
    };
    StageOutcome {
        label: label.to_string(),
        success,
        stdout,
        stderr,
        error: (!success).then(|| format!("command exited non-zero: {}", args.join(" "))),
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the final summary after every unit of work has run.
///
/// `results` yields `(label, succeeded)` pairs.  Shows a success banner when
/// everything passed, or a failure banner listing the units that failed.
pub fn print_summary<'a>(results: impl IntoIterator<Item = (&'a str, bool)>) {
    let failed: Vec<&str> = results
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(label, _)| label)
        .collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style("All stages completed successfully.").cyan().bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Some stages failed.").red().bold());
        for label in &failed {
            eprintln!("    {} {}", icon_err(), style(label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
