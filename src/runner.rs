//! Command argument construction helpers.
//!
//! This module is responsible for *building* the argument lists passed to
//! restic, rsync and the shell.  It does **not** execute anything; execution
//! goes through [`crate::process::ProcessRunner`].
//!
//! Keeping arg-building separate from execution means every function here is
//! pure and trivially unit-testable without spawning any child processes.

use std::path::Path;

/// Retention window in which every snapshot is kept (`--keep-within-daily`).
pub const KEEP_WITHIN_DAILY: &str = "7d";

/// Retention window in which one snapshot per week is kept
/// (`--keep-within-weekly`).
pub const KEEP_WITHIN_WEEKLY: &str = "1m";

/// Tag attached to every snapshot created by the toolset.
pub const SNAPSHOT_TAG: &str = "main";

// ─── restic ───────────────────────────────────────────────────────────────────

/// Builds the argument list shared by every `restic` invocation:
///
/// ```text
/// restic  -r <repo>
/// ```
///
/// The password is never part of argv; it travels in the child's environment.
pub fn restic_base(repo: &str) -> Vec<String> {
    vec!["restic".into(), "-r".into(), repo.into()]
}

/// `restic -r <repo> init`.
pub fn init_args(repo: &str) -> Vec<String> {
    let mut cmd = restic_base(repo);
    cmd.push("init".into());
    cmd
}

/// `restic -r <repo> snapshots`.  Doubles as the readiness probe.
pub fn snapshots_args(repo: &str) -> Vec<String> {
    let mut cmd = restic_base(repo);
    cmd.push("snapshots".into());
    cmd
}

/// `restic -r <repo> backup …` from include/exclude list files.
///
/// Excludes are matched case-insensitively (`--iexclude-file`).
pub fn backup_args(repo: &str, include_file: &Path, exclude_file: &Path) -> Vec<String> {
    let mut cmd = restic_base(repo);
    cmd.extend([
        "backup".into(),
        "--files-from".into(),
        include_file.display().to_string(),
        "--iexclude-file".into(),
        exclude_file.display().to_string(),
        "--tag".into(),
        SNAPSHOT_TAG.into(),
        "--compression".into(),
        "max".into(),
    ]);
    cmd
}

/// `restic -r <repo> forget --keep-within-daily 7d --keep-within-weekly 1m --prune`.
pub fn forget_args(repo: &str) -> Vec<String> {
    let mut cmd = restic_base(repo);
    cmd.extend([
        "forget".into(),
        "--keep-within-daily".into(),
        KEEP_WITHIN_DAILY.into(),
        "--keep-within-weekly".into(),
        KEEP_WITHIN_WEEKLY.into(),
        "--prune".into(),
    ]);
    cmd
}

// ─── rsync ────────────────────────────────────────────────────────────────────

/// `rsync -arz --delete <source>/ <destination>`.
///
/// The source always ends in exactly one `/` so rsync mirrors its *contents*
/// into the destination instead of nesting the directory.
pub fn rsync_args(source: &str, destination: &str) -> Vec<String> {
    let trimmed = source.trim_end_matches('/');
    vec![
        "rsync".into(),
        "-arz".into(),
        "--delete".into(),
        format!("{trimmed}/"),
        destination.into(),
    ]
}

// ─── shell ────────────────────────────────────────────────────────────────────

/// `sh -c <command>` for operator-defined procedure steps.
pub fn shell_args(command: &str) -> Vec<String> {
    vec!["sh".into(), "-c".into(), command.into()]
}

// ─── Tests ────────────────────────────────────────────────────────────────────
