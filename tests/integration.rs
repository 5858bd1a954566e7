//! Integration tests for the `linux-toolset` binary.
//!
//! These spawn the compiled binary and assert on exit codes, stdout and
//! stderr.  Neither `restic` nor `rsync` is required: everything here either
//! stops before a tool runs or only runs `sh`.
//!
//! # Running
//!
//! ```sh
//! cargo test --test integration
//! ```

use std::{
    fs,
    path::Path,
    process::{Command, Stdio},
};

const BIN: &str = env!("CARGO_BIN_EXE_linux-toolset");

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Run `linux-toolset` with `args` in `dir`, with `HOME` pointed at `dir` and
/// stdin closed.
///
/// Returns `(exit_success, stdout, stderr)`.
fn run_in(args: &[&str], dir: &Path) -> (bool, String, String) {
    let out = Command::new(BIN)
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RESTIC_PASSWORD")
        .stdin(Stdio::null())
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));

    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
    )
}

fn run(args: &[&str]) -> (bool, String, String) {
    let dir = tempfile::tempdir().unwrap();
    run_in(args, dir.path())
}

// ─── --help / --version ───────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let (ok, stdout, _) = run(&["--help"]);
    assert!(ok, "--help should exit 0");
    for sub in ["backup", "custom-command", "init"] {
        assert!(stdout.contains(sub), "help should mention {sub}:\n{stdout}");
    }
}

#[test]
fn version_exits_zero() {
    let (ok, stdout, _) = run(&["--version"]);
    assert!(ok);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_subcommand_is_usage_error() {
    let (ok, _, stderr) = run(&[]);
    assert!(!ok);
    assert!(stderr.contains("Usage"), "stderr:\n{stderr}");
}

// ─── init ────────────────────────────────────────────────────────────────────

#[test]
fn init_creates_config_json() {
    let dir = tempfile::tempdir().unwrap();
    let (ok, _, stderr) = run_in(&["init"], dir.path());
    assert!(ok, "init should exit 0; stderr:\n{stderr}");

    let text = fs::read_to_string(dir.path().join("config.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(v["backup"]["target-repositories"].is_array());
    assert!(v["custom-commands"].is_object());
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{\"mine\": true}").unwrap();

    let (ok, _, stderr) = run_in(&["init"], dir.path());
    assert!(!ok, "init over an existing file should fail");
    assert!(stderr.contains("already exists"), "stderr:\n{stderr}");
    assert_eq!(
        fs::read_to_string(dir.path().join("config.json")).unwrap(),
        "{\"mine\": true}"
    );
}

#[test]
fn init_writes_toml_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let (ok, _, _) = run_in(&["init", "-c", "toolset.toml"], dir.path());
    assert!(ok);

    let text = fs::read_to_string(dir.path().join("toolset.toml")).unwrap();
    let v: toml::Table = toml::from_str(&text).unwrap();
    assert!(v.contains_key("backup"));

    // And the result is accepted by the loader.
    let (ok, stdout, stderr) = run_in(
        &["backup", "-c", "toolset.toml", "--print-config"],
        dir.path(),
    );
    assert!(ok, "stderr:\n{stderr}");
    assert!(stdout.contains("BackupPlan"));
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[test]
fn missing_config_exits_nonzero() {
    let (ok, _, stderr) = run(&["backup"]);
    assert!(!ok);
    assert!(stderr.contains("config file does not exist"), "stderr:\n{stderr}");
    assert!(stderr.contains("config.json"));
}

#[test]
fn missing_config_for_custom_command_exits_nonzero() {
    let (ok, _, stderr) = run(&["custom-command", "-c", "nope.json", "update"]);
    assert!(!ok);
    assert!(stderr.contains("nope.json"), "stderr:\n{stderr}");
}

#[test]
fn malformed_json_is_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let (ok, _, stderr) = run_in(&["backup"], dir.path());
    assert!(!ok);
    assert!(stderr.contains("invalid config"), "stderr:\n{stderr}");
}

#[test]
fn both_copy_shapes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"backup": {
            "target-repositories": ["/r1"],
            "copy-destinations": {"/r1": "/d1"},
            "remotes": ["/d2"]
        }}"#,
    )
    .unwrap();

    let (ok, _, stderr) = run_in(&["backup", "--print-config"], dir.path());
    assert!(!ok);
    assert!(stderr.contains("not both"), "stderr:\n{stderr}");
}

// ─── backup --print-config ───────────────────────────────────────────────────

#[test]
fn print_config_shows_resolved_plan() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().display().to_string();
    fs::create_dir_all(dir.path().join("src/node_modules")).unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"backup": {
            "repository-paths": ["~/restic"],
            "includes": ["~/src"],
            "exclude-templates": ["**/node_modules"],
            "remotes": ["/mnt/usb/restic"]
        }}"#,
    )
    .unwrap();

    let (ok, stdout, stderr) = run_in(&["backup", "--print-config"], dir.path());
    assert!(ok, "stderr:\n{stderr}");
    assert!(stdout.contains(&format!("{home}/restic")), "stdout:\n{stdout}");
    assert!(stdout.contains(&format!("{home}/src/node_modules")));
    assert!(stdout.contains("FanOut"));
    assert!(stdout.contains("/mnt/usb/restic"));
}

// ─── backup preconditions ────────────────────────────────────────────────────

#[test]
fn backup_without_repositories_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"backup": {"includes": ["/etc/hostname"]}}"#,
    )
    .unwrap();

    let (ok, _, stderr) = run_in(&["backup"], dir.path());
    assert!(!ok);
    assert!(stderr.contains("No repo for backup"), "stderr:\n{stderr}");
    // Fails before asking for a password.
    assert!(!stderr.contains("Input password"));
}

/// With stdin closed the create-repository question reads EOF, which counts as
/// "no": the repository is skipped and the run fails without creating it.
#[test]
fn declined_repository_is_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path().join("repo");
    fs::write(dir.path().join("pw"), "secret\n").unwrap();
    fs::write(
        dir.path().join("config.json"),
        format!(
            r#"{{"backup": {{"target-repositories": ["{}"], "includes": ["{}"]}}}}"#,
            repo.display(),
            dir.path().display()
        ),
    )
    .unwrap();

    let (ok, _, stderr) = run_in(
        &["backup", "--password-file", "pw", "--no-copy"],
        dir.path(),
    );
    assert!(!ok, "a skipped repository should fail the run");
    assert!(!repo.exists());
    assert!(stderr.contains("1 of 1"), "stderr:\n{stderr}");
}

#[test]
fn unreadable_password_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"backup": {"target-repositories": ["/r1"]}}"#,
    )
    .unwrap();

    let (ok, _, stderr) = run_in(&["backup", "--password-file", "missing"], dir.path());
    assert!(!ok);
    assert!(stderr.contains("password"), "stderr:\n{stderr}");
}

// ─── custom-command ──────────────────────────────────────────────────────────

fn write_procedures(dir: &Path) {
    fs::write(
        dir.join("config.json"),
        r#"{"custom-commands": {
            "mark": [
                {"command": "touch first", "comment": "first marker"},
                {"command": "exit 7", "comment": "fails"},
                {"command": "touch second", "comment": "still runs"}
            ],
            "clean": [{"command": "rm -f first second"}]
        }}"#,
    )
    .unwrap();
}

#[test]
fn custom_command_runs_every_step() {
    let dir = tempfile::tempdir().unwrap();
    write_procedures(dir.path());

    let (ok, _, stderr) = run_in(&["custom-command", "mark"], dir.path());
    assert!(!ok, "a failing step should fail the command");
    assert!(dir.path().join("first").exists());
    assert!(dir.path().join("second").exists());
    assert!(stderr.contains("Comment: 'first marker'"), "stderr:\n{stderr}");
    assert!(stderr.contains("Could not run command"));
}

#[test]
fn custom_command_success_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_procedures(dir.path());
    fs::write(dir.path().join("first"), "").unwrap();

    let (ok, _, stderr) = run_in(&["custom-command", "clean"], dir.path());
    assert!(ok, "stderr:\n{stderr}");
    assert!(!dir.path().join("first").exists());
    assert!(stderr.contains("Done!"));
}

#[test]
fn unknown_procedure_lists_available_names() {
    let dir = tempfile::tempdir().unwrap();
    write_procedures(dir.path());

    let (ok, _, stderr) = run_in(&["custom-command", "nope"], dir.path());
    assert!(ok, "an unknown procedure is reported, not a failure");
    assert!(stderr.contains("[ERROR]"), "stderr:\n{stderr}");
    assert!(stderr.contains("clean, mark"), "stderr:\n{stderr}");
    assert!(!dir.path().join("first").exists());
}

#[test]
fn custom_command_ignores_unresolvable_backup_section() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.json"),
        r#"{"backup": {"remotes": ["/mnt/copy"]},
            "custom-commands": {"hello": [{"command": "touch hello", "comment": "hi"}]}}"#,
    )
    .unwrap();

    let (ok, _, stderr) = run_in(&["custom-command", "hello"], dir.path());
    assert!(ok, "stderr:\n{stderr}");
    assert!(dir.path().join("hello").exists());

    // The backup command still refuses it.
    let (ok, _, stderr) = run_in(&["backup", "--print-config"], dir.path());
    assert!(!ok);
    assert!(stderr.contains("replication-source"), "stderr:\n{stderr}");
}

#[test]
fn custom_command_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("toolset.toml"),
        r#"
[[custom-commands.hello]]
command = "touch hello"
comment = "say hello"
"#,
    )
    .unwrap();

    let (ok, _, stderr) = run_in(
        &["custom-command", "-c", "toolset.toml", "hello"],
        dir.path(),
    );
    assert!(ok, "stderr:\n{stderr}");
    assert!(dir.path().join("hello").exists());
}
