//! `linux-toolset init`: write a starter config.
//!
//! The starter is built as a [`Config`] value and serialized, so it always
//! parses back.  The format follows the file extension like the loader does.

use std::{fs, path::Path};

use anyhow::{Result, bail};

use crate::{
    config::{self, BackupConfig, CommandStep, Config},
    ui::{self, StageOutcome},
};

/// Entry point used by `main`.
pub fn run(path: &Path) -> Result<()> {
    let outcome = scaffold(path);
    outcome.print();
    if outcome.failed() {
        bail!("could not create {}", path.display());
    }
    ui::info(format!(
        "Edit {} and run 'linux-toolset backup -c {}'",
        path.display(),
        path.display()
    ));
    Ok(())
}

fn scaffold(path: &Path) -> StageOutcome {
    let label = format!("Init {}", path.display());
    if path.exists() {
        return StageOutcome::failed_with(
            &label,
            format!("'{}' already exists, refusing to overwrite", path.display()),
        );
    }

    let body = match render(&starter(), config::is_toml(path)) {
        Ok(body) => body,
        Err(e) => return StageOutcome::failed_with(&label, e),
    };
    match fs::write(path, body) {
        Ok(()) => StageOutcome::succeeded(&label),
        Err(e) => StageOutcome::failed_with(&label, e.to_string()),
    }
}

fn render(cfg: &Config, toml: bool) -> Result<String, String> {
    if toml {
        toml::to_string_pretty(cfg).map_err(|e| e.to_string())
    } else {
        serde_json::to_string_pretty(cfg)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string())
    }
}

/// Back up the working directory into `~/restic`, skipping common build and
/// cache directories.
fn starter() -> Config {
    let cwd = std::env::current_dir()
        .map_or_else(|_| "~".to_string(), |p| p.display().to_string());

    let mut custom_commands = config::ProcedureTable::new();
    custom_commands.insert("update".into(), vec![
        CommandStep {
            command: "sudo apt update".into(),
            comment: "Refresh the package index".into(),
        },
        CommandStep {
            command: "sudo apt upgrade -y".into(),
            comment: "Install available upgrades".into(),
        },
    ]);

    Config {
        backup: BackupConfig {
            target_repositories: vec!["~/restic".into()],
            includes: vec![cwd],
            exclude_templates: vec![
                "**/node_modules".into(),
                "**/.cache".into(),
                "**/target".into(),
            ],
            ..BackupConfig::default()
        },
        custom_commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_starter_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        run(&path).unwrap();
        let cfg = config::load_config(&path).unwrap();
        assert_eq!(cfg.backup.target_repositories, vec!["~/restic"]);
        assert_eq!(cfg.backup.exclude_templates.len(), 3);
        assert_eq!(cfg.custom_commands["update"].len(), 2);
    }

    #[test]
    fn toml_starter_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolset.toml");

        run(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[backup]"), "got:\n{text}");
        let cfg = config::load_config(&path).unwrap();
        assert_eq!(cfg.custom_commands["update"][0].command, "sudo apt update");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();

        assert!(run(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        let outcome = scaffold(&path);
        assert!(outcome.failed());
        assert!(outcome.detail().contains("already exists"), "got: {}", outcome.detail());
    }

    #[test]
    fn starter_has_no_copy_section() {
        let json = render(&starter(), false).unwrap();
        assert!(!json.contains("copy-destinations"));
        assert!(!json.contains("remotes"));
        assert!(json.contains("\"target-repositories\""));
    }
}
