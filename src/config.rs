//! Configuration types and loading logic.
//!
//! `Config` is a direct mapping of `config.json` (or `config.toml`; the
//! format follows the file extension).  Every field has a default so any
//! section may be left out, but the file itself must exist.
//!
//! # File format
//!
//! ```json
//! {
//!   "backup": {
//!     "target-repositories": ["/mnt/usb/restic", "~/restic"],
//!     "includes": ["/home/alice"],
//!     "excludes": ["/home/alice/.cache"],
//!     "exclude-templates": ["**/node_modules", "**/*.tmp"],
//!     "copy-destinations": { "/mnt/usb/restic": "nas:/backups/restic" }
//!   },
//!   "custom-commands": {
//!     "update": [
//!       { "command": "sudo apt update", "comment": "refresh package index" }
//!     ]
//!   }
//! }
//! ```
//!
//! Older configs use `repository-paths` instead of `target-repositories` and a
//! `remotes` list instead of `copy-destinations`; both shapes are accepted and
//! resolved into a single [`ReplicationPlan`] at load time.

use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Context, Result};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{error::ToolsetError, excludes};

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Repositories, paths and copy destinations for `backup`.
    #[serde(default)]
    pub backup: BackupConfig,

    /// Named command procedures for `custom-command`.
    #[serde(default)]
    pub custom_commands: ProcedureTable,
}

// ─── backup ───────────────────────────────────────────────────────────────────

/// Everything the backup run needs, as written in the file.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BackupConfig {
    /// restic repositories, backed up in this order.
    #[serde(default, alias = "repository-paths")]
    pub target_repositories: Vec<String>,

    /// Paths written to the `--files-from` list.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Paths written to the `--iexclude-file` list.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Globs expanded under every include root and appended to the excludes.
    #[serde(default)]
    pub exclude_templates: Vec<String>,

    /// `source → destination` pairs, copied in document order.
    #[serde(default, skip_serializing_if = "DestinationMap::is_empty")]
    pub copy_destinations: DestinationMap,

    /// Destinations that all receive a copy of one designated source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<String>,

    /// The source copied to every entry of `remotes`.  Defaults to the first
    /// repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_source: Option<String>,
}

/// An ordered `source → destination` map.
///
/// JSON objects and TOML tables are read in document order so copies run in
/// the order the operator wrote them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DestinationMap(pub Vec<(String, String)>);

impl DestinationMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for DestinationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = DestinationMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of source paths to destination paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((from, to)) = map.next_entry::<String, String>()? {
                    pairs.push((from, to));
                }
                Ok(DestinationMap(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

impl Serialize for DestinationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (from, to) in &self.0 {
            map.serialize_entry(from, to)?;
        }
        map.end()
    }
}

// ─── custom-commands ──────────────────────────────────────────────────────────

/// One step of a procedure.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommandStep {
    /// Shell command line, run with `sh -c`.
    pub command: String,
    /// Shown before the command runs.
    #[serde(default)]
    pub comment: String,
}

/// Procedure name → ordered steps.
pub type ProcedureTable = BTreeMap<String, Vec<CommandStep>>;

// ─── Resolved plan ────────────────────────────────────────────────────────────

/// One `rsync` copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationUnit {
    pub source: String,
    pub destination: String,
}

/// Which copies run after the backups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplicationPlan {
    #[default]
    None,
    /// Each pair copies its own source (`copy-destinations`).
    Paired(Vec<(String, String)>),
    /// One source copied to every destination (`remotes`).
    FanOut {
        source: String,
        destinations: Vec<String>,
    },
}

impl ReplicationPlan {
    /// Flatten into copy units in execution order.
    pub fn units(&self) -> Vec<ReplicationUnit> {
        match self {
            Self::None => Vec::new(),
            Self::Paired(pairs) => pairs
                .iter()
                .map(|(source, destination)| ReplicationUnit {
                    source: source.clone(),
                    destination: destination.clone(),
                })
                .collect(),
            Self::FanOut {
                source,
                destinations,
            } => destinations
                .iter()
                .map(|destination| ReplicationUnit {
                    source: source.clone(),
                    destination: destination.clone(),
                })
                .collect(),
        }
    }
}

/// The backup section after `~` expansion, template matching and replication
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackupPlan {
    pub repositories: Vec<String>,
    pub includes: Vec<String>,
    /// Manual excludes first, then template matches.
    pub excludes: Vec<String>,
    /// Just the template matches, for diagnostics.
    pub matched_excludes: Vec<String>,
    pub replication: ReplicationPlan,
}

impl BackupConfig {
    /// Decide which replication policy is active.
    ///
    /// `copy-destinations` and `remotes` are mutually exclusive.  A `remotes`
    /// list copies `replication-source`, or the first repository when that is
    /// not set.
    pub fn replication_plan(&self) -> Result<ReplicationPlan, String> {
        match (self.copy_destinations.is_empty(), self.remotes.is_empty()) {
            (true, true) => Ok(ReplicationPlan::None),
            (false, false) => {
                Err("set either `copy-destinations` or `remotes`, not both".into())
            },
            (false, true) => Ok(ReplicationPlan::Paired(
                self.copy_destinations
                    .0
                    .iter()
                    .map(|(s, d)| (expand_tilde(s), expand_tilde(d)))
                    .collect(),
            )),
            (true, false) => {
                let source = self
                    .replication_source
                    .as_deref()
                    .or_else(|| self.target_repositories.first().map(String::as_str))
                    .ok_or("`remotes` needs `replication-source` or at least one repository")?;
                Ok(ReplicationPlan::FanOut {
                    source: expand_tilde(source),
                    destinations: self.remotes.iter().map(|d| expand_tilde(d)).collect(),
                })
            },
        }
    }

    /// Expand `~`, match exclude templates and resolve the replication plan.
    pub fn resolve(&self) -> Result<BackupPlan, String> {
        let repositories = expand_all(&self.target_repositories);
        let includes = expand_all(&self.includes);
        let manual = expand_all(&self.excludes);

        let matched = excludes::resolve(&includes, &self.exclude_templates, &manual)
            .map_err(|e| e.to_string())?;

        let mut all_excludes = manual;
        all_excludes.extend(matched.iter().cloned());

        Ok(BackupPlan {
            repositories,
            includes,
            excludes: all_excludes,
            matched_excludes: matched,
            replication: self.replication_plan()?,
        })
    }
}

// ─── ~ expansion ──────────────────────────────────────────────────────────────

/// Replace a leading `~` or `~/` with the home directory.  Anything else
/// (`~bob/`, `host:~/x`, URIs) is returned unchanged.
pub fn expand_tilde(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_string(),
    }
}

fn expand_all(paths: &[String]) -> Vec<String> {
    paths.iter().map(|p| expand_tilde(p)).collect()
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// `true` when `path` should be parsed as TOML rather than JSON.
pub fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// Read and parse a `Config` from `path`.
///
/// A missing file is [`ToolsetError::ConfigMissing`]; an unreadable or
/// malformed one is [`ToolsetError::ConfigInvalid`].  The backup section is
/// only checked for consistency by [`load_backup_plan`], so `custom-command`
/// works whatever state it is in.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(ToolsetError::ConfigMissing(path.to_path_buf()).into());
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let invalid = |reason: String| ToolsetError::ConfigInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let cfg: Config = if is_toml(path) {
        toml::from_str(&text).map_err(|e| invalid(e.to_string()))?
    } else {
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?
    };

    Ok(cfg)
}

/// Load and resolve the backup section in one go.
pub fn load_backup_plan(path: &Path) -> Result<(Config, BackupPlan)> {
    let cfg = load_config(path)?;
    let plan = cfg
        .backup
        .resolve()
        .map_err(|reason| ToolsetError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;
    Ok((cfg, plan))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
