//! Exclude-template expansion.
//!
//! Templates such as `**/node_modules` or `**/*.tmp` are expanded once per
//! include root when the configuration is resolved, and the resulting absolute
//! paths are appended to the operator's own exclude list.

use std::path::Path;

use glob::{MatchOptions, Pattern, PatternError};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid exclude template '{template}': {source}")]
pub struct TemplateError {
    pub template: String,
    #[source]
    pub source: PatternError,
}

/// Shell-like matching: `*` never crosses `/` and never matches a leading dot.
const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expand every template against every include root.
///
/// Results are grouped by include root, then by template, then in the order
/// the glob walk yields them.  A match is dropped when its path *contains*
/// any manual exclude as a plain substring: `/data/kee` drops
/// `/data/keep/b.tmp` as well.  That is looser than path-segment matching and
/// is kept for compatibility with existing configs.
///
/// Include roots that do not exist and entries that cannot be read produce
/// no matches.  A template that is not a valid glob is an error.
pub fn resolve(
    includes: &[String],
    templates: &[String],
    manual_excludes: &[String],
) -> Result<Vec<String>, TemplateError> {
    for template in templates {
        Pattern::new(template).map_err(|source| TemplateError {
            template: template.clone(),
            source,
        })?;
    }

    let mut matched = Vec::new();
    for root in includes {
        let escaped_root = Pattern::escape(root);
        for template in templates {
            let pattern = Path::new(&escaped_root).join(template);
            let pattern = pattern.to_string_lossy();
            let paths = glob::glob_with(&pattern, OPTIONS).map_err(|source| TemplateError {
                template: template.clone(),
                source,
            })?;

            matched.extend(
                paths
                    .flatten()
                    .map(|p| p.to_string_lossy().into_owned())
                    .filter(|abs| !manual_excludes.iter().any(|ex| abs.contains(ex.as_str()))),
            );
        }
    }
    Ok(matched)
}
