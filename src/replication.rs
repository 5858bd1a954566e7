//! Secondary copies with `rsync`.
//!
//! A copy mirrors the source tree exactly: archive mode, compressed transfer,
//! and files missing from the source are deleted at the destination.

use crate::{
    config::ReplicationUnit,
    error::ToolsetError,
    process::{Invocation, ProcessRunner},
    runner::rsync_args,
    ui,
};

/// Mirror `unit.source` to `unit.destination`.
///
/// No credential is passed: this always runs after the secret scope has
/// ended.
pub fn replicate(
    runner: &mut dyn ProcessRunner,
    unit: &ReplicationUnit,
) -> Result<(), ToolsetError> {
    ui::info(format!(
        "Copying repository '{}' to '{}'",
        unit.source, unit.destination
    ));
    let outcome = runner.run(&Invocation::new(
        format!("Copy {} → {}", unit.source, unit.destination),
        rsync_args(&unit.source, &unit.destination),
    ));
    outcome.print();
    if outcome.failed() {
        return Err(ToolsetError::ReplicationFailed {
            origin: unit.source.clone(),
            destination: unit.destination.clone(),
            detail: outcome.detail(),
        });
    }
    ui::info(format!("Finished copying '{}'", unit.destination));
    Ok(())
}
