//! Named command procedures from `custom-commands`.
//!
//! Each step is logged (command and comment) and then run with `sh -c`,
//! sharing the terminal so interactive commands such as `sudo` work.  A
//! failing step is logged and the procedure moves on to the next one.

use crate::{
    config::ProcedureTable,
    error::ToolsetError,
    process::{Invocation, ProcessRunner},
    runner::shell_args,
    ui,
};

/// Per-step results of one procedure.
#[derive(Debug, Default)]
pub struct ProcedureReport {
    /// `(command, error)` for every step, in order.
    pub steps: Vec<(String, Option<ToolsetError>)>,
}

impl ProcedureReport {
    pub fn failure_count(&self) -> usize {
        self.steps.iter().filter(|(_, e)| e.is_some()).count()
    }
}

/// Run procedure `name` from `table`.
///
/// An unknown name is an error and nothing is executed.
pub fn run(
    runner: &mut dyn ProcessRunner,
    table: &ProcedureTable,
    name: &str,
) -> Result<ProcedureReport, ToolsetError> {
    let steps = table.get(name).ok_or_else(|| ToolsetError::UnknownProcedure {
        name: name.to_string(),
        available: if table.is_empty() {
            "none".into()
        } else {
            table.keys().cloned().collect::<Vec<_>>().join(", ")
        },
    })?;

    ui::info(format!("Running command procedure: '{name}'"));
    let mut report = ProcedureReport::default();
    for step in steps {
        ui::info(format!("Running command: '{}'", step.command));
        ui::info(format!("Comment: '{}'", step.comment));

        let outcome = runner.run(
            &Invocation::new(step.command.clone(), shell_args(&step.command)).inherit(),
        );
        let error = outcome.failed().then(|| ToolsetError::CommandStepFailed {
            command: step.command.clone(),
            detail: outcome.detail(),
        });
        if let Some(e) = &error {
            ui::error(format!("Could not run command: {e}"));
        }
        report.steps.push((step.command.clone(), error));
    }
    Ok(report)
}
