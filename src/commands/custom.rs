//! `linux-toolset custom-command <procedure>`.

use anyhow::{Result, bail};

use crate::{
    cli::CustomArgs,
    config,
    error::ToolsetError,
    procedures,
    process::{ProcessRunner, SystemRunner},
    ui,
};

/// Entry point used by `main`.
pub fn run(args: &CustomArgs) -> Result<()> {
    execute(args, &mut SystemRunner)
}

/// Load the procedure table and run `args.procedure` with `runner`.
///
/// An unknown procedure is logged and nothing runs; the command still
/// returns normally.  Fails when any step failed (every step still ran).
pub fn execute(args: &CustomArgs, runner: &mut dyn ProcessRunner) -> Result<()> {
    ui::info("Running custom commands...");
    let cfg = config::load_config(&args.config.config)?;

    let report = match procedures::run(runner, &cfg.custom_commands, &args.procedure) {
        Ok(report) => report,
        Err(e @ ToolsetError::UnknownProcedure { .. }) => {
            ui::error(e.to_string());
            return Ok(());
        },
        Err(e) => return Err(e.into()),
    };

    ui::info("Done!");

    let failed = report.failure_count();
    if failed > 0 {
        bail!(
            "procedure '{}' finished with {failed} of {} commands failed",
            args.procedure,
            report.steps.len()
        );
    }
    Ok(())
}
