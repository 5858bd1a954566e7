//! Repository readiness: probe, confirm, init.
//!
//! 1. `restic -r <repo> snapshots` with all output discarded.  Success means the repository exists
//!    and the password opens it; nothing else happens.
//! 2. Otherwise the operator is asked whether to create it.  An empty answer means yes.
//! 3. `restic -r <repo> init`.
//!
//! Running this against an existing repository never prompts and never
//! initializes, so it is safe to call on every run.

use crate::{
    error::{ToolsetError, Unavailable},
    process::{Invocation, ProcessRunner},
    prompt::Prompter,
    runner::{init_args, snapshots_args},
    secret::Secret,
    ui,
};

/// How a repository became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The probe succeeded.
    Existing,
    /// The operator agreed and `restic init` succeeded.
    Initialized,
}

/// Make sure `target` is an initialized restic repository.
pub fn ensure_ready(
    runner: &mut dyn ProcessRunner,
    prompter: &mut dyn Prompter,
    target: &str,
    secret: &Secret,
) -> Result<Readiness, ToolsetError> {
    let probe = runner.run(
        &Invocation::new(format!("Probe {target}"), snapshots_args(target))
            .with_secret(secret)
            .quiet(),
    );
    if !probe.failed() {
        return Ok(Readiness::Existing);
    }
    ui::debug(format!("probe failed for '{target}': {}", probe.detail()));

    let unavailable = |reason| ToolsetError::RepoUnavailable {
        target: target.to_string(),
        reason,
    };

    let question = format!("Repo '{target}' not found, do you want to create one? [Y/n]");
    match prompter.confirm(&question) {
        Ok(true) => {},
        Ok(false) => return Err(unavailable(Unavailable::Declined)),
        Err(e) => return Err(unavailable(Unavailable::PromptFailed(e.to_string()))),
    }

    ui::info(format!("Initializing restic repo at: {target}"));
    let init = runner.run(
        &Invocation::new(format!("Init {target}"), init_args(target)).with_secret(secret),
    );
    init.print();
    if init.failed() {
        return Err(unavailable(Unavailable::InitFailed(init.detail())));
    }
    Ok(Readiness::Initialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{
        OutputMode,
        testing::{RecordingRunner, ScriptedPrompter},
    };

    fn secret() -> Secret {
        Secret::new("pw".into())
    }

    #[test]
    fn existing_repository_never_prompts_or_inits() {
        let mut runner = RecordingRunner::ok();
        let mut prompter = ScriptedPrompter::new("pw", &[]);

        for _ in 0..2 {
            let r = ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap();
            assert_eq!(r, Readiness::Existing);
        }

        assert!(prompter.questions.is_empty());
        assert_eq!(runner.lines(), vec![
            "restic -r /repo snapshots",
            "restic -r /repo snapshots"
        ]);
    }

    #[test]
    fn probe_is_quiet_and_carries_secret() {
        let mut runner = RecordingRunner::ok();
        let mut prompter = ScriptedPrompter::new("pw", &[]);
        ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap();

        let probe = &runner.calls[0];
        assert_eq!(probe.output, OutputMode::Quiet);
        assert_eq!(probe.env_value("RESTIC_PASSWORD"), Some("pw"));
    }

    #[test]
    fn missing_repository_is_initialized_after_yes() {
        let mut runner = RecordingRunner::failing_on(&["snapshots"]);
        let mut prompter = ScriptedPrompter::new("pw", &[true]);

        let r = ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap();

        assert_eq!(r, Readiness::Initialized);
        assert_eq!(prompter.questions, vec![
            "Repo '/repo' not found, do you want to create one? [Y/n]"
        ]);
        assert_eq!(runner.lines(), vec![
            "restic -r /repo snapshots",
            "restic -r /repo init"
        ]);
        assert_eq!(runner.calls[1].env_value("RESTIC_PASSWORD"), Some("pw"));
    }

    #[test]
    fn declining_skips_init() {
        let mut runner = RecordingRunner::failing_on(&["snapshots"]);
        let mut prompter = ScriptedPrompter::new("pw", &[false]);

        let err = ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap_err();

        assert!(err.is_declined());
        assert_eq!(runner.calls.len(), 1, "init must not run after a no");
    }

    #[test]
    fn init_failure_is_repo_unavailable() {
        let mut runner = RecordingRunner::failing_when(|_| true);
        let mut prompter = ScriptedPrompter::new("pw", &[true]);

        let err = ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap_err();

        match err {
            ToolsetError::RepoUnavailable {
                target,
                reason: Unavailable::InitFailed(_),
            } => assert_eq!(target, "/repo"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_prompt_is_repo_unavailable() {
        let mut runner = RecordingRunner::failing_on(&["snapshots"]);
        // No scripted answers: the prompter reports end of input.
        let mut prompter = ScriptedPrompter::new("pw", &[]);

        let err = ensure_ready(&mut runner, &mut prompter, "/repo", &secret()).unwrap_err();
        assert!(matches!(err, ToolsetError::RepoUnavailable {
            reason: Unavailable::PromptFailed(_),
            ..
        }));
        assert_eq!(runner.calls.len(), 1);
    }
}
