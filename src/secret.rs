//! Scoped repository password.
//!
//! The password is read once per backup run and lives in a [`Secret`] that is
//! only ever *borrowed* by the code that needs it.  It reaches restic through
//! a per-invocation environment entry (see
//! [`crate::process::Invocation::with_secret`]); the process environment is
//! never touched, and every child spawned by the toolset has
//! [`SECRET_ENV`] stripped unless it was passed explicitly.  The
//! [`OVERRIDING_ENV`] variables are always stripped.
//!
//! The buffer is zeroized when the scope created by [`with_secret`] ends, on
//! every exit path including unwinding.

use std::{fmt, path::PathBuf};

use zeroize::Zeroizing;

use crate::{error::ToolsetError, prompt::Prompter};

/// Environment variable restic reads its repository password from.
pub const SECRET_ENV: &str = "RESTIC_PASSWORD";

/// Variables restic consults before [`SECRET_ENV`].  An inherited one would
/// override the password handed over per invocation.
pub const OVERRIDING_ENV: [&str; 2] = ["RESTIC_PASSWORD_FILE", "RESTIC_PASSWORD_COMMAND"];

/// Prompt shown when reading the password from the terminal.
pub const SECRET_PROMPT: &str = "Input password: ";

/// An in-memory credential.  Zeroized on drop; never printed.
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// The `(name, value)` environment entry to hand to a child process.
    pub fn env_entry(&self) -> (&'static str, &str) {
        (SECRET_ENV, self.0.as_str())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Where the password comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Ask the operator without echo.
    Prompt,
    /// First line of a file, for unattended runs.
    File(PathBuf),
}

impl SecretSource {
    fn acquire(&self, prompter: &mut dyn Prompter) -> Result<Secret, ToolsetError> {
        let raw = match self {
            Self::Prompt => Zeroizing::new(
                prompter
                    .secret(SECRET_PROMPT)
                    .map_err(|e| ToolsetError::SecretUnavailable(e.to_string()))?,
            ),
            Self::File(path) => Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
                ToolsetError::SecretUnavailable(format!("{}: {e}", path.display()))
            })?),
        };
        let line = raw.lines().next().unwrap_or_default();
        Ok(Secret::new(line.to_string()))
    }
}

/// Acquire the secret, run `body` with it, then zeroize it.
///
/// `body` receives the prompter back so it can keep asking questions while
/// the secret is held.  Acquisition failures abort before `body` runs.
pub fn with_secret<T>(
    source: &SecretSource,
    prompter: &mut dyn Prompter,
    body: impl FnOnce(&Secret, &mut dyn Prompter) -> T,
) -> Result<T, ToolsetError> {
    let secret = source.acquire(prompter)?;
    let out = body(&secret, prompter);
    drop(secret);
    Ok(out)
}
