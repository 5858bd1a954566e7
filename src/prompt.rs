//! Operator interaction.
//!
//! Components never talk to the terminal directly; they are handed a
//! [`Prompter`].  The binary uses [`TerminalPrompter`], tests use a scripted
//! one.

use std::io::{self, BufRead, Write};

use console::Term;

/// The two questions the toolset ever asks.
pub trait Prompter {
    /// Ask a yes/no question where an empty answer means "yes".
    ///
    /// Returns `Ok(false)` for any other answer and for end of input.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Read a secret without echoing it.
    fn secret(&mut self, prompt: &str) -> io::Result<String>;
}

/// Interprets an answer to a `[Y/n]` question.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

/// Prompts on stderr and reads from stdin / the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let mut err = io::stderr();
        write!(err, "{question} ")?;
        err.flush()?;

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            // Nothing to read (closed stdin, cron): never assume consent.
            writeln!(err)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }

    fn secret(&mut self, prompt: &str) -> io::Result<String> {
        let term = Term::stderr();
        term.write_str(prompt)?;
        term.read_secure_line()
    }
}
