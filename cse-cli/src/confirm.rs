//! Interactive confirmation.

use std::io::IsTerminal;

use crate::error::CliError;

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Returns `true` only on an explicit yes.
    ///
    /// # Errors
    /// Returns [`CliError::Prompt`] if the prompt cannot be shown.
    fn confirm(&mut self, prompt: &str) -> Result<bool, CliError>;
}

/// Prompts on the terminal; answers no when stdin is not a terminal.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool, CliError> {
        if !std::io::stdin().is_terminal() {
            tracing::warn!(prompt, "stdin is not a terminal, treating confirmation as declined");
            return Ok(false);
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact_opt()
            .map(|answer| answer.unwrap_or(false))
            .map_err(|e| CliError::Prompt(e.to_string()))
    }
}
