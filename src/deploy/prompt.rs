// ABOUTME: Interactive confirmation seam for production deploys.
// ABOUTME: TerminalPrompter asks on the terminal via dialoguer.

use dialoguer::Confirm;

use crate::error::{Error, Result};

/// Question asked before touching production.
pub const PRODUCTION_PROMPT: &str = "This is a Production deployment. Are you damn sure?";

/// Asks the operator yes/no questions.
pub trait Prompter: Send + Sync {
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompts on the controlling terminal. Defaults to "no".
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// Ask for confirmation when `production`; any answer but yes aborts.
pub fn confirm_production(prompter: &dyn Prompter, production: bool) -> Result<()> {
    if !production {
        return Ok(());
    }
    match prompter.confirm(PRODUCTION_PROMPT) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::UserAborted),
        Err(e) => {
            tracing::debug!("Confirmation prompt failed: {}", e);
            Err(Error::UserAborted)
        }
    }
}
