// ABOUTME: Remote shell error types with SNAFU pattern.
// ABOUTME: Separates commands that ran and failed from commands that never ran.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ShellError {
    #[snafu(display("`{command}` exited with status {exit_code}: {stderr}"))]
    NonZeroExit {
        command: String,
        exit_code: u32,
        stderr: String,
    },

    #[snafu(display("`{command}` could not be run: {source}"))]
    Transport {
        command: String,
        source: crate::ssh::Error,
    },
}

impl ShellError {
    /// The command line that failed.
    pub fn command(&self) -> &str {
        match self {
            ShellError::NonZeroExit { command, .. } | ShellError::Transport { command, .. } => {
                command
            }
        }
    }
}
