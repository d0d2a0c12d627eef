// ABOUTME: Remote shell execution on target environments.
// ABOUTME: Defines the RemoteShell seam, checked execution, and the drush command builder.

mod drush;
mod error;

pub use drush::{Drush, DrushCommand};
pub use error::{NonZeroExitSnafu, ShellError, TransportSnafu};

pub use crate::ssh::CommandOutput;

use async_trait::async_trait;
use snafu::ResultExt;

/// Runs shell command lines on a target environment.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run a command line and return its output, whatever the exit status.
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError>;

    /// Run a command line; a non-zero exit status is an error.
    async fn must_run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let output = self.run(command).await?;
        if !output.success() {
            return NonZeroExitSnafu {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            }
            .fail();
        }
        Ok(output)
    }
}

#[async_trait]
impl RemoteShell for crate::ssh::Session {
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        self.exec(command).await.context(TransportSnafu {
            command: command.to_string(),
        })
    }
}

/// Join words into a single shell-safe command line.
pub fn shell_line<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    shell_words::join(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Exit(u32);

    #[async_trait]
    impl RemoteShell for Exit {
        async fn run(&self, _command: &str) -> Result<CommandOutput, ShellError> {
            Ok(CommandOutput {
                exit_code: self.0,
                stdout: "out".to_string(),
                stderr: " boom \n".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn must_run_accepts_zero_exit() {
        let output = Exit(0).must_run("true").await.unwrap();
        assert_eq!(output.stdout, "out");
    }

    #[tokio::test]
    async fn must_run_rejects_non_zero_exit() {
        let err = Exit(3).must_run("false").await.unwrap_err();
        match err {
            ShellError::NonZeroExit {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "false");
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shell_line_quotes_arguments() {
        assert_eq!(
            shell_line(["wget", "-q", "https://x/y?a=1&b=2"]),
            "wget -q 'https://x/y?a=1&b=2'"
        );
    }
}
