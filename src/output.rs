// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Progress, results, warnings, and errors in normal, quiet (CI), or JSON-lines mode.

use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    #[default]
    Normal,
    /// Minimal output for CI (only results, warnings, and errors)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
#[derive(Debug, Default)]
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing the command.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Seconds since the timer started, if it was started.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the final result of a command, with timing in normal mode.
    pub fn success(&self, message: &str) {
        match (self.mode, self.elapsed_secs()) {
            (OutputMode::Normal, Some(elapsed)) => println!("{message} ({elapsed:.1}s)"),
            (OutputMode::Normal | OutputMode::Quiet, _) => println!("{message}"),
            (OutputMode::Json, elapsed) => self.emit("success", message, elapsed, Stream::Stdout),
        }
    }

    /// Print a bare value on stdout, e.g. a URL meant for piping.
    pub fn value(&self, value: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{value}"),
            OutputMode::Json => self.emit("value", value, None, Stream::Stdout),
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit("warning", message, None, Stream::Stderr),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                self.emit("error", message, self.elapsed_secs(), Stream::Stderr)
            }
        }
    }

    fn emit(&self, event: &str, message: &str, duration_secs: Option<f64>, stream: Stream) {
        let event = JsonEvent {
            event,
            message,
            duration_secs,
        };
        if let Ok(json) = serde_json::to_string(&event) {
            match stream {
                Stream::Stdout => println!("{json}"),
                Stream::Stderr => eprintln!("{json}"),
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_off_until_started() {
        let mut output = Output::new(OutputMode::Quiet);
        assert_eq!(output.elapsed_secs(), None);
        output.start_timer();
        assert!(output.elapsed_secs().is_some());
    }

    #[test]
    fn json_event_omits_missing_duration() {
        let event = JsonEvent {
            event: "value",
            message: "https://example.com/backup.sql.gz",
            duration_secs: None,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"value","message":"https://example.com/backup.sql.gz"}"#
        );
    }
}
