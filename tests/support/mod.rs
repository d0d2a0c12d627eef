// ABOUTME: Test support utilities.
// ABOUTME: In-memory fakes of the cloud API, remote shell, prompter, and tracker.

use async_trait::async_trait;
use harbormaster::cloud::{
    BackupRecord, CloudApi, EnvironmentInfo, Notification, OperationResponse,
};
use harbormaster::config::Config;
use harbormaster::deploy::Prompter;
use harbormaster::error::{Error, Result};
use harbormaster::http::{self, ApiError};
use harbormaster::remote::{CommandOutput, RemoteShell, ShellError};
use harbormaster::tracking::DeploymentTracker;
use harbormaster::types::{EnvironmentId, GitRef, NotificationId};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("harbormaster=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const BASE_URL: &str = "https://cloud.example.com/api";

/// Two sites, zero polling interval, and a host rewrite for backup links.
#[allow(dead_code)]
pub const CONFIG_YAML: &str = r#"
application: massgov
sites:
  test:
    uuid: env-test
    server: massgov.test@test.example.com
    root: /var/www/html/massgov.test/docroot
  prod:
    uuid: env-prod
    server: massgov.prod@prod.example.com
    root: /var/www/html/massgov.prod/docroot
cloud:
  base_url: https://cloud.example.com/api
polling:
  interval: 0s
  max_attempts: 5
backup:
  download_host_rewrite:
    from: massgov.prod.acquia-sites.com
    to: edit.mass.gov
"#;

#[allow(dead_code)]
pub fn config() -> Config {
    Config::from_yaml(CONFIG_YAML).unwrap()
}

/// A backup record as the API returns it.
#[allow(dead_code)]
pub fn backup(id: u64, kind: &str, completed_at: Option<&str>) -> BackupRecord {
    serde_json::from_value(json!({
        "id": id,
        "type": kind,
        "completed_at": completed_at,
        "_links": {
            "download": {
                "href": format!("{}/environments/env-prod/databases/massgov/backups/{}/actions/download", BASE_URL, id)
            }
        }
    }))
    .unwrap()
}

fn operation(message: &str, notification: &str) -> OperationResponse {
    serde_json::from_value(json!({
        "message": message,
        "_links": {
            "notification": { "href": format!("{}/notifications/{}", BASE_URL, notification) }
        }
    }))
    .unwrap()
}

/// Scripted cloud API that records every call.
#[allow(dead_code)]
pub struct FakeCloud {
    calls: Mutex<Vec<String>>,
    statuses: Mutex<VecDeque<&'static str>>,
    runtime_version: Mutex<String>,
    pub backups: Vec<BackupRecord>,
    pub location: String,
    pub backup_message: String,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            statuses: Mutex::new(VecDeque::new()),
            runtime_version: Mutex::new("8.2".to_string()),
            backups: vec![
                backup(2, "daily", Some("2024-03-02T04:00:00Z")),
                backup(1, "daily", Some("2024-03-01T04:00:00Z")),
            ],
            location: "https://massgov.prod.acquia-sites.com/backups/2.sql.gz?sig=abc".to_string(),
            backup_message: "Creating the backup.".to_string(),
        }
    }

    /// Statuses returned by successive notification polls; afterwards every poll completes.
    pub fn with_statuses(self, statuses: &[&'static str]) -> Self {
        self.statuses.lock().extend(statuses.iter().copied());
        self
    }

    pub fn with_runtime_version(self, version: &str) -> Self {
        *self.runtime_version.lock() = version.to_string();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn polls(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("notification")).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn notification(&self, id: &NotificationId) -> http::Result<Notification> {
        self.record(format!("notification {}", id));
        let status = self.statuses.lock().pop_front().unwrap_or("completed");
        Ok(serde_json::from_value(json!({
            "uuid": id.as_str(),
            "status": status,
            "description": "Task",
        }))
        .unwrap())
    }

    async fn switch_code(
        &self,
        env: &EnvironmentId,
        git_ref: &GitRef,
    ) -> http::Result<OperationResponse> {
        self.record(format!("switch_code {} {}", env, git_ref));
        Ok(operation("Switching code.", "n-switch"))
    }

    async fn environment(&self, env: &EnvironmentId) -> http::Result<EnvironmentInfo> {
        self.record(format!("environment {}", env));
        Ok(serde_json::from_value(json!({
            "id": env.as_str(),
            "name": "env",
            "configuration": { "php": { "version": *self.runtime_version.lock() } }
        }))
        .unwrap())
    }

    async fn set_runtime_version(
        &self,
        env: &EnvironmentId,
        version: &str,
    ) -> http::Result<OperationResponse> {
        self.record(format!("set_runtime_version {} {}", env, version));
        *self.runtime_version.lock() = version.to_string();
        Ok(operation("Updating environment.", "n-php"))
    }

    async fn backups(
        &self,
        env: &EnvironmentId,
        database: &str,
    ) -> http::Result<Vec<BackupRecord>> {
        self.record(format!("backups {} {}", env, database));
        Ok(self.backups.clone())
    }

    async fn create_backup(
        &self,
        env: &EnvironmentId,
        database: &str,
    ) -> http::Result<OperationResponse> {
        self.record(format!("create_backup {} {}", env, database));
        Ok(operation(&self.backup_message, "n-backup"))
    }

    async fn redirect_location(&self, href: &str) -> http::Result<String> {
        self.record(format!("redirect {}", href));
        if self.location.is_empty() {
            return Err(ApiError::UnexpectedResponse {
                service: "fake",
                message: "no Location header".to_string(),
            });
        }
        Ok(self.location.clone())
    }
}

type Rule = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Remote shell that records commands and answers from rules.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeShell {
    commands: Mutex<Vec<String>>,
    responses: Vec<(Rule, String)>,
    failures: Vec<Rule>,
}

#[allow(dead_code)]
impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `needle` with `stdout`.
    pub fn respond(mut self, needle: &'static str, stdout: &str) -> Self {
        self.responses
            .push((Box::new(move |cmd| cmd.contains(needle)), stdout.to_string()));
        self
    }

    /// Exit 1 for commands matching `rule`.
    pub fn fail_when(mut self, rule: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.failures.push(Box::new(rule));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.commands().iter().any(|c| c.contains(needle))
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn run(&self, command: &str) -> std::result::Result<CommandOutput, ShellError> {
        self.commands.lock().push(command.to_string());
        if self.failures.iter().any(|rule| rule(command)) {
            return Ok(CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: "boom".to_string(),
            });
        }
        let stdout = self
            .responses
            .iter()
            .find(|(rule, _)| rule(command))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

/// Prompter with a fixed answer; `None` behaves like a missing terminal.
#[allow(dead_code)]
pub struct FakePrompter {
    answer: Option<bool>,
    asked: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakePrompter {
    pub fn answering(answer: Option<bool>) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

impl Prompter for FakePrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        self.asked.lock().push(question.to_string());
        self.answer
            .ok_or_else(|| Error::Prompt("not a terminal".to_string()))
    }
}

/// Deployment tracker that records revisions or always fails.
#[allow(dead_code)]
pub struct FakeTracker {
    pub fail: bool,
    recorded: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeTracker {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<String> {
        self.recorded.lock().clone()
    }
}

#[async_trait]
impl DeploymentTracker for FakeTracker {
    async fn record_deployment(&self, revision: &GitRef) -> http::Result<()> {
        if self.fail {
            return Err(ApiError::Api {
                service: "New Relic",
                status: 500,
                message: "unavailable".to_string(),
            });
        }
        self.recorded.lock().push(revision.to_string());
        Ok(())
    }
}

/// Assert that commands matching each needle appear in this order.
#[allow(dead_code)]
pub fn assert_in_order(commands: &[String], needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        let found = commands[from..]
            .iter()
            .position(|c| c.contains(needle))
            .unwrap_or_else(|| panic!("`{}` not found after position {} in {:#?}", needle, from, commands));
        from += found + 1;
    }
}
