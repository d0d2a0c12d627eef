// ABOUTME: Deploy command implementation.
// ABOUTME: Confirms, connects to the target over SSH, and runs the deployment workflow.

use super::{emit_warnings, load_config};
use harbormaster::cloud::AcquiaClient;
use harbormaster::config::Config;
use harbormaster::deploy::{
    Completed, Confirmed, DeployOptions, DeployRequest, DeployServices, Deployment,
    TerminalPrompter, run_deploy,
};
use harbormaster::diagnostics::{Diagnostics, Warning};
use harbormaster::error::Result;
use harbormaster::output::Output;
use harbormaster::ssh::Session;
use harbormaster::tracking::{DeploymentTracker, NewRelicNotifier};
use std::path::Path;

/// Deploy a git ref to one target environment.
pub async fn deploy(
    config_path: Option<&Path>,
    target: &str,
    git_ref: &str,
    options: DeployOptions,
    output: &Output,
) -> Result<()> {
    let request = DeployRequest::parse(target, git_ref, options)?;
    let config = load_config(config_path)?;

    // Nothing is contacted before production deploys are confirmed.
    let deployment = Deployment::new(config, request)?.confirm(&TerminalPrompter)?;

    let mut diag = Diagnostics::default();
    let result = connect_and_run(deployment, output, &mut diag).await;
    emit_warnings(output, &diag);
    let deployment = result?;
    output.success(&format!(
        "Deployed {} to {}",
        deployment.git_ref(),
        deployment.target().name
    ));
    Ok(())
}

/// Everything after confirmation. Warnings stay in `diag` on every path.
async fn connect_and_run(
    deployment: Deployment<Confirmed>,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<Deployment<Completed>> {
    let api = AcquiaClient::from_settings(&deployment.config().cloud)?;
    let tracker = if deployment.is_production() {
        tracker(deployment.config(), diag)
    } else {
        None
    };

    let server = deployment.target().server.clone();
    output.progress(&format!("  → Connecting to {}...", server.host));
    let session =
        Session::connect(server.ssh_session_config(deployment.config().command_timeout)).await?;

    let result = {
        let services = DeployServices {
            api: &api,
            shell: &session,
            tracker: tracker.as_ref().map(|t| t as &dyn DeploymentTracker),
        };
        run_deploy(deployment, &services, output, diag).await
    };

    if let Err(e) = session.disconnect().await {
        diag.warn(Warning::ssh_disconnect(format!(
            "SSH disconnect failed for {}: {}",
            server.host, e
        )));
    }
    result
}

fn tracker(config: &Config, diag: &mut Diagnostics) -> Option<NewRelicNotifier> {
    match NewRelicNotifier::from_settings(&config.tracking) {
        Ok(notifier) => Some(notifier),
        Err(e) => {
            diag.warn(Warning::external_notification(format!(
                "deployment tracking disabled: {}",
                e
            )));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbormaster::deploy::Prompter;
    use harbormaster::diagnostics::WarningKind;
    use harbormaster::error::ErrorKind;
    use harbormaster::output::OutputMode;

    const PROD_ONLY: &str = r#"
application: massgov
sites:
  prod:
    uuid: env-prod
    server:
      host: 127.0.0.1
      port: 1
      user: massgov.prod
      key_path: /nonexistent/harbormaster/id_ed25519
    root: /var/www/html/massgov.prod/docroot
cloud:
  key: literal-key
  secret: literal-secret
tracking:
  application:
    env: HARBORMASTER_TEST_NEVER_SET_APP
  api_key:
    env: HARBORMASTER_TEST_NEVER_SET_KEY
"#;

    struct Yes;

    impl Prompter for Yes {
        fn confirm(&self, _question: &str) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn failed_connect_keeps_tracking_warning() {
        let config = Config::from_yaml(PROD_ONLY).unwrap();
        let request = DeployRequest::parse("prod", "tags/build-1", DeployOptions::default()).unwrap();
        let deployment = Deployment::new(config, request).unwrap().confirm(&Yes).unwrap();
        let mut diag = Diagnostics::default();

        let err = connect_and_run(deployment, &Output::new(OutputMode::Quiet), &mut diag)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(diag.has(WarningKind::ExternalNotification));
    }
}
