// ABOUTME: Release command: runs the deploy command inside CI.
// ABOUTME: Production releases need the same confirmation as direct deploys.

use super::load_config;
use crate::cli::ReleaseFlags;
use harbormaster::ci::{CircleCiClient, PipelineRequest};
use harbormaster::deploy::{TerminalPrompter, confirm_production};
use harbormaster::error::Result;
use harbormaster::output::Output;
use harbormaster::types::{GitRef, TargetName};
use std::path::Path;

pub async fn release(
    config_path: Option<&Path>,
    target: &str,
    git_ref: &str,
    ci_branch: Option<&str>,
    flags: &ReleaseFlags,
    output: &Output,
) -> Result<()> {
    let target = TargetName::parse(target)?;
    let git_ref = GitRef::new(git_ref)?;
    let config = load_config(config_path)?;
    let ci = CircleCiClient::from_settings(&config.ci)?;

    confirm_production(&TerminalPrompter, target.is_production())?;

    let branch = ci_branch
        .filter(|branch| !branch.is_empty())
        .unwrap_or(git_ref.as_str());
    let request = PipelineRequest::release(
        branch,
        target,
        &git_ref,
        flags.skip_maintenance,
        flags.refresh_db,
    );
    let pipeline = ci.trigger(&request).await?;

    output.success(&ci.describe(&pipeline));
    Ok(())
}
