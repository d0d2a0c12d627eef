// ABOUTME: Visual-regression commands that trigger CI pipelines.
// ABOUTME: Resolves the preview URL when the target is a branch preview.

use super::load_config;
use crate::cli::BackstopArgs;
use harbormaster::ci::{BackstopRun, CircleCiClient, PipelineRequest};
use harbormaster::config::Config;
use harbormaster::error::Result;
use harbormaster::output::Output;
use harbormaster::preview::{TugboatClient, resolve_preview_url};
use harbormaster::types::TargetName;
use std::path::Path;

/// Pseudo-target that stands for a branch preview.
const PREVIEW_TARGET: &str = "tugboat";

fn validate_target(target: &str) -> Result<()> {
    if target != PREVIEW_TARGET {
        TargetName::parse(target)?;
    }
    Ok(())
}

async fn backstop_run(config: &Config, target: &str, args: BackstopArgs) -> Result<BackstopRun> {
    let tugboat = match (target == PREVIEW_TARGET, args.tugboat) {
        (false, _) => None,
        (true, Some(url)) if !url.is_empty() => Some(url),
        (true, _) => {
            let client = TugboatClient::from_settings(&config.preview)?;
            Some(resolve_preview_url(&client, None, &args.ci_branch).await?)
        }
    };
    Ok(BackstopRun {
        target: target.to_string(),
        list: args.list,
        viewport: args.viewport,
        tugboat,
        cachebuster: args.cachebuster,
    })
}

pub async fn backstop_snapshot(
    config_path: Option<&Path>,
    target: &str,
    args: BackstopArgs,
    output: &Output,
) -> Result<()> {
    validate_target(target)?;
    let config = load_config(config_path)?;
    let ci = CircleCiClient::from_settings(&config.ci)?;

    let branch = args.ci_branch.clone();
    let run = backstop_run(&config, target, args).await?;
    let pipeline = ci
        .trigger(&PipelineRequest::backstop_snapshot(&branch, &run))
        .await?;

    output.success(&ci.describe(&pipeline));
    Ok(())
}

pub async fn backstop_compare(
    config_path: Option<&Path>,
    target: &str,
    reference: &str,
    force_reference: bool,
    args: BackstopArgs,
    output: &Output,
) -> Result<()> {
    validate_target(target)?;
    TargetName::parse(reference)?;
    let config = load_config(config_path)?;
    let ci = CircleCiClient::from_settings(&config.ci)?;

    let branch = args.ci_branch.clone();
    let run = backstop_run(&config, target, args).await?;
    let request = PipelineRequest::backstop_compare(&branch, &run, reference, force_reference);
    let pipeline = ci.trigger(&request).await?;

    output.success(&ci.describe(&pipeline));
    Ok(())
}
