// ABOUTME: Preview rebuild command.
// ABOUTME: A branch without a preview is reported as a warning, not an error.

use super::load_config;
use harbormaster::error::Result;
use harbormaster::output::Output;
use harbormaster::preview::TugboatClient;
use std::path::Path;

pub async fn preview_rebuild(
    config_path: Option<&Path>,
    branch: &str,
    output: &Output,
) -> Result<()> {
    let config = load_config(config_path)?;
    let client = TugboatClient::from_settings(&config.preview)?;

    let Some(preview) = client.preview_for_branch(branch).await? else {
        output.warning(&format!("No preview found for branch {}", branch));
        return Ok(());
    };

    client.rebuild(&preview.id).await?;
    output.success(&format!("Preview rebuild started for {} (id={})", branch, preview.id));
    Ok(())
}
