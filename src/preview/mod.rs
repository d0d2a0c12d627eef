// ABOUTME: Preview-hosting client for per-branch preview environments.
// ABOUTME: Looks up previews by branch and requests rebuilds.

use serde::Deserialize;
use serde_json::json;

use crate::config::PreviewSettings;
use crate::error::Error;
use crate::http::{self, Result};
use crate::types::PreviewId;

const SERVICE: &str = "Tugboat";

#[derive(Debug, Clone, Deserialize)]
pub struct Preview {
    pub id: PreviewId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub provider_ref: Option<ProviderRef>,
    #[serde(default)]
    pub provider_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRef {
    #[serde(default)]
    pub head: Option<HeadRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadRef {
    #[serde(rename = "ref")]
    pub name: String,
}

impl Preview {
    /// Whether this preview was built from `branch`.
    pub fn matches_branch(&self, branch: &str) -> bool {
        let head_matches = self
            .provider_ref
            .as_ref()
            .and_then(|r| r.head.as_ref())
            .is_some_and(|head| head.name == branch);
        let id_matches = self
            .provider_id
            .as_ref()
            .and_then(|id| id.as_str())
            .is_some_and(|id| id == format!("refs/heads/{}", branch));
        head_matches || id_matches
    }
}

/// First preview built from `branch`.
pub fn find_branch_preview<'a>(previews: &'a [Preview], branch: &str) -> Option<&'a Preview> {
    previews.iter().find(|p| p.matches_branch(branch))
}

/// Branch whose preview should be used for a CI run.
///
/// `develop` is the CI default, so it stands for "whatever is checked out".
pub fn preview_branch<'a>(ci_branch: &'a str, checked_out: Option<&'a str>) -> Option<&'a str> {
    if ci_branch == "develop" {
        checked_out.filter(|b| !b.is_empty())
    } else {
        Some(ci_branch)
    }
}

pub struct TugboatClient {
    client: reqwest::Client,
    api_url: String,
    repository: String,
    token: String,
}

impl TugboatClient {
    pub fn from_settings(settings: &PreviewSettings) -> crate::error::Result<Self> {
        let token = settings.token.resolve()?;
        Ok(Self {
            client: http::client(true)?,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            repository: settings.repository.clone(),
            token,
        })
    }

    pub async fn previews(&self) -> Result<Vec<Preview>> {
        let url = format!("{}/repos/{}/previews", self.api_url, self.repository);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(http::ensure_success(SERVICE, resp).await?.json().await?)
    }

    pub async fn preview_for_branch(&self, branch: &str) -> Result<Option<Preview>> {
        let previews = self.previews().await?;
        let found = find_branch_preview(&previews, branch).cloned();
        if found.is_some() {
            tracing::info!("Fetched preview for branch {}", branch);
        }
        Ok(found)
    }

    /// Rebuild a preview and its children from scratch.
    pub async fn rebuild(&self, id: &PreviewId) -> Result<()> {
        let url = format!("{}/previews/{}/rebuild", self.api_url, id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "children": true, "force": true }))
            .send()
            .await?;
        http::ensure_success(SERVICE, resp).await?;
        Ok(())
    }
}

/// Name of the branch checked out in the current directory.
pub async fn current_git_branch() -> crate::error::Result<Option<String>> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .await?;
    if !output.status.success() {
        return Ok(None);
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!branch.is_empty()).then_some(branch))
}

/// URL of the preview a visual-regression run should target.
///
/// An explicit URL wins; otherwise the preview built from the CI branch (or
/// the checked-out branch when CI runs `develop`) is looked up.
pub async fn resolve_preview_url(
    client: &TugboatClient,
    explicit: Option<&str>,
    ci_branch: &str,
) -> crate::error::Result<String> {
    if let Some(url) = explicit.filter(|url| !url.is_empty()) {
        return Ok(url.to_string());
    }

    let checked_out = if ci_branch == "develop" {
        current_git_branch().await?
    } else {
        None
    };
    let branch = preview_branch(ci_branch, checked_out.as_deref()).ok_or_else(|| {
        Error::InvalidArgument(
            "unable to determine current branch; pass --tugboat".to_string(),
        )
    })?;

    client
        .preview_for_branch(branch)
        .await?
        .and_then(|preview| preview.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unable to find a preview for branch {}; pass --tugboat",
                branch
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn previews() -> Vec<Preview> {
        serde_json::from_str(
            r#"[
                {"id": "p1", "url": "https://p1.tugboat.qa", "provider_ref": {"head": {"ref": "feature/a"}}},
                {"id": "p2", "url": "https://p2.tugboat.qa", "provider_id": "refs/heads/feature/b"},
                {"id": "p3", "provider_id": 1234}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn matches_on_head_ref() {
        let previews = previews();
        let found = find_branch_preview(&previews, "feature/a").unwrap();
        assert_eq!(found.id.as_str(), "p1");
    }

    #[test]
    fn matches_on_provider_id() {
        let previews = previews();
        let found = find_branch_preview(&previews, "feature/b").unwrap();
        assert_eq!(found.url.as_deref(), Some("https://p2.tugboat.qa"));
    }

    #[test]
    fn missing_branch_finds_nothing() {
        assert!(find_branch_preview(&previews(), "main").is_none());
    }

    #[test]
    fn develop_means_checked_out_branch() {
        assert_eq!(preview_branch("develop", Some("feature/x")), Some("feature/x"));
        assert_eq!(preview_branch("develop", None), None);
        assert_eq!(preview_branch("feature/y", Some("feature/x")), Some("feature/y"));
    }
}
