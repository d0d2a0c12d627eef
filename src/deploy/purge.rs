// ABOUTME: Selective cache purge after a deploy.
// ABOUTME: Invalidates content found by a query by tag and a fixed set of paths directly.

use crate::config::PurgeSettings;
use crate::error::Result;
use crate::remote::{Drush, RemoteShell};

/// What a purge run invalidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeTargets {
    pub node_ids: Vec<u64>,
    pub paths: Vec<String>,
}

impl PurgeTargets {
    /// Cache tags for the queried content, e.g. `node:1,node:2`.
    pub fn tags(&self) -> Option<String> {
        if self.node_ids.is_empty() {
            return None;
        }
        let tags: Vec<String> = self.node_ids.iter().map(|id| format!("node:{}", id)).collect();
        Some(tags.join(","))
    }
}

/// Summary of an enqueued purge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub tagged_nodes: usize,
    pub paths: usize,
}

/// Parse query output into content IDs, one per line.
pub fn parse_node_ids(output: &str) -> Vec<u64> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.parse().ok())
        .collect()
}

/// PHP snippet that queues one path for purging.
pub fn purge_path_snippet(path: &str) -> String {
    let escaped = path.replace('\\', "\\\\").replace('\'', "\\'");
    format!("\\Drupal::service('manual_purger')->purgePath('{}');", escaped)
}

pub async fn selective_purge(
    shell: &dyn RemoteShell,
    drush: &Drush,
    settings: &PurgeSettings,
) -> Result<PurgeReport> {
    let output = shell
        .must_run(&drush.command("sql:query").arg(&settings.content_query).render())
        .await?;
    let targets = PurgeTargets {
        node_ids: parse_node_ids(&output.stdout),
        paths: settings.paths.clone(),
    };

    if let Some(tags) = targets.tags() {
        shell
            .must_run(&drush.command("cache:tags").arg(tags).render())
            .await?;
        tracing::info!(count = targets.node_ids.len(), "Queued content for purge");
    }

    for path in &targets.paths {
        shell
            .must_run(&drush.command("ev").arg(purge_path_snippet(path)).render())
            .await?;
    }
    tracing::info!("Queued purge of {} well-known paths", targets.paths.len());

    Ok(PurgeReport {
        tagged_nodes: targets.node_ids.len(),
        paths: targets.paths.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_skips_blank_lines() {
        assert_eq!(parse_node_ids("12\n\n 34 \nnid\n"), vec![12, 34]);
        assert!(parse_node_ids("").is_empty());
    }

    #[test]
    fn tags_join_node_ids() {
        let targets = PurgeTargets {
            node_ids: vec![1, 2],
            paths: vec![],
        };
        assert_eq!(targets.tags().as_deref(), Some("node:1,node:2"));
        assert_eq!(PurgeTargets::default().tags(), None);
    }

    #[test]
    fn snippet_wraps_path() {
        assert_eq!(
            purge_path_snippet("/orgs/office-of-the-governor"),
            "\\Drupal::service('manual_purger')->purgePath('/orgs/office-of-the-governor');"
        );
        assert_eq!(
            purge_path_snippet(""),
            "\\Drupal::service('manual_purger')->purgePath('');"
        );
    }
}
