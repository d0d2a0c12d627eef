// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates harbormaster.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TargetName;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, application: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(app) = application {
        if app.trim().is_empty() {
            return Err(Error::InvalidConfig("application cannot be empty".to_string()));
        }
        config.application = app.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let mut sites = String::new();
    let mut names: Vec<_> = config.sites.keys().copied().collect();
    names.sort();
    for name in names {
        let site = &config.sites[&name];
        sites.push_str(&format!(
            "  {}:\n    uuid: {}\n    server: {}@{}\n    root: {}\n",
            name,
            site.uuid,
            site.server.user.as_deref().unwrap_or("deploy"),
            site.server.host,
            site.root
        ));
    }

    format!(
        r#"application: {}
runtime_version: "{}"

# One alias per target: {}
sites:
{}
# Credentials are read from the environment by default:
#   AC_API2_KEY / AC_API2_SECRET, CIRCLECI_PERSONAL_API_TOKEN, TUGBOAT_ACCESS_TOKEN,
#   MASS_NEWRELIC_APPLICATION / MASS_NEWRELIC_KEY / AC_API_USER
polling:
  interval: {}s
  max_attempts: {}

backup:
  temp_dir: {}
  import_script: {}
"#,
        config.application,
        config.runtime_version,
        TargetName::ALL
            .iter()
            .map(TargetName::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        sites,
        config.polling.interval.as_secs(),
        config.polling.max_attempts,
        config.backup.temp_dir,
        config.backup.import_script,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_template_parses() {
        let yaml = generate_template_yaml(&Config::template());
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.application, "massgov");
        assert!(config.site(TargetName::Prod).is_ok());
        assert!(config.site(TargetName::Test).is_ok());
    }
}
