// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, env var secrets, and config discovery.

use harbormaster::config::*;
use harbormaster::error::Error;
use harbormaster::types::TargetName;
use std::time::Duration;

const MINIMAL: &str = r#"
application: massgov
sites:
  prod:
    uuid: env-prod
    server: massgov.prod@prod.example.com
    root: /var/www/html/massgov.prod/docroot
"#;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config_fills_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.application, "massgov");
        assert_eq!(config.runtime_version, "8.2");
        assert_eq!(config.command_timeout, Duration::from_secs(1800));
        assert_eq!(config.polling.interval, Duration::from_secs(5));
        assert_eq!(config.polling.max_attempts, 720);
        assert_eq!(config.backup.temp_dir, "/mnt/tmp");
        assert_eq!(config.backup.import_script, "../scripts/ma-import-backup");
        assert!(config.backup.download_host_rewrite.is_none());
        assert_eq!(config.drush.path, "../vendor/bin/drush");
        assert_eq!(config.purge.paths.len(), 3);
        assert_eq!(config.purge.paths[0], "");
        assert_eq!(config.cloud.base_url, "https://cloud.acquia.com/api");
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
application: massgov
runtime_version: "8.3"
command_timeout: 10m
sites:
  test:
    uuid: env-test
    server:
      host: test.example.com
      port: 2222
      user: massgov.test
    root: /var/www/html/massgov.test/docroot
  feature3:
    uuid: env-f3
    server: massgov.dev@dev.example.com:2200
    root: /var/www/html/massgov.dev/docroot
drush:
  path: /usr/local/bin/drush
cloud:
  base_url: https://cloud.example.com/api
  key: literal-key
  secret:
    env: MY_SECRET
polling:
  interval: 2s
  max_attempts: 10
backup:
  temp_dir: /tmp
  download_host_rewrite:
    from: a.example.com
    to: b.example.com
purge:
  content_query: SELECT 1
  paths: ["/news"]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.runtime_version, "8.3");
        assert_eq!(config.command_timeout, Duration::from_secs(600));
        assert_eq!(config.drush.path, "/usr/local/bin/drush");
        assert_eq!(config.cloud.key, EnvValue::Literal("literal-key".to_string()));
        assert_eq!(config.cloud.secret, EnvValue::env("MY_SECRET"));
        assert_eq!(config.polling.interval, Duration::from_secs(2));
        assert_eq!(
            config.backup.download_host_rewrite,
            Some(HostRewrite {
                from: "a.example.com".to_string(),
                to: "b.example.com".to_string(),
            })
        );
        assert_eq!(config.purge.paths, vec!["/news".to_string()]);

        let test = config.site(TargetName::Test).unwrap();
        assert_eq!(test.id.as_str(), "env-test");
        assert_eq!(test.server.port, 2222);
        assert_eq!(test.server.user.as_deref(), Some("massgov.test"));

        let feature = config.site(TargetName::Feature3).unwrap();
        assert_eq!(feature.server.host, "dev.example.com");
        assert_eq!(feature.server.port, 2200);
        assert!(!feature.is_production());
    }

    #[test]
    fn unknown_site_is_reported() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        let err = config.site(TargetName::Cd).unwrap_err();
        assert!(matches!(err, Error::UnknownSite(TargetName::Cd)));
    }

    #[test]
    fn template_parses_and_covers_test_and_prod() {
        let config = Config::template();
        assert!(config.site(TargetName::Prod).unwrap().is_production());
        assert!(config.site(TargetName::Test).is_ok());
    }
}

mod validation {
    use super::*;

    #[test]
    fn unknown_target_key_is_rejected() {
        let yaml = MINIMAL.replace("  prod:", "  staging:");
        assert!(matches!(Config::from_yaml(&yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn empty_application_is_rejected() {
        let yaml = MINIMAL.replace("application: massgov", "application: \"  \"");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("application cannot be empty"));
    }

    #[test]
    fn zero_poll_attempts_are_rejected() {
        let yaml = format!("{}polling:\n  max_attempts: 0\n", MINIMAL);
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn empty_docroot_is_rejected() {
        let yaml = MINIMAL.replace("root: /var/www/html/massgov.prod/docroot", "root: \"\"");
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("sites.prod.root"));
    }

    #[test]
    fn bad_server_port_is_rejected() {
        let yaml = MINIMAL.replace("prod.example.com", "prod.example.com:notaport");
        assert!(Config::from_yaml(&yaml).is_err());
    }
}

mod secrets {
    use super::*;

    #[test]
    fn cloud_credentials_come_from_environment() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        temp_env::with_vars(
            [("AC_API2_KEY", Some("key-1")), ("AC_API2_SECRET", Some("secret-1"))],
            || {
                assert_eq!(config.cloud.key.resolve().unwrap(), "key-1");
                assert_eq!(config.cloud.secret.resolve().unwrap(), "secret-1");
            },
        );
    }

    #[test]
    fn missing_ci_token_names_the_variable() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        temp_env::with_var_unset("CIRCLECI_PERSONAL_API_TOKEN", || {
            let err = config.ci.token.resolve().unwrap_err();
            assert!(err.to_string().contains("CIRCLECI_PERSONAL_API_TOKEN"));
        });
    }

    #[test]
    fn tracking_user_defaults_to_empty() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        temp_env::with_var_unset("AC_API_USER", || {
            assert_eq!(config.tracking.user.resolve().unwrap(), "");
        });
    }
}

mod discovery {
    use super::*;
    use std::fs;

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.application, "massgov");
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".harbormaster")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("myapp"), false).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.application, "myapp");
        assert!(config.site(TargetName::Test).is_ok());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, false).unwrap();
        let err = init_config(dir.path(), None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
        assert!(init_config(dir.path(), None, true).is_ok());
    }
}
