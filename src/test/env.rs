#[cfg(test)]
mod tests {
    use rocket::figment::Figment;
    use serial_test::serial;

    use crate::env::{DEFAULT_SESSION_TTL_HOURS, PortalConfig, env_files, load_env_file};

    #[test]
    fn test_env_files_per_profile() {
        assert_eq!(
            env_files("production"),
            vec!["config/common.env", "config/prod.env", ".secrets.env"]
        );
        assert_eq!(
            env_files("development"),
            vec!["config/common.env", "config/dev.env", ".secrets.env"]
        );
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        assert!(load_env_file("config/does-not-exist.env").is_ok());
    }

    #[test]
    fn test_portal_config_defaults() {
        let config: PortalConfig = Figment::new().extract().unwrap();

        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert!(config.bootstrap_admin().is_none());
    }

    #[test]
    #[serial]
    fn test_session_ttl_from_rocket_env() {
        temp_env::with_var("ROCKET_SESSION_TTL_HOURS", Some("4"), || {
            let config: PortalConfig = rocket::Config::figment().extract().unwrap();
            assert_eq!(config.session_ttl_hours, 4);
        });
    }

    #[test]
    fn test_bootstrap_admin_needs_both_halves() {
        let both: PortalConfig = Figment::new()
            .merge(("bootstrap_admin_username", "root"))
            .merge(("bootstrap_admin_password", "change-me"))
            .extract()
            .unwrap();
        assert_eq!(both.bootstrap_admin(), Some(("root", "change-me")));

        let username_only: PortalConfig = Figment::new()
            .merge(("bootstrap_admin_username", "root"))
            .extract()
            .unwrap();
        assert!(username_only.bootstrap_admin().is_none());
    }
}
