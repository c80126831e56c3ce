use std::path::PathBuf;

use tracing::warn;
use tracing_subscriber::EnvFilter;

const LIDARNAV_CONFIG_ENV_NAME: &str = "LIDARNAV_CONFIG_PATH";

/// Path given on the command line, else the value of `LIDARNAV_CONFIG_PATH`.
pub fn get_config_path(config: Option<PathBuf>) -> Option<PathBuf> {
    config.or_else(|| {
        let path = PathBuf::from(std::env::var_os(LIDARNAV_CONFIG_ENV_NAME)?);
        warn!(?path, "using config path from {LIDARNAV_CONFIG_ENV_NAME}");
        Some(path)
    })
}

/// Installs the `fmt` subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    // One test owns the variable, so no other test races on it.
    #[test]
    fn test_config_path_precedence() {
        std::env::remove_var(LIDARNAV_CONFIG_ENV_NAME);
        assert_eq!(get_config_path(None), None);
        assert_eq!(
            get_config_path(Some("cli.toml".into())),
            Some(PathBuf::from("cli.toml"))
        );

        std::env::set_var(LIDARNAV_CONFIG_ENV_NAME, "config/carter_navigation.toml");
        assert_eq!(
            get_config_path(None),
            Some(PathBuf::from("config/carter_navigation.toml"))
        );
        assert_eq!(
            get_config_path(Some("cli.toml".into())),
            Some(PathBuf::from("cli.toml"))
        );

        // An empty value is still a path; loading it reports the missing file.
        std::env::set_var(LIDARNAV_CONFIG_ENV_NAME, "");
        assert_eq!(get_config_path(None), Some(PathBuf::new()));
        std::env::remove_var(LIDARNAV_CONFIG_ENV_NAME);
    }
}
