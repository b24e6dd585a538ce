use crate::core::{Result, SessionError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseSettings,
}

/// Raw database settings as read from configuration.
///
/// Every field is optional at this layer; required keys are enforced when
/// the settings are validated into a `SessionConfig`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub driver: Option<String>,
    pub auto_reconnect: Option<bool>,
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| SessionError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[database]
host = "db.internal"
port = 5432
name = "app"
user = "app_rw"
password = "secret"
driver = "pgsql"
auto_reconnect = true
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        let db = config.database;
        assert_eq!(db.host.unwrap(), "db.internal");
        assert_eq!(db.port.unwrap(), 5432);
        assert_eq!(db.name.unwrap(), "app");
        assert_eq!(db.user.unwrap(), "app_rw");
        assert_eq!(db.password.unwrap(), "secret");
        assert_eq!(db.driver.unwrap(), "pgsql");
        assert_eq!(db.auto_reconnect.unwrap(), true);
    }

    #[test]
    fn test_optional_keys_may_be_absent() {
        let config: Config = toml::from_str(
            r#"
[database]
host = "localhost"
port = 5432
name = "app"
user = "app"
"#,
        )
        .expect("Failed to parse minimal config");
        assert!(config.database.password.is_none());
        assert!(config.database.driver.is_none());
        assert!(config.database.auto_reconnect.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/dbsession.toml");
        assert!(result.is_err());
    }
}
