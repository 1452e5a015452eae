use crate::core::{AdapterError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level settings structure parsed from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Whether timestamps are timezone-aware; requires the session to run in UTC.
    #[serde(rename = "USE_TZ", default)]
    pub use_tz: bool,
    /// Connection settings keyed by alias.
    #[serde(rename = "DATABASES", default)]
    pub databases: BTreeMap<String, DatabaseSettings>,
}

/// Connection settings for one database alias.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: Option<PortSetting>,
    pub options: BTreeMap<String, toml::Value>,
}

/// `PORT` may be written as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PortSetting {
    Number(i64),
    Text(String),
}

impl PortSetting {
    /// Resolves the port; an empty string means unset.
    pub fn resolve(&self) -> Result<Option<i64>> {
        match self {
            PortSetting::Number(port) => Ok(Some(*port)),
            PortSetting::Text(text) if text.trim().is_empty() => Ok(None),
            PortSetting::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AdapterError::Configuration(format!("PORT '{}' is not a number", text))),
        }
    }
}

impl DatabaseSettings {
    pub fn new(name: impl Into<String>) -> Self {
        DatabaseSettings {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Config {
    /// Settings for `alias`, or a configuration error if it is not declared.
    pub fn database(&self, alias: &str) -> Result<&DatabaseSettings> {
        self.databases
            .get(alias)
            .ok_or_else(|| AdapterError::Configuration(format!("database alias '{}' is not configured", alias)))
    }
}

/// Loads settings from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = pgbackend::config::load_config("settings.toml").expect("Failed to load settings");
/// println!("{:?}", config.database("default"));
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Default settings location, `<config dir>/pgbackend/settings.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pgbackend").join("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
USE_TZ = true

[DATABASES.default]
NAME = "app"
USER = "app_user"
PASSWORD = "secret"
HOST = "db.internal"
PORT = 5433

[DATABASES.default.OPTIONS]
autocommit = true
sslmode = "require"

[DATABASES.reporting]
NAME = "reports"
PORT = "6432"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert!(config.use_tz);

        let default = config.database("default").unwrap();
        assert_eq!(default.name, "app");
        assert_eq!(default.user, "app_user");
        assert_eq!(default.port, Some(PortSetting::Number(5433)));
        assert_eq!(default.options.get("autocommit"), Some(&toml::Value::Boolean(true)));

        let reporting = config.database("reporting").unwrap();
        assert_eq!(reporting.host, "");
        assert!(reporting.options.is_empty());
        assert_eq!(reporting.port.as_ref().unwrap().resolve().unwrap(), Some(6432));
    }

    #[test]
    fn test_missing_alias() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).unwrap();
        match config.database("missing") {
            Err(AdapterError::Configuration(msg)) => assert!(msg.contains("missing")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_port_resolution() {
        assert_eq!(PortSetting::Text(String::new()).resolve().unwrap(), None);
        assert_eq!(PortSetting::Number(0).resolve().unwrap(), Some(0));
        assert!(PortSetting::Text("abc".to_string()).resolve().is_err());
    }
}
