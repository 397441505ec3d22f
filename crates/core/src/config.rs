use serde::Deserialize;

use crate::validator::{ValidationErrors, Validator, permitted_value};

pub const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment reported by the healthcheck (development|staging|production)
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite:./data/movies.db?mode=rwc".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            db_max_connections: default_db_max_connections(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Config>()
    }

    /// Checks the settings envy cannot reject on type alone.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check(
            permitted_value(&self.environment.as_str(), &ENVIRONMENTS),
            "environment",
            "must be one of development, staging or production",
        );
        v.check(self.port != 0, "port", "must be greater than zero");
        v.check(
            self.db_max_connections > 0,
            "db_max_connections",
            "must be greater than zero",
        );

        if v.valid() { Ok(()) } else { Err(v.into_errors()) }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let vars: Vec<(String, String)> = Vec::new();
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.server_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_overrides_from_env() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("ENVIRONMENT".to_string(), "production".to_string()),
            ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "production");
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_validate_rejects_unknown_environment() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            environment: "qa".to_string(),
            db_max_connections: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors["environment"],
            vec!["must be one of development, staging or production"]
        );
        assert_eq!(errors["db_max_connections"], vec!["must be greater than zero"]);
        assert!(!errors.contains_key("port"));
    }
}
