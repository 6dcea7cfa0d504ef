use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Runtime configuration.
///
/// Sources, lowest precedence first: built-in defaults, `config.toml` in the
/// working directory, then `GROCERY_*` environment variables
/// (e.g. `GROCERY_PORT=9000`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// DDL file applied at startup instead of the bundled schema.
    pub schema_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub loglevel: String,
    pub max_connections: u32,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:grocery-manager.sqlite".to_string(),
            schema_path: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            loglevel: "info".to_string(),
            max_connections: 8,
            body_limit: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GROCERY_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid grocery-manager configuration"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GROCERY_PORT", "9001");
            jail.set_env("GROCERY_SCHEMA_PATH", "db.scheme");

            let cfg = Config::load()?;
            assert_eq!(cfg.port, 9001);
            assert_eq!(cfg.schema_path, Some(PathBuf::from("db.scheme")));
            assert_eq!(cfg.database_url, "sqlite:grocery-manager.sqlite");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_under_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "port = 7000\nloglevel = \"debug\"")?;
            jail.set_env("GROCERY_LOGLEVEL", "warn");

            let cfg = Config::load()?;
            assert_eq!(cfg.port, 7000);
            assert_eq!(cfg.loglevel, "warn");
            assert_eq!(cfg.listen_addr(), "0.0.0.0:7000");
            Ok(())
        });
    }
}
