use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Replay environment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnvConfig {
    /// Directory of historical order book CSV files
    pub data_dir: PathBuf,
    /// Cash balance at episode start
    pub starting_cash: Decimal,
    /// Security balance at episode start
    pub starting_security: Decimal,
    /// Log per-step diagnostics
    #[serde(default)]
    pub debug: bool,
}

impl EnvConfig {
    /// Build a configuration directly (CLI and tests)
    pub fn new<P: AsRef<Path>>(data_dir: P, starting_cash: Decimal, starting_security: Decimal) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            starting_cash,
            starting_security,
            debug: false,
        }
    }

    /// Load configuration from `config/` and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory.
    ///
    /// Layering: built-in defaults, then an optional `bourse.toml`, then
    /// `BOURSE__*` environment variables (e.g. `BOURSE__DATA_DIR`).
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("data_dir", "data")?
            .set_default("starting_cash", "1000")?
            .set_default("starting_security", "0")?
            .set_default("debug", false)?
            .add_source(File::from(config_dir.join("bourse.toml")).required(false))
            .add_source(
                Environment::with_prefix("BOURSE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if self.starting_cash < Decimal::ZERO {
            errors.push("starting_cash must be non-negative".to_string());
        }

        if self.starting_security < Decimal::ZERO {
            errors.push("starting_security must be non-negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        use rust_decimal_macros::dec;

        Self {
            data_dir: PathBuf::from("data"),
            starting_cash: dec!(1000),
            starting_security: Decimal::ZERO,
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_validate() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_balances_are_rejected() {
        let config = EnvConfig::new("data", dec!(-1), dec!(-2));
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
