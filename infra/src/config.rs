//! Layered configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Built-in baseline for the environment (`AppConfig::for_environment`)
//! 2. `config.<environment>.{toml,yaml,json}` in the config directory (optional)
//! 3. `DT__SECTION__FIELD` environment variables
//!
//! `.env` files are loaded into the process environment beforehand.

use ::config::{Config, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dt_shared::{AppConfig, Environment};

use crate::InfrastructureError;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "DT";

/// Load configuration for the current process
///
/// Reads `.env` (if present), detects the environment from
/// `ENVIRONMENT` / `ENV` / `RUST_ENV` and looks for config files in the
/// working directory.
pub fn load_app_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();

    ConfigLoader::new(environment).load()
}

/// Builder for a layered configuration load
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    environment: Environment,
    config_dir: PathBuf,
    env_overrides: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            config_dir: PathBuf::from("."),
            env_overrides: None,
        }
    }

    /// Directory searched for `config.<environment>.*`
    pub fn with_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Use these variables instead of the process environment
    pub fn with_env_overrides(mut self, vars: HashMap<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    /// First existing `config.<environment>.<ext>` in the config directory
    fn config_file(&self) -> Option<PathBuf> {
        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| {
                self.config_dir
                    .join(format!("{}.{}", self.environment.config_file(), ext))
            })
            .find(|path| path.is_file())
    }

    pub fn load(&self) -> Result<AppConfig, InfrastructureError> {
        let baseline = AppConfig::for_environment(self.environment);

        let env_source = ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env_overrides.clone());

        let mut builder = Config::builder().add_source(Config::try_from(&baseline)?);
        if let Some(path) = self.config_file() {
            tracing::debug!(path = %path.display(), "Using configuration file");
            builder = builder.add_source(File::from(path));
        }
        let settings = builder.add_source(env_source).build()?;

        let config: AppConfig = settings.try_deserialize()?;

        config
            .verification
            .validate()
            .map_err(InfrastructureError::Config)?;

        if config.environment.is_production() {
            if !config.database.is_production() {
                tracing::warn!("Production environment is pointed at a local database");
            }
            if config.verification.expose_codes_on_failure {
                tracing::warn!("Production environment exposes codes when delivery fails");
            }
        }

        tracing::debug!(
            environment = %config.environment,
            cache_backend = ?config.cache.backend,
            delivery_mode = ?config.verification.delivery_mode,
            "Configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_shared::{CacheBackend, DeliveryMode};
    use std::io::Write;

    fn empty_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_baseline_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new(Environment::Production)
            .with_config_dir(dir.path())
            .with_env_overrides(empty_env())
            .load()
            .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.verification.verification_ttl_minutes, 10);
        assert!(!config.verification.expose_codes_on_failure);
    }

    #[test]
    fn test_production_against_local_database_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut vars = HashMap::new();
        vars.insert(
            "DT__DATABASE__URL".to_string(),
            "mysql://localhost:3306/debt_tracker".to_string(),
        );

        let config = ConfigLoader::new(Environment::Production)
            .with_config_dir(dir.path())
            .with_env_overrides(vars)
            .load()
            .unwrap();

        assert!(config.environment.is_production());
        assert!(!config.database.is_production());
    }

    #[test]
    fn test_file_overrides_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("config.development.toml")).unwrap();
        writeln!(
            file,
            "[verification]\nreset_ttl_minutes = 30\ndelivery_mode = \"background\"\n"
        )
        .unwrap();

        let config = ConfigLoader::new(Environment::Development)
            .with_config_dir(dir.path())
            .with_env_overrides(empty_env())
            .load()
            .unwrap();

        assert_eq!(config.verification.reset_ttl_minutes, 30);
        assert_eq!(config.verification.delivery_mode, DeliveryMode::Background);
        // Untouched fields keep the baseline
        assert_eq!(config.verification.code_length, 6);
        assert!(config.verification.expose_codes_on_failure);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.development.toml"),
            "[verification]\nrate_limit_count = 10\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("DT__VERIFICATION__RATE_LIMIT_COUNT".to_string(), "3".to_string());
        vars.insert("DT__CACHE__BACKEND".to_string(), "redis".to_string());

        let config = ConfigLoader::new(Environment::Development)
            .with_config_dir(dir.path())
            .with_env_overrides(vars)
            .load()
            .unwrap();

        assert_eq!(config.verification.rate_limit_count, 3);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut vars = HashMap::new();
        vars.insert("DT__VERIFICATION__CODE_LENGTH".to_string(), "0".to_string());

        let result = ConfigLoader::new(Environment::Development)
            .with_config_dir(dir.path())
            .with_env_overrides(vars)
            .load();

        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }
}
