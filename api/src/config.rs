//! Configuration loading
//!
//! Layers, later ones win:
//! 1. Built-in defaults for the detected environment
//! 2. `config/{environment}.toml`, if present
//! 3. `DEVLINK__`-prefixed environment variables, `__` between sections
//!    (`DEVLINK__SERVER__PORT=9000`, `DEVLINK__EMAIL__API_KEY=...`)

use config::{Config, ConfigError, Environment as EnvSource, File};

use dl_shared::config::{AppConfig, Environment};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "DEVLINK";

/// Load the configuration for the environment named by `ENVIRONMENT`
pub fn load() -> Result<AppConfig, ConfigError> {
    load_for(Environment::from_env())
}

/// Load the configuration for `environment`
pub fn load_for(environment: Environment) -> Result<AppConfig, ConfigError> {
    let defaults = Config::try_from(&AppConfig::for_environment(environment))?;

    let settings = Config::builder()
        .add_source(defaults)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    // The detected environment wins over anything a file might claim
    config.environment = environment;
    config.rate_limit.validate().map_err(ConfigError::Message)?;
    Ok(config)
}
