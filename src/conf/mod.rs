//! Library configuration options.
//!
//! Options are merged from defaults, an optional TOML file and environment
//! variables, in that order.

pub mod executor;
pub mod log;

use std::{collections::HashMap, env};

use config::{
    Config, ConfigError, Environment, File, FileFormat, Source, Value,
};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

#[doc(inline)]
pub use self::{executor::Executor, log::Log};

/// Name of the environment variable holding a path to the configuration file.
pub const APP_CONF_PATH_ENV_VAR_NAME: &str = "GREETER_CONF";

/// Prefix of the environment variables overriding configuration options.
const APP_CONF_ENV_PREFIX: &str = "GREETER";

/// Separator of nested configuration sections in environment variables names.
const APP_CONF_ENV_SEPARATOR: &str = "__";

/// All configuration options of the library.
#[derive(Clone, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct Conf {
    /// Logging settings.
    pub log: Log,

    /// Settings of the background tasks executor.
    pub executor: Executor,
}

impl Source for Conf {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<HashMap<String, Value>, ConfigError> {
        let serialized = toml::to_string(self)
            .map_err(|e| ConfigError::Foreign(Box::new(e)))?;
        File::from_str(&serialized, FileFormat::Toml).collect()
    }
}

impl Conf {
    /// Creates a new [`Conf`] applying values from the following sources (in
    /// the following order):
    /// - default values;
    /// - configuration file, the name of which is given in the
    ///   [`APP_CONF_PATH_ENV_VAR_NAME`] environment variable;
    /// - environment variables prefixed with `GREETER_`, nested sections are
    ///   separated with `__`.
    ///
    /// # Errors
    ///
    /// If the configuration file can't be read, or some value is malformed.
    pub fn parse() -> Result<Self, ConfigError> {
        let mut cfg = Config::new();

        cfg.merge(Self::default())?;

        if let Some(path) = get_conf_file_name(env::var(
            APP_CONF_PATH_ENV_VAR_NAME,
        )) {
            cfg.merge(File::with_name(&path))?;
        }

        cfg.merge(
            Environment::with_prefix(APP_CONF_ENV_PREFIX)
                .separator(APP_CONF_ENV_SEPARATOR),
        )?;

        cfg.try_into()
    }
}

/// Returns the name of the configuration file, if it's defined and non-empty.
fn get_conf_file_name(
    env_var: Result<String, env::VarError>,
) -> Option<String> {
    env_var.ok().filter(|path| !path.is_empty())
}
