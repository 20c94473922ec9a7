use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{GenerationLogLevel, LoggerConfig};

/// Name of the configuration file looked up from the current directory.
pub const CONFIG_FILE_NAME: &str = "matmul-testgen.toml";

/// Environment variable enabling debug logging, see [GeneratorConfig::with_debug_log].
pub const DEBUG_LOG_ENV: &str = "MATMUL_TESTGEN_DEBUG_LOG";

const DEFAULT_LOG_FILE: &str = "/tmp/matmul-testgen.log";

/// Configuration of the generator that isn't part of the generated tests themselves.
#[derive(Default, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    /// Configuration of the generation logger.
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// The configuration file exists but can't be used.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Unable to read config file {path}\nCaused by:\n  {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The config file {path} doesn't have the right format\nCaused by:\n  {source}")]
    Format {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl GeneratorConfig {
    /// Loads the configuration from the current directory, then applies environment overrides.
    pub fn load() -> Result<Self, ConfigFileError> {
        Ok(Self::from_current_dir()?.override_from_env())
    }

    /// Loads `matmul-testgen.toml` from `dir` or its closest parent containing one.
    ///
    /// Returns the default configuration if there is none.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigFileError> {
        let mut dir = dir.as_ref().to_path_buf();

        loop {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                log::debug!("Using config file {}", path.display());
                return Self::from_file_path(path);
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(Self::default())
    }

    fn from_current_dir() -> Result<Self, ConfigFileError> {
        let dir = std::env::current_dir().map_err(|source| ConfigFileError::Io {
            path: PathBuf::from("."),
            source,
        })?;

        Self::from_dir(dir)
    }

    /// Loads the configuration from a specific file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigFileError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(self) -> Self {
        match std::env::var(DEBUG_LOG_ENV) {
            Ok(val) => self.with_debug_log(&val),
            Err(_) => self,
        }
    }

    /// Applies a debug log setting:
    ///
    /// - `stdout` / `stderr`: full logging to that stream.
    /// - `1` / `true`: full logging to `/tmp/matmul-testgen.log`.
    /// - `0` / `false`: logging disabled.
    /// - anything else: full logging to that file path.
    pub fn with_debug_log(mut self, val: &str) -> Self {
        let logger = &mut self.logger;
        logger.level = GenerationLogLevel::Full;

        match val {
            "stdout" => logger.stdout = true,
            "stderr" => logger.stderr = true,
            "1" | "true" => logger.file = Some(DEFAULT_LOG_FILE.into()),
            "0" | "false" => logger.level = GenerationLogLevel::Disabled,
            file_path => logger.file = Some(file_path.into()),
        }

        self
    }
}
