use core::fmt::Display;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Configuration of the generation logger.
///
/// Note that multiple outputs can be enabled at the same time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoggerConfig {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional forwarding to the `log` crate at the given level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// How much of the generation is reported.
    #[serde(default)]
    pub level: GenerationLogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: GenerationLogLevel::default(),
        }
    }
}

fn append_default() -> bool {
    true
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    #[default]
    #[serde(rename = "info")]
    Info,

    #[serde(rename = "debug")]
    Debug,

    #[serde(rename = "trace")]
    Trace,
}

/// Verbosity of the generation logger.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum GenerationLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// A summary of each generation run.
    #[serde(rename = "basic")]
    Basic,

    /// Every generated function and call.
    #[serde(rename = "full")]
    Full,
}

/// Reports generation events to the outputs selected by a [LoggerConfig].
#[derive(Debug)]
pub struct GenerationLogger {
    loggers: Vec<LoggerKind>,
    level: GenerationLogLevel,
}

impl Default for GenerationLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl GenerationLogger {
    /// Creates the logger, opening the log file if one is configured.
    pub fn new(config: &LoggerConfig) -> std::io::Result<Self> {
        let mut loggers = Vec::new();

        if let GenerationLogLevel::Disabled = config.level {
            return Ok(Self::disabled());
        }

        if let Some(file) = &config.file {
            loggers.push(LoggerKind::File(FileLogger::new(file, config.append)?));
        }
        if config.stdout {
            loggers.push(LoggerKind::Stdout);
        }
        if config.stderr {
            loggers.push(LoggerKind::Stderr);
        }
        if let Some(level) = config.log {
            loggers.push(LoggerKind::Log(level));
        }

        Ok(Self {
            loggers,
            level: config.level,
        })
    }

    /// A logger that drops every message.
    pub fn disabled() -> Self {
        Self {
            loggers: Vec::new(),
            level: GenerationLogLevel::Disabled,
        }
    }

    /// Logs a message to all configured outputs.
    pub fn log_generation<S: Display>(&mut self, msg: &S) {
        if self.loggers.len() > 1 {
            let msg = msg.to_string();
            for logger in self.loggers.iter_mut() {
                logger.log(&msg);
            }
        } else if let Some(logger) = self.loggers.first_mut() {
            logger.log(msg);
        }
    }

    pub fn log_level(&self) -> GenerationLogLevel {
        self.level
    }
}

#[derive(Debug)]
enum LoggerKind {
    File(FileLogger),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileLogger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileLogger {
    fn new(path: &Path, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    // Flushes on every message so the log is complete even if the run aborts.
    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());

        if let Err(err) = result {
            log::warn!("Unable to write to log file {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_level_ignores_outputs() {
        let config = LoggerConfig {
            stdout: true,
            ..Default::default()
        };
        let logger = GenerationLogger::new(&config).unwrap();

        assert!(logger.loggers.is_empty());
        assert_eq!(logger.log_level(), GenerationLogLevel::Disabled);
    }

    #[test]
    fn file_logger_writes_each_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generation.log");
        let config = LoggerConfig {
            file: Some(path.clone()),
            level: GenerationLogLevel::Full,
            ..Default::default()
        };

        let mut logger = GenerationLogger::new(&config).unwrap();
        logger.log_generation(&"first");
        logger.log_generation(&format!("second {}", 2));

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "first\nsecond 2\n");
    }

    #[test]
    fn levels_parse_from_toml() {
        let config: LoggerConfig = toml::from_str(
            r#"
            stderr = true
            log = "debug"
            level = "basic"
            "#,
        )
        .unwrap();

        assert!(config.stderr);
        assert!(config.append);
        assert_eq!(config.log, Some(LogCrateLevel::Debug));
        assert_eq!(config.level, GenerationLogLevel::Basic);
    }
}
