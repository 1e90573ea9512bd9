use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Config file not found: {0}\n\
        IDLESTOP_CONFIG_PATH must point to an existing file"
    )]
    ConfigFileNotFound(String),

    #[error("Invalid trigger time '{0}': expected HH:MM (UTC)")]
    InvalidTriggerTime(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
