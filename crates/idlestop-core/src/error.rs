//! Workflow error types

use idlestop_cloud::CloudError;
use idlestop_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdleStopError {
    #[error("Cloud provider error: {0}")]
    Cloud(#[from] CloudError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, IdleStopError>;
