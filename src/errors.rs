//! Top-level error of the binary; every crate error converts into it.

use gist_publisher::PublishError;
use patreon_source::SourceFetchError;
use qrng_service::ProviderError;
use question_order::{CacheError, OrderError};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("question source: {0}")]
    Source(#[from] SourceFetchError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("ordering: {0}")]
    Order(#[from] OrderError),

    #[error("random value cache: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
