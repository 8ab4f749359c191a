//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
