//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Key cannot be empty or whitespace")]
    InvalidKey,

    #[error("Value cannot be null")]
    InvalidValue,

    #[error("Value of type {found} cannot be read as {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Cache backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Stored payload exists but cannot be read as the requested type.
    pub fn is_unreadable_entry(&self) -> bool {
        matches!(
            self,
            CacheError::TypeMismatch { .. } | CacheError::Deserialization(_)
        )
    }
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
