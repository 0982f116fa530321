use thiserror::Error;

/// Errors surfaced by the storage backends.
///
/// Callers on cache/query paths are expected to treat these as a miss
/// (fail open); the append path logs and swallows them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying Redis command or connection failure.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backing store is unreachable or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
