use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContactListError>;

/// Single field that failed validation, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure raised by the data-access layer.
///
/// Carries the storage engine's numeric error code when the driver exposes
/// one, so retry classification can run on the error value alone without
/// inspecting driver types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataError {
    pub message: String,
    pub code: Option<i32>,
}

impl DataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        // Connection-level failures surface an OS errno through the io error
        // chain; server-side failures have no numeric code.
        let code = std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<std::io::Error>())
            .and_then(|io_err| io_err.raw_os_error());
        Self {
            message: format!("redis error: {err}"),
            code,
        }
    }
}

#[derive(Error, Debug)]
pub enum ContactListError {
    #[error("{0}")]
    NotFound(String),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to create Redis pool: {0}")]
    PoolCreation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContactListError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    /// Engine error code attached to a data-access failure, if any.
    pub fn data_error_code(&self) -> Option<i32> {
        match self {
            Self::Data(data) => data.code,
            _ => None,
        }
    }
}

impl From<redis::RedisError> for ContactListError {
    fn from(err: redis::RedisError) -> Self {
        Self::Data(DataError::from(err))
    }
}

impl From<deadpool_redis::PoolError> for ContactListError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        match err {
            deadpool_redis::PoolError::Backend(redis_err) => Self::Data(DataError::from(redis_err)),
            other => Self::Data(DataError::new(format!("redis pool error: {other}"))),
        }
    }
}
