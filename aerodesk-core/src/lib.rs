pub mod codes;
pub mod notify;

/// Error taxonomy shared by every AeroDesk crate.
///
/// `NotFound` maps to 404, `Validation` to 400 and `Conflict` to 409 at the
/// API boundary. `Internal` carries storage or infrastructure failures and
/// is never shown verbatim to callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CoreError::Internal(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
