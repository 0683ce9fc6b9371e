use std::fmt;

/// The closed set of failure kinds surfaced by the service layer. The
/// hosting transport maps kinds to status codes (`NotFound` → 404,
/// `InvalidRequest` → 400, `Conflict` → 409, `Forbidden` → 403,
/// `Internal` → 500); the message text is part of the public contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Referenced entity absent, or not in scope of the given tenant.
    NotFound(String),
    /// Well-formed but semantically rejected.
    InvalidRequest(String),
    /// Duplicate creation where uniqueness is expected.
    Conflict(String),
    /// The requester lacks the required privilege.
    Forbidden,
    /// Unexpected failure completing a write.
    Internal(String),
}

impl ServiceError {
    pub fn not_found(msg: &str) -> ServiceError {
        ServiceError::NotFound(msg.to_string())
    }

    pub fn invalid(msg: &str) -> ServiceError {
        ServiceError::InvalidRequest(msg.to_string())
    }

    pub fn conflict(msg: &str) -> ServiceError {
        ServiceError::Conflict(msg.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound(msg)
            | ServiceError::InvalidRequest(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::Internal(msg) => msg,
            ServiceError::Forbidden => {
                "You do not have permission to do that"
            }
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ServiceError {}

impl From<diesel::result::Error> for ServiceError {
    fn from(e: diesel::result::Error) -> ServiceError {
        match e {
            diesel::result::Error::NotFound => {
                ServiceError::NotFound("Not found".to_string())
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
