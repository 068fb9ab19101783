use thiserror::Error;

/// Generic error type used by service layer functions.
///
/// Route handlers turn each variant into exactly one HTTP status; only
/// [`ServiceError::Internal`] and [`ServiceError::Upload`] reach the
/// on-disk error log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller is not authenticated or supplied bad credentials.
    #[error("unauthorized")]
    Unauthorized,
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Submitted form data is missing or malformed.
    #[error("{0}")]
    Form(String),
    /// A value violated a domain type constraint.
    #[error("{0}")]
    TypeConstraint(String),
    /// A uniqueness rule rejected the request.
    #[error("{0}")]
    Conflict(String),
    /// The image host rejected or failed an upload.
    #[error("image upload failed: {0}")]
    Upload(String),
    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
