//! Conversions from layer-specific errors into [`ServiceError`].

use crate::domain::types::TypeConstraintError;
use crate::forms::import_export::UploadParseError;
use crate::forms::questions::AddQuestionFormError;
use crate::forms::users::{EditUserFormError, LoginFormError, RegisterFormError};
use crate::repository::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<UploadParseError> for ServiceError {
    fn from(val: UploadParseError) -> Self {
        match val {
            UploadParseError::ReadFailed => ServiceError::Internal(val.to_string()),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<RegisterFormError> for ServiceError {
    fn from(val: RegisterFormError) -> Self {
        match val {
            RegisterFormError::PictureRead => ServiceError::Internal(val.to_string()),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<EditUserFormError> for ServiceError {
    fn from(val: EditUserFormError) -> Self {
        match val {
            EditUserFormError::PictureRead => ServiceError::Internal(val.to_string()),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

impl From<LoginFormError> for ServiceError {
    fn from(val: LoginFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<AddQuestionFormError> for ServiceError {
    fn from(val: AddQuestionFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
