use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::domain::types::{Email, Username};

#[derive(MultipartForm)]
pub struct RegisterForm {
    pub username: Option<Text<String>>,
    pub password: Option<Text<String>>,
    pub email: Option<Text<String>>,
    #[multipart(rename = "profilePicture", limit = "5MB")]
    pub profile_picture: Option<TempFile>,
}

#[derive(Debug)]
pub struct RegisterPayload {
    pub username: Username,
    pub password: String,
    pub email: Email,
    pub profile_picture: Option<Vec<u8>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterFormError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Password is required")]
    MissingPassword,
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("failed to read profile picture")]
    PictureRead,
}

impl TryFrom<RegisterForm> for RegisterPayload {
    type Error = RegisterFormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        let username = text_field(form.username)
            .and_then(|value| Username::new(value).ok())
            .ok_or(RegisterFormError::MissingUsername)?;
        let password = text_field(form.password).ok_or(RegisterFormError::MissingPassword)?;
        let email = text_field(form.email).ok_or(RegisterFormError::MissingEmail)?;
        let email = Email::new(email).map_err(|_| RegisterFormError::InvalidEmail)?;
        let profile_picture =
            read_picture(form.profile_picture).map_err(|_| RegisterFormError::PictureRead)?;

        Ok(Self {
            username,
            password,
            email,
            profile_picture,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginFormError {
    #[error("Email and password are required")]
    MissingCredentials,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = LoginFormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()
            .map_err(|_| LoginFormError::MissingCredentials)?;
        match (form.email, form.password) {
            (Some(email), Some(password)) => Ok(Self {
                email: email.trim().to_string(),
                password,
            }),
            _ => Err(LoginFormError::MissingCredentials),
        }
    }
}

#[derive(MultipartForm)]
pub struct EditUserForm {
    pub username: Option<Text<String>>,
    pub email: Option<Text<String>>,
    #[multipart(rename = "profilePicture", limit = "5MB")]
    pub profile_picture: Option<TempFile>,
}

#[derive(Debug)]
pub struct EditUserPayload {
    pub username: Username,
    pub email: Email,
    pub profile_picture: Option<Vec<u8>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditUserFormError {
    #[error("Username and email are required")]
    MissingFields,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("failed to read profile picture")]
    PictureRead,
}

impl TryFrom<EditUserForm> for EditUserPayload {
    type Error = EditUserFormError;

    fn try_from(form: EditUserForm) -> Result<Self, Self::Error> {
        let (Some(username), Some(email)) = (text_field(form.username), text_field(form.email))
        else {
            return Err(EditUserFormError::MissingFields);
        };
        let username = Username::new(username).map_err(|_| EditUserFormError::MissingFields)?;
        let email = Email::new(email).map_err(|_| EditUserFormError::InvalidEmail)?;
        let profile_picture =
            read_picture(form.profile_picture).map_err(|_| EditUserFormError::PictureRead)?;

        Ok(Self {
            username,
            email,
            profile_picture,
        })
    }
}

/// Returns the field value unless it is missing or blank.
fn text_field(field: Option<Text<String>>) -> Option<String> {
    field
        .map(Text::into_inner)
        .filter(|value| !value.trim().is_empty())
}

/// Reads an attached picture. An empty part counts as no picture.
fn read_picture(file: Option<TempFile>) -> std::io::Result<Option<Vec<u8>>> {
    let Some(mut upload) = file else {
        return Ok(None);
    };
    if upload.size == 0 {
        return Ok(None);
    }
    let mut bytes = Vec::with_capacity(upload.size);
    upload.file.as_file_mut().read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}
