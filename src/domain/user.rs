use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Email, ImageUrl, UserId, Username};

/// Registered account.
///
/// `password_hash` is never serialized; responses go through the user DTO.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: Option<ImageUrl>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`User`]. The password must already be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub profile_picture: Option<ImageUrl>,
}

/// Profile changes applied by the edit endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateUser {
    pub username: Username,
    pub email: Email,
    /// Replaces the stored picture when set; `None` keeps the current one.
    pub profile_picture: Option<ImageUrl>,
}
