use serde::Serialize;

use crate::domain::user::User;

/// Public view of a user; never includes the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        Self {
            id: value.id.get(),
            username: value.username.into_inner(),
            email: value.email.into_inner(),
            profile_picture: value.profile_picture.map(String::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDetailsResponse {
    pub message: String,
    pub data: UserDto,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: UserDto,
}
