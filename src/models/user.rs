use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{Email, ImageUrl, TypeConstraintError, Username};
use crate::domain::user::{
    NewUser as DomainNewUser, UpdateUser as DomainUpdateUser, User as DomainUser,
};

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`User`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.try_into()?,
            username: Username::new(user.username)?,
            email: Email::new(user.email)?,
            password_hash: user.password_hash,
            profile_picture: user
                .profile_picture
                .filter(|url| !url.trim().is_empty())
                .map(ImageUrl::new)
                .transpose()?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl From<DomainNewUser> for NewUser {
    fn from(user: DomainNewUser) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            username: user.username.into_inner(),
            email: user.email.into_inner(),
            password_hash: user.password_hash,
            profile_picture: user.profile_picture.map(String::from),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset applied by profile edits. A `None` picture leaves the column untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<DomainUpdateUser> for UserChanges {
    fn from(changes: DomainUpdateUser) -> Self {
        Self {
            username: changes.username.into_inner(),
            email: changes.email.into_inner(),
            profile_picture: changes.profile_picture.map(String::from),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
