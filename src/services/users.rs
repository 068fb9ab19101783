//! Account registration, login and profile management.

use crate::auth::{TokenIssuer, hash_password, verify_password};
use crate::domain::types::{Email, ImageUrl, UserId};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::forms::users::{EditUserPayload, LoginPayload, RegisterPayload};
use crate::image_host::ImageHost;
use crate::repository::{RepositoryError, UserReader, UserWriter};

use super::{ServiceError, ServiceResult};

pub const USER_EXISTS: &str = "User already exists";
pub const USERNAME_TAKEN: &str = "Username already taken";
pub const EMAIL_TAKEN: &str = "Email already in use";

async fn upload_picture(host: &dyn ImageHost, bytes: Vec<u8>) -> ServiceResult<ImageUrl> {
    host.upload(bytes).await.map_err(|e| {
        log::error!("Failed to upload profile picture: {e}");
        ServiceError::Upload(e.to_string())
    })
}

/// Creates an account after checking that the email and username are free.
///
/// The picture, when attached, is uploaded before the user is stored.
pub async fn register<R>(
    payload: RegisterPayload,
    repo: &R,
    host: &dyn ImageHost,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    match repo.get_user_by_email(&payload.email) {
        Ok(None) => {}
        Ok(Some(_)) => return Err(ServiceError::Conflict(USER_EXISTS.to_string())),
        Err(e) => {
            log::error!("Failed to look up user by email: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    }

    match repo.get_user_by_username(&payload.username) {
        Ok(None) => {}
        Ok(Some(_)) => return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string())),
        Err(e) => {
            log::error!("Failed to look up user by username: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    }

    let profile_picture = match payload.profile_picture {
        Some(bytes) => Some(upload_picture(host, bytes).await?),
        None => None,
    };

    let password_hash = hash_password(&payload.password).map_err(|e| {
        log::error!("Failed to hash password: {e}");
        ServiceError::Internal(e.to_string())
    })?;

    let new_user = NewUser {
        username: payload.username,
        email: payload.email,
        password_hash,
        profile_picture,
    };

    match repo.create_user(&new_user) {
        Ok(user) => Ok(user),
        Err(RepositoryError::ConstraintViolation(_)) => {
            Err(ServiceError::Conflict(USER_EXISTS.to_string()))
        }
        Err(e) => {
            log::error!("Failed to create user: {e}");
            Err(ServiceError::Internal(e.to_string()))
        }
    }
}

/// Checks credentials and issues a session token.
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub fn login<R>(
    payload: LoginPayload,
    repo: &R,
    issuer: &TokenIssuer,
) -> ServiceResult<(String, User)>
where
    R: UserReader,
{
    let Ok(email) = Email::new(payload.email) else {
        return Err(ServiceError::Unauthorized);
    };

    let user = match repo.get_user_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::Unauthorized),
        Err(e) => {
            log::error!("Failed to look up user by email: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ServiceError::Unauthorized);
    }

    let token = issuer.issue(&user).map_err(|e| {
        log::error!("Failed to issue session token: {e}");
        ServiceError::Internal(e.to_string())
    })?;

    Ok((token, user))
}

pub fn get_user_details<R>(user_id: UserId, repo: &R) -> ServiceResult<User>
where
    R: UserReader,
{
    match repo.get_user_by_id(user_id) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get user {user_id}: {e}");
            Err(ServiceError::Internal(e.to_string()))
        }
    }
}

/// Updates username, email and optionally the profile picture.
///
/// Removing the previous picture is best-effort: failures are logged and the
/// update proceeds.
pub async fn edit_user<R>(
    user_id: UserId,
    payload: EditUserPayload,
    repo: &R,
    host: &dyn ImageHost,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    let user = get_user_details(user_id, repo)?;

    match repo.get_user_by_email(&payload.email) {
        Ok(Some(other)) if other.id != user.id => {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }
        Ok(_) => {}
        Err(e) => {
            log::error!("Failed to look up user by email: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    }

    match repo.get_user_by_username(&payload.username) {
        Ok(Some(other)) if other.id != user.id => {
            return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
        }
        Ok(_) => {}
        Err(e) => {
            log::error!("Failed to look up user by username: {e}");
            return Err(ServiceError::Internal(e.to_string()));
        }
    }

    let profile_picture = match payload.profile_picture {
        Some(bytes) => {
            if let Some(old) = &user.profile_picture {
                if let Err(e) = host.delete(old).await {
                    log::warn!("Failed to delete old profile picture {old}: {e}");
                }
            }
            Some(upload_picture(host, bytes).await?)
        }
        None => None,
    };

    let changes = UpdateUser {
        username: payload.username,
        email: payload.email,
        profile_picture,
    };

    match repo.update_user(user.id, &changes) {
        Ok(user) => Ok(user),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(RepositoryError::ConstraintViolation(_)) => {
            Err(ServiceError::Conflict(USER_EXISTS.to_string()))
        }
        Err(e) => {
            log::error!("Failed to update user {user_id}: {e}");
            Err(ServiceError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Username;
    use crate::image_host::test::MemoryImageHost;
    use crate::repository::test::TestRepository;

    fn register_payload(username: &str, email: &str) -> RegisterPayload {
        RegisterPayload {
            username: Username::new(username).unwrap(),
            password: "s3cret".to_string(),
            email: Email::new(email).unwrap(),
            profile_picture: None,
        }
    }

    fn edit_payload(username: &str, email: &str, picture: Option<Vec<u8>>) -> EditUserPayload {
        EditUserPayload {
            username: Username::new(username).unwrap(),
            email: Email::new(email).unwrap(),
            profile_picture: picture,
        }
    }

    fn login_payload(email: &str, password: &str) -> LoginPayload {
        LoginPayload {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[actix_web::test]
    async fn register_hashes_password_and_stores_user() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();

        let user = register(register_payload("alice", "alice@example.com"), &repo, &host)
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "alice");
        assert_ne!(user.password_hash, "s3cret");
        assert!(verify_password("s3cret", &user.password_hash));
        assert!(user.profile_picture.is_none());
        assert_eq!(host.uploads(), 0);
    }

    #[actix_web::test]
    async fn register_rejects_duplicate_email_then_username() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        register(register_payload("alice", "alice@example.com"), &repo, &host)
            .await
            .unwrap();

        let err = register(register_payload("other", "alice@example.com"), &repo, &host)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Conflict(USER_EXISTS.to_string()));

        let err = register(register_payload("alice", "new@example.com"), &repo, &host)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Conflict(USERNAME_TAKEN.to_string()));
        assert_eq!(repo.users().len(), 1);
    }

    #[actix_web::test]
    async fn register_uploads_picture_first() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let mut payload = register_payload("alice", "alice@example.com");
        payload.profile_picture = Some(vec![1, 2, 3]);

        let user = register(payload, &repo, &host).await.unwrap();

        assert_eq!(host.uploads(), 1);
        assert_eq!(
            user.profile_picture.unwrap().as_str(),
            "https://images.test/user_profiles/picture1.png"
        );
    }

    #[actix_web::test]
    async fn register_upload_failure_stores_nothing() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::failing_uploads();
        let mut payload = register_payload("alice", "alice@example.com");
        payload.profile_picture = Some(vec![1]);

        let err = register(payload, &repo, &host).await.unwrap_err();

        assert!(matches!(err, ServiceError::Upload(_)));
        assert!(repo.users().is_empty());
    }

    #[actix_web::test]
    async fn login_issues_token_only_for_valid_credentials() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let issuer = TokenIssuer::new(b"secret", 3600);
        register(register_payload("alice", "alice@example.com"), &repo, &host)
            .await
            .unwrap();

        let (token, user) =
            login(login_payload("alice@example.com", "s3cret"), &repo, &issuer).unwrap();
        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(issuer.verify(&token).unwrap().sub, user.id.to_string());

        assert_eq!(
            login(login_payload("alice@example.com", "wrong"), &repo, &issuer).unwrap_err(),
            ServiceError::Unauthorized
        );
        assert_eq!(
            login(login_payload("bob@example.com", "s3cret"), &repo, &issuer).unwrap_err(),
            ServiceError::Unauthorized
        );
        assert_eq!(
            login(login_payload("not-an-email", "s3cret"), &repo, &issuer).unwrap_err(),
            ServiceError::Unauthorized
        );
    }

    #[test]
    fn user_details_for_missing_user_is_not_found() {
        let repo = TestRepository::default();
        let err = get_user_details(UserId::new(9).unwrap(), &repo).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[actix_web::test]
    async fn edit_replaces_picture_and_tolerates_delete_failure() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::failing_deletes();
        let mut payload = register_payload("alice", "alice@example.com");
        payload.profile_picture = Some(vec![1]);
        let user = register(payload, &repo, &host).await.unwrap();

        let updated = edit_user(
            user.id,
            edit_payload("alice2", "alice2@example.com", Some(vec![2])),
            &repo,
            &host,
        )
        .await
        .unwrap();

        assert_eq!(updated.username.as_str(), "alice2");
        assert_eq!(updated.email.as_str(), "alice2@example.com");
        assert_eq!(
            updated.profile_picture.unwrap().as_str(),
            "https://images.test/user_profiles/picture2.png"
        );
    }

    #[actix_web::test]
    async fn edit_deletes_previous_picture() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let mut payload = register_payload("alice", "alice@example.com");
        payload.profile_picture = Some(vec![1]);
        let user = register(payload, &repo, &host).await.unwrap();
        let old = user.profile_picture.clone().unwrap();

        edit_user(
            user.id,
            edit_payload("alice", "alice@example.com", Some(vec![2])),
            &repo,
            &host,
        )
        .await
        .unwrap();

        assert_eq!(host.deleted(), vec![old]);
    }

    #[actix_web::test]
    async fn edit_without_picture_keeps_existing_one() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let mut payload = register_payload("alice", "alice@example.com");
        payload.profile_picture = Some(vec![1]);
        let user = register(payload, &repo, &host).await.unwrap();

        let updated = edit_user(
            user.id,
            edit_payload("alice", "alice@example.com", None),
            &repo,
            &host,
        )
        .await
        .unwrap();

        assert_eq!(updated.profile_picture, user.profile_picture);
        assert!(host.deleted().is_empty());
    }

    #[actix_web::test]
    async fn edit_rejects_identity_owned_by_another_user() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let alice = register(register_payload("alice", "alice@example.com"), &repo, &host)
            .await
            .unwrap();
        register(register_payload("bob", "bob@example.com"), &repo, &host)
            .await
            .unwrap();

        let err = edit_user(
            alice.id,
            edit_payload("alice", "bob@example.com", None),
            &repo,
            &host,
        )
        .await
        .unwrap_err();
        assert_eq!(err, ServiceError::Conflict(EMAIL_TAKEN.to_string()));

        let err = edit_user(
            alice.id,
            edit_payload("bob", "alice@example.com", None),
            &repo,
            &host,
        )
        .await
        .unwrap_err();
        assert_eq!(err, ServiceError::Conflict(USERNAME_TAKEN.to_string()));
    }

    #[actix_web::test]
    async fn edit_missing_user_is_not_found() {
        let repo = TestRepository::default();
        let host = MemoryImageHost::default();
        let err = edit_user(
            UserId::new(5).unwrap(),
            edit_payload("ghost", "ghost@example.com", None),
            &repo,
            &host,
        )
        .await
        .unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }
}
