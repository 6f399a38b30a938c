use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::password::{Hasher, PasswordError};
use crate::{
    error::ApiError,
    store::StoreError,
    users::{NewUser, Settings, User, UserStore},
    validate::{self, ValidationError},
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("username or email already registered")]
    Duplicate,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::Duplicate,
            other => AuthError::Store(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(v) => ApiError::Validation(v.0),
            AuthError::Duplicate => ApiError::Duplicate,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UserNotFound => ApiError::NotFound("User"),
            AuthError::Password(e) => ApiError::internal(e),
            AuthError::Store(e) => ApiError::internal(e),
        }
    }
}

/// Signup input before normalization.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub settings: Option<Settings>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Credential store operations: signup, login check and password change.
pub struct Credentials {
    users: Arc<dyn UserStore>,
    hasher: Hasher,
    /// Verified against when the email is unknown so both login failures cost the same.
    decoy_hash: String,
}

impl Credentials {
    pub fn new(users: Arc<dyn UserStore>, hasher: Hasher) -> Result<Self, PasswordError> {
        let decoy_hash = hasher.hash(&Uuid::new_v4().to_string())?;
        Ok(Self {
            users,
            hasher,
            decoy_hash,
        })
    }

    #[instrument(skip_all, fields(username = %input.username))]
    pub async fn create_user(&self, input: Registration) -> Result<User, AuthError> {
        let username = input.username.trim().to_string();
        let email = normalize_email(&input.email);

        let name_len = username.chars().count();
        if name_len < MIN_USERNAME_LEN || name_len > MAX_USERNAME_LEN {
            return Err(ValidationError(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LEN, MAX_USERNAME_LEN
            ))
            .into());
        }
        if !validate::is_valid_email(&email) {
            return Err(ValidationError::new("Please provide a valid email").into());
        }
        check_password(&input.password)?;

        let password_hash = self.hasher.hash_blocking(input.password).await?;
        let user = self
            .users
            .create(NewUser {
                id: Uuid::new_v4(),
                username,
                email,
                password_hash,
                settings: input.settings.unwrap_or_default(),
                created_at: OffsetDateTime::now_utc(),
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::Duplicate) {
                    warn!("registration collided with an existing account");
                }
                AuthError::from(e)
            })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password are the same error, and both paths
    /// run one full hash verification.
    #[instrument(skip_all)]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let found = self.users.find_by_email(&email).await?;

        let (hash, user) = match found {
            Some(user) => (user.password_hash.clone(), Some(user)),
            None => (self.decoy_hash.clone(), None),
        };
        let matches = self
            .hasher
            .verify_blocking(password.to_string(), hash)
            .await?;

        match user {
            Some(user) if matches => {
                info!(user_id = %user.id, "login succeeded");
                Ok(user)
            }
            Some(user) => {
                warn!(user_id = %user.id, "login with wrong password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                warn!("login for unknown email");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        check_password(new_password)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let ok = self
            .hasher
            .verify_blocking(current.to_string(), user.password_hash)
            .await?;
        if !ok {
            warn!("password change with wrong current password");
            return Err(AuthError::InvalidCredentials);
        }

        let fresh = self.hasher.hash_blocking(new_password.to_string()).await?;
        if !self.users.update_password(user_id, &fresh).await? {
            return Err(AuthError::UserNotFound);
        }
        info!("password changed");
        Ok(())
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
