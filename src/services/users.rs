//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, Permission, User, UserClaims, UserShort, UserWithPermissions},
        PageQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    page_size: i64,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, page_size: i64) -> Self {
        Self {
            repository,
            config,
            page_size,
        }
    }

    /// Authenticate by username and password, returning a JWT and the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!("Failed login for user {}", username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let token = self.create_token_for_user(&user).await?;
        tracing::info!("User {} logged in", user.username);
        Ok((token, user))
    }

    async fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let permissions = self.repository.users.permissions(user.id).await?;

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            permissions,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Get user with their permissions
    pub async fn get_with_permissions(&self, id: i32) -> AppResult<UserWithPermissions> {
        let user = self.repository.users.get_by_id(id).await?;
        let permissions = self.repository.users.permissions(id).await?;
        Ok(UserWithPermissions { user, permissions })
    }

    pub async fn list_users(&self, page: &PageQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let (_, per_page, offset) = page.resolve(self.page_size);
        self.repository.users.list(offset, per_page).await
    }

    /// Create a user with an initial permission set
    pub async fn create_user(&self, user: CreateUser) -> AppResult<UserWithPermissions> {
        user.validate()?;

        if self.repository.users.username_exists(&user.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &hash).await?;
        if !user.permissions.is_empty() {
            self.repository
                .users
                .set_permissions(created.id, &user.permissions)
                .await?;
        }

        tracing::info!("Created user {} (id={})", created.username, created.id);
        self.get_with_permissions(created.id).await
    }

    pub async fn set_permissions(
        &self,
        id: i32,
        permissions: &[Permission],
    ) -> AppResult<UserWithPermissions> {
        self.repository.users.get_by_id(id).await?;
        self.repository.users.set_permissions(id, permissions).await?;
        tracing::info!("Permissions of user {} set to {:?}", id, permissions);
        self.get_with_permissions(id).await
    }

    /// Delete a user; their loans lose the borrower reference
    pub async fn delete_user(&self, id: i32, current_user_id: i32) -> AppResult<()> {
        if id == current_user_id {
            return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
        }
        let on_loan = self.repository.instances.count_on_loan_to(id).await?;
        if on_loan > 0 {
            return Err(AppError::Protected(format!(
                "User {} still has {} book(s) on loan",
                id, on_loan
            )));
        }
        self.repository.users.delete(id).await?;
        tracing::info!("Deleted user id={}", id);
        Ok(())
    }

    /// Create the configured superuser if it does not exist yet
    pub async fn ensure_bootstrap_superuser(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_username.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.username_exists(username).await? {
            return Ok(());
        }

        let hash = hash_password(password)?;
        let user = CreateUser {
            username: username.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_superuser: true,
            permissions: Vec::new(),
        };
        let created = self.repository.users.create(&user, &hash).await?;
        tracing::warn!(
            "Created bootstrap superuser '{}' (id={}); change its password",
            created.username,
            created.id
        );
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("1X<ISRUkw+tuK").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "1X<ISRUkw+tuK").unwrap());
        assert!(!verify_password(&hash, "2HJ1vRV0Z&3iD").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("secret").unwrap(), hash_password("secret").unwrap());
    }

    #[test]
    fn test_invalid_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "x"),
            Err(AppError::Internal(_))
        ));
    }
}
