use std::sync::Arc;

use auth::Clock;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;

/// Credential store service.
///
/// The only component besides the account orchestrator allowed to see
/// `password_hash`.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    clock: Arc<dyn Clock>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `clock` - Source of `created_at` / `updated_at`
    pub fn new(repository: Arc<UR>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Store a fully built user.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` - Identity is taken
    /// * `DatabaseError` - Database operation failed
    pub async fn create(&self, user: User) -> Result<User, UserError> {
        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User created");
        Ok(created)
    }

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn get(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    /// Resolve a login identifier: anything containing `@` is an email,
    /// everything else a username.
    ///
    /// Identifiers that are not even well-formed resolve to `None`, exactly
    /// like unknown ones.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, UserError> {
        if identifier.contains('@') {
            match EmailAddress::new(identifier.to_string()) {
                Ok(email) => self.repository.find_by_email(&email).await,
                Err(_) => Ok(None),
            }
        } else {
            match Username::new(identifier.to_string()) {
                Ok(username) => self.repository.find_by_username(&username).await,
                Err(_) => Ok(None),
            }
        }
    }

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        self.repository.find_by_email(email).await
    }

    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserError> {
        self.repository
            .update_password_hash(id, password_hash, self.clock.now())
            .await?;
        tracing::info!(user_id = %id, "Password hash updated");
        Ok(())
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get(id).await?;

        if let Some(display_name) = command.display_name {
            user.display_name = display_name;
        }
        if let Some(phone) = command.phone {
            user.phone = Some(phone);
        }
        if let Some(picture) = command.profile_picture {
            user.profile_picture = Some(picture);
        }
        user.updated_at = self.clock.now();

        self.repository.update_profile(user).await
    }

    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
