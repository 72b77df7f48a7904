use std::sync::Arc;

use auth::Clock;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::access::ports::AccessRepository;
use crate::domain::user::models::UserId;

/// Access grant registry.
///
/// The owner of an apiary holds implicit `Admin` and never has a grant row.
pub struct AccessService<AR>
where
    AR: AccessRepository,
{
    repository: Arc<AR>,
    clock: Arc<dyn Clock>,
}

impl<AR> AccessService<AR>
where
    AR: AccessRepository,
{
    pub fn new(repository: Arc<AR>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Resolve the level `user_id` holds on `apiary_id`.
    ///
    /// # Returns
    /// `Admin` for the owner, the active grant's level for grantees, `None`
    /// otherwise (including for apiaries that do not exist)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn effective_level(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<PermissionLevel, AccessError> {
        let Some(owner) = self.repository.find_apiary_owner(apiary_id).await? else {
            return Ok(PermissionLevel::None);
        };
        if owner == *user_id {
            return Ok(PermissionLevel::Admin);
        }

        let grant = self.repository.find_active_grant(user_id, apiary_id).await?;
        Ok(PermissionLevel::held_by(user_id, &owner, grant))
    }

    /// Guard for any operation on an apiary.
    ///
    /// # Errors
    /// * `Forbidden` - Effective level is below `required`
    /// * `DatabaseError` - Database operation failed
    pub async fn require_at_least(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        required: PermissionLevel,
    ) -> Result<(), AccessError> {
        let level = self.effective_level(user_id, apiary_id).await?;
        if level >= required {
            Ok(())
        } else {
            tracing::debug!(
                user_id = %user_id,
                apiary_id = %apiary_id,
                level = %level,
                required = %required,
                "Access denied"
            );
            Err(AccessError::Forbidden)
        }
    }

    /// Give `user_id` an explicit level on `apiary_id`, or change it.
    ///
    /// # Errors
    /// * `InvalidOperation` - Level `None`, self-grant, or grantee is the owner
    /// * `Forbidden` - Actor is not `Admin` on the apiary
    /// * `DatabaseError` - Database operation failed
    pub async fn grant(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        level: PermissionLevel,
    ) -> Result<AccessGrant, AccessError> {
        if level == PermissionLevel::None {
            return Err(AccessError::InvalidOperation(
                "use revoke to remove access".to_string(),
            ));
        }
        if actor_id == user_id {
            return Err(AccessError::InvalidOperation(
                "cannot change your own access".to_string(),
            ));
        }

        let grant = self
            .repository
            .upsert_grant(
                actor_id,
                AccessGrant {
                    user_id: *user_id,
                    apiary_id: *apiary_id,
                    level,
                    granted_by: *actor_id,
                    granted_at: self.clock.now(),
                    is_active: true,
                },
            )
            .await?;

        tracing::info!(
            actor_id = %actor_id,
            user_id = %user_id,
            apiary_id = %apiary_id,
            level = %level,
            "Access granted"
        );
        Ok(grant)
    }

    /// Deactivate a grant. Revoking a user without a grant succeeds.
    ///
    /// # Errors
    /// * `InvalidOperation` - Self-revocation or target is the owner
    /// * `Forbidden` - Actor is not `Admin` on the apiary
    /// * `DatabaseError` - Database operation failed
    pub async fn revoke(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<(), AccessError> {
        if actor_id == user_id {
            return Err(AccessError::InvalidOperation(
                "cannot change your own access".to_string(),
            ));
        }

        let changed = self
            .repository
            .deactivate_grant(actor_id, user_id, apiary_id)
            .await?;
        tracing::info!(
            actor_id = %actor_id,
            user_id = %user_id,
            apiary_id = %apiary_id,
            changed,
            "Access revoked"
        );
        Ok(())
    }

    /// Active grants on an apiary; visible to anyone with at least `Read`.
    ///
    /// # Errors
    /// * `Forbidden` - Actor cannot read the apiary
    /// * `DatabaseError` - Database operation failed
    pub async fn list_grants(
        &self,
        actor_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<Vec<AccessGrant>, AccessError> {
        self.require_at_least(actor_id, apiary_id, PermissionLevel::Read)
            .await?;
        self.repository.list_active_grants(apiary_id).await
    }

    /// Create an apiary owned by `owner_id`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn provision_apiary(
        &self,
        owner_id: &UserId,
        command: ProvisionApiaryCommand,
    ) -> Result<Apiary, AccessError> {
        let apiary = self
            .repository
            .create_apiary(Apiary {
                id: ApiaryId::new(),
                owner_id: *owner_id,
                name: command.name,
                location: command.location,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(owner_id = %owner_id, apiary_id = %apiary.id, "Apiary provisioned");
        Ok(apiary)
    }
}
