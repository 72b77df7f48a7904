use async_trait::async_trait;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::user::models::UserId;

/// Persistence for apiary ownership and access grants.
#[async_trait]
pub trait AccessRepository: Send + Sync + 'static {
    /// Persist a new apiary.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed (including unknown owner)
    async fn create_apiary(&self, apiary: Apiary) -> Result<Apiary, AccessError>;

    /// Owner of an apiary.
    ///
    /// # Returns
    /// `None` if the apiary does not exist
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_apiary_owner(&self, apiary_id: &ApiaryId) -> Result<Option<UserId>, AccessError>;

    /// Level of the active grant for `(user_id, apiary_id)`.
    ///
    /// # Returns
    /// `None` when there is no row or the row is inactive
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_active_grant(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<Option<PermissionLevel>, AccessError>;

    /// Lock the apiary, admit the change with [`GrantAuthority::admit_change`]
    /// for `actor_id`, then insert or overwrite the grant for
    /// `(grant.user_id, grant.apiary_id)`, reactivating it if it was revoked.
    /// All of it runs in one transaction, so a concurrent revocation of the
    /// actor either lands before the check or after the write.
    ///
    /// # Errors
    /// * `Forbidden` - Apiary does not exist or actor is not `Admin`
    /// * `InvalidOperation` - Grantee is the owner or does not exist
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    ///
    /// [`GrantAuthority::admit_change`]: crate::domain::access::models::GrantAuthority::admit_change
    async fn upsert_grant(
        &self,
        actor_id: &UserId,
        grant: AccessGrant,
    ) -> Result<AccessGrant, AccessError>;

    /// Lock the apiary, admit the change for `actor_id`, then deactivate the
    /// grant for `(user_id, apiary_id)`, in one transaction.
    ///
    /// # Returns
    /// Whether an active grant was deactivated
    ///
    /// # Errors
    /// * `Forbidden` - Apiary does not exist or actor is not `Admin`
    /// * `InvalidOperation` - Target is the owner
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    async fn deactivate_grant(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<bool, AccessError>;

    /// All active grants on an apiary, oldest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_active_grants(&self, apiary_id: &ApiaryId)
        -> Result<Vec<AccessGrant>, AccessError>;
}
