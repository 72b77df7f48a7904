use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgConnection;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::GrantAuthority;
use crate::domain::access::models::PermissionLevel;
use crate::domain::access::ports::AccessRepository;
use crate::domain::user::models::UserId;

fn database(e: sqlx::Error) -> AccessError {
    AccessError::DatabaseError(e.to_string())
}

fn grant_from_row(row: &PgRow) -> Result<AccessGrant, AccessError> {
    let level: String = row.try_get("permission_level").map_err(database)?;

    Ok(AccessGrant {
        user_id: UserId(row.try_get("user_id").map_err(database)?),
        apiary_id: ApiaryId(row.try_get("apiary_id").map_err(database)?),
        level: level.parse()?,
        granted_by: UserId(row.try_get("granted_by").map_err(database)?),
        granted_at: row.try_get("granted_at").map_err(database)?,
        is_active: row.try_get("is_active").map_err(database)?,
    })
}

/// Lock the apiary row and read what a grant change on it is decided on.
///
/// Every grant change takes this lock first, so changes on one apiary are
/// serialised and the actor's level cannot move before the write commits.
async fn lock_authority(
    conn: &mut PgConnection,
    actor_id: &UserId,
    apiary_id: &ApiaryId,
) -> Result<GrantAuthority, AccessError> {
    let owner = sqlx::query("SELECT owner_id FROM apiaries WHERE id = $1 FOR UPDATE")
        .bind(apiary_id.0)
        .fetch_optional(&mut *conn)
        .await
        .map_err(database)?
        .ok_or(AccessError::Forbidden)?;
    let owner_id = UserId(owner.try_get("owner_id").map_err(database)?);

    let grant = sqlx::query(
        r#"
        SELECT permission_level
        FROM apiary_access
        WHERE user_id = $1 AND apiary_id = $2 AND is_active = TRUE
        "#,
    )
    .bind(actor_id.0)
    .bind(apiary_id.0)
    .fetch_optional(&mut *conn)
    .await
    .map_err(database)?;

    let active_grant = match grant {
        Some(row) => {
            let level: String = row.try_get("permission_level").map_err(database)?;
            Some(level.parse()?)
        }
        None => None,
    };

    Ok(GrantAuthority {
        owner_id,
        actor_level: PermissionLevel::held_by(actor_id, &owner_id, active_grant),
    })
}

pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PostgresAccessRepository {
    async fn create_apiary(&self, apiary: Apiary) -> Result<Apiary, AccessError> {
        sqlx::query(
            r#"
            INSERT INTO apiaries (id, owner_id, name, location, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(apiary.id.0)
        .bind(apiary.owner_id.0)
        .bind(apiary.name.as_str())
        .bind(apiary.location.as_deref())
        .bind(apiary.created_at)
        .execute(&self.pool)
        .await
        .map_err(database)?;

        Ok(apiary)
    }

    async fn find_apiary_owner(&self, apiary_id: &ApiaryId) -> Result<Option<UserId>, AccessError> {
        let row = sqlx::query("SELECT owner_id FROM apiaries WHERE id = $1")
            .bind(apiary_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database)?;

        row.map(|r| r.try_get::<Uuid, _>("owner_id").map(UserId))
            .transpose()
            .map_err(database)
    }

    async fn find_active_grant(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<Option<PermissionLevel>, AccessError> {
        let row = sqlx::query(
            r#"
            SELECT permission_level
            FROM apiary_access
            WHERE user_id = $1 AND apiary_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(user_id.0)
        .bind(apiary_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        match row {
            Some(r) => {
                let level: String = r.try_get("permission_level").map_err(database)?;
                Ok(Some(level.parse()?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_grant(
        &self,
        actor_id: &UserId,
        grant: AccessGrant,
    ) -> Result<AccessGrant, AccessError> {
        let mut tx = self.pool.begin().await.map_err(database)?;

        lock_authority(&mut tx, actor_id, &grant.apiary_id)
            .await?
            .admit_change(&grant.user_id)?;

        let row = sqlx::query(
            r#"
            INSERT INTO apiary_access (user_id, apiary_id, permission_level, granted_by, granted_at, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            ON CONFLICT (user_id, apiary_id) DO UPDATE
            SET permission_level = EXCLUDED.permission_level,
                granted_by = EXCLUDED.granted_by,
                granted_at = EXCLUDED.granted_at,
                is_active = TRUE
            RETURNING user_id, apiary_id, permission_level, granted_by, granted_at, is_active
            "#,
        )
        .bind(grant.user_id.0)
        .bind(grant.apiary_id.0)
        .bind(grant.level.as_str())
        .bind(grant.granted_by.0)
        .bind(grant.granted_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AccessError::InvalidOperation(format!(
                        "User {} does not exist",
                        grant.user_id
                    ));
                }
            }
            database(e)
        })?;

        let stored = grant_from_row(&row)?;
        tx.commit().await.map_err(database)?;
        Ok(stored)
    }

    async fn deactivate_grant(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<bool, AccessError> {
        let mut tx = self.pool.begin().await.map_err(database)?;

        lock_authority(&mut tx, actor_id, apiary_id)
            .await?
            .admit_change(user_id)?;

        let result = sqlx::query(
            r#"
            UPDATE apiary_access
            SET is_active = FALSE
            WHERE user_id = $1 AND apiary_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(user_id.0)
        .bind(apiary_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database)?;

        tx.commit().await.map_err(database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active_grants(
        &self,
        apiary_id: &ApiaryId,
    ) -> Result<Vec<AccessGrant>, AccessError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, apiary_id, permission_level, granted_by, granted_at, is_active
            FROM apiary_access
            WHERE apiary_id = $1 AND is_active = TRUE
            ORDER BY granted_at
            "#,
        )
        .bind(apiary_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(grant_from_row).collect()
    }
}
