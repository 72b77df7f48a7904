use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::password_reset::errors::ResetTokenError;
use crate::domain::password_reset::models::ConsumeOutcome;
use crate::domain::password_reset::models::ResetToken;
use crate::domain::password_reset::models::TokenFingerprint;
use crate::domain::password_reset::ports::ResetTokenRepository;
use crate::domain::user::models::UserId;

fn database(e: sqlx::Error) -> ResetTokenError {
    ResetTokenError::DatabaseError(e.to_string())
}

/// Reset tokens in PostgreSQL.
///
/// Issuing locks the owning user row so concurrent requests for the same user
/// serialise; the partial unique index on unused tokens backs that up.
pub struct PostgresResetTokenRepository {
    pool: PgPool,
}

impl PostgresResetTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenRepository for PostgresResetTokenRepository {
    async fn issue(&self, token: ResetToken) -> Result<(), ResetTokenError> {
        let mut tx = self.pool.begin().await.map_err(database)?;

        let owner = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(token.user_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(database)?;
        if owner.is_none() {
            return Err(ResetTokenError::UserNotFound(token.user_id.to_string()));
        }

        sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used = TRUE
            WHERE user_id = $1 AND used = FALSE
            "#,
        )
        .bind(token.user_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database)?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id.0)
        .bind(token.token_hash.as_str())
        .bind(token.expires_at)
        .bind(token.used)
        .bind(token.created_at)
        .execute(&mut *tx)
        .await
        .map_err(database)?;

        tx.commit().await.map_err(database)?;
        Ok(())
    }

    async fn find_redeemable(
        &self,
        token_hash: &TokenFingerprint,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, ResetTokenError> {
        let row = sqlx::query(
            r#"
            SELECT user_id
            FROM password_reset_tokens
            WHERE token_hash = $1 AND used = FALSE AND expires_at > $2
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        row.map(|r| r.try_get::<Uuid, _>("user_id").map(UserId))
            .transpose()
            .map_err(database)
    }

    async fn consume(
        &self,
        token_hash: &TokenFingerprint,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, ResetTokenError> {
        let consumed = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used = TRUE
            WHERE token_hash = $1 AND used = FALSE AND expires_at > $2
            RETURNING id
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        if consumed.is_some() {
            return Ok(ConsumeOutcome::Consumed);
        }

        let existing = sqlx::query("SELECT used FROM password_reset_tokens WHERE token_hash = $1")
            .bind(token_hash.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database)?;

        match existing {
            Some(row) if row.try_get::<bool, _>("used").map_err(database)? => {
                Ok(ConsumeOutcome::AlreadyUsed)
            }
            _ => Ok(ConsumeOutcome::Invalid),
        }
    }

    async fn redeem(
        &self,
        token_hash: &TokenFingerprint,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, ResetTokenError> {
        let mut tx = self.pool.begin().await.map_err(database)?;

        let row = sqlx::query(
            r#"
            SELECT id, user_id
            FROM password_reset_tokens
            WHERE token_hash = $1 AND used = FALSE AND expires_at > $2
            FOR UPDATE
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database)?
        .ok_or(ResetTokenError::Invalid)?;

        let token_id: Uuid = row.try_get("id").map_err(database)?;
        let user_id = UserId(row.try_get("user_id").map_err(database)?);

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id.0)
            .bind(new_password_hash)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(database)?;

        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await
            .map_err(database)?;

        tx.commit().await.map_err(database)?;
        Ok(user_id)
    }

    async fn replace_password(
        &self,
        user_id: &UserId,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, ResetTokenError> {
        let mut tx = self.pool.begin().await.map_err(database)?;

        let updated = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id.0)
            .bind(new_password_hash)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(database)?;
        if updated.rows_affected() == 0 {
            return Err(ResetTokenError::UserNotFound(user_id.to_string()));
        }

        let superseded = sqlx::query(
            "UPDATE password_reset_tokens SET used = TRUE WHERE user_id = $1 AND used = FALSE",
        )
        .bind(user_id.0)
        .execute(&mut *tx)
        .await
        .map_err(database)?;

        tx.commit().await.map_err(database)?;
        Ok(superseded.rows_affected())
    }
}
