use super::{CreateOtpPayload, Error, Otp, OtpStore, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use ulid::Ulid;

#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn delete_unused_by_phone(&self, phone: &str) -> Result<u64> {
        sqlx::query!(
            "DELETE FROM otps WHERE phone = $1 AND is_used = false",
            phone
        )
        .execute(&self.pool)
        .await
        .map(|res| res.rows_affected())
        .map_err(|err| {
            tracing::error!("Failed to delete unused otps for {}: {}", phone, err);
            Error::UnexpectedError
        })
    }

    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp> {
        sqlx::query_as!(
            Otp,
            "
            INSERT INTO otps (id, phone, code, is_used, attempts, expires_at, created_at)
            VALUES ($1, $2, $3, false, 0, $4, $5)
            RETURNING *
            ",
            Ulid::new().to_string(),
            payload.phone,
            payload.code,
            payload.expires_at,
            payload.created_at
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                tracing::warn!("Unused otp for {} was created concurrently", payload.phone);
                return Error::Conflict;
            }

            tracing::error!("Error occurred while creating otp: {}", err);
            Error::UnexpectedError
        })
    }

    async fn find_latest_unused_by_phone(&self, phone: &str) -> Result<Option<Otp>> {
        sqlx::query_as!(
            Otp,
            "
            SELECT * FROM otps
            WHERE phone = $1 AND is_used = false
            ORDER BY created_at DESC
            LIMIT 1
            ",
            phone
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching otp for {}: {}", phone, err);
            Error::UnexpectedError
        })
    }

    async fn increment_attempts(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        sqlx::query!(
            "
            UPDATE otps SET attempts = attempts + 1
            WHERE id = $1 AND attempts = $2 AND is_used = false
            ",
            id,
            seen_attempts
        )
        .execute(&self.pool)
        .await
        .map(|res| res.rows_affected() == 1)
        .map_err(|err| {
            tracing::error!("Failed to increment attempts for otp {}: {}", id, err);
            Error::UnexpectedError
        })
    }

    async fn mark_used(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        sqlx::query!(
            "
            UPDATE otps SET is_used = true
            WHERE id = $1 AND attempts = $2 AND is_used = false
            ",
            id,
            seen_attempts
        )
        .execute(&self.pool)
        .await
        .map(|res| res.rows_affected() == 1)
        .map_err(|err| {
            tracing::error!("Failed to mark otp {} as used: {}", id, err);
            Error::UnexpectedError
        })
    }

    async fn find_expired_unused(&self, now: DateTime<Utc>) -> Result<Vec<Otp>> {
        sqlx::query_as!(
            Otp,
            "SELECT * FROM otps WHERE is_used = false AND expires_at < $1",
            now
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching expired otps: {}", err);
            Error::UnexpectedError
        })
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        sqlx::query!("DELETE FROM otps WHERE id = $1", id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() == 1)
            .map_err(|err| {
                tracing::error!("Failed to delete otp {}: {}", id, err);
                Error::UnexpectedError
            })
    }
}
