use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use ulid::Ulid;

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected error while accessing sessions")]
    UnexpectedError,
}

pub struct SessionCreationPayload {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: SessionCreationPayload,
) -> Result<Session, Error> {
    sqlx::query_as!(
        Session,
        "
        INSERT INTO sessions (
            id,
            user_id,
            access_token,
            refresh_token,
            access_token_expires_at,
            refresh_token_expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING
            id,
            user_id,
            access_token,
            refresh_token,
            access_token_expires_at,
            refresh_token_expires_at
        ",
        Ulid::new().to_string(),
        payload.user_id,
        payload.access_token,
        payload.refresh_token,
        payload.access_token_expires_at,
        payload.refresh_token_expires_at
    )
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while creating session for user {}: {}",
            payload.user_id,
            err
        );
        Error::UnexpectedError
    })
}
