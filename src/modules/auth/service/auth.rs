use chrono::{Duration, Utc};
use sqlx::PgExecutor;
use ulid::Ulid;

use super::super::repository::{self, session::Session};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected error while creating session")]
    UnexpectedError,
}

type Result<T> = std::result::Result<T, Error>;

pub fn access_token_ttl() -> Duration {
    Duration::days(1)
}

pub fn refresh_token_ttl() -> Duration {
    Duration::days(7)
}

pub async fn create_session<'e, E: PgExecutor<'e>>(e: E, user_id: String) -> Result<Session> {
    let now = Utc::now();

    repository::session::create(
        e,
        repository::session::SessionCreationPayload {
            user_id,
            access_token: Ulid::new().to_string(),
            refresh_token: Ulid::new().to_string(),
            access_token_expires_at: now + access_token_ttl(),
            refresh_token_expires_at: now + refresh_token_ttl(),
        },
    )
    .await
    .map_err(|_| Error::UnexpectedError)
}
