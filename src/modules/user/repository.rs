use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use ulid::Ulid;

pub const MAX_USERNAME_CANDIDATES: usize = 10;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct CreateUserPayload {
    pub username: String,
    pub phone_number: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected error while accessing users")]
    UnexpectedError,
}

/// Usernames tried, in order, when registering `phone_number`.
pub fn username_candidates(phone_number: &str) -> impl Iterator<Item = String> {
    let suffix = phone_number
        .char_indices()
        .rev()
        .nth(5)
        .map(|(idx, _)| &phone_number[idx..])
        .unwrap_or(phone_number);
    let base = format!("user_{}", suffix);

    std::iter::once(base.clone()).chain(
        (1..MAX_USERNAME_CANDIDATES).map(move |counter| format!("{}_{}", base, counter)),
    )
}

pub async fn create<'e, E>(db: E, payload: CreateUserPayload) -> Result<User>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as!(
        User,
        "
        INSERT INTO users (id, username, phone_number, confirmed)
        VALUES ($1, $2, $3, true)
        RETURNING *
        ",
        Ulid::new().to_string(),
        payload.username,
        payload.phone_number
    )
    .fetch_one(db)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating a user account: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_phone_number<'e, E: PgExecutor<'e>>(
    e: E,
    phone_number: String,
) -> Result<Option<User>> {
    sqlx::query_as!(User, "SELECT * FROM users WHERE phone_number = $1", phone_number)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred in find_by_phone_number: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_by_username<'e, E: PgExecutor<'e>>(
    e: E,
    username: String,
) -> Result<Option<User>> {
    sqlx::query_as!(User, "SELECT * FROM users WHERE username = $1", username)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred in find_by_username: {}", err);
            Error::UnexpectedError
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_candidate_uses_last_six_digits() {
        let mut candidates = username_candidates("919876543210");
        assert_eq!(candidates.next().as_deref(), Some("user_543210"));
        assert_eq!(candidates.next().as_deref(), Some("user_543210_1"));
        assert_eq!(candidates.next().as_deref(), Some("user_543210_2"));
    }

    #[test]
    fn candidates_are_bounded() {
        let candidates = username_candidates("9876543210").collect::<Vec<_>>();
        assert_eq!(candidates.len(), MAX_USERNAME_CANDIDATES);
        assert_eq!(candidates.last().map(String::as_str), Some("user_543210_9"));
    }

    #[test]
    fn short_numbers_are_used_whole() {
        let mut candidates = username_candidates("4321");
        assert_eq!(candidates.next().as_deref(), Some("user_4321"));
    }
}
