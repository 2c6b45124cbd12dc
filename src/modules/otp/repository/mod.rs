#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgOtpStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct Otp {
    pub id: String,
    pub phone: String,
    pub code: String,
    pub is_used: bool,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("an unused otp already exists for this phone")]
    Conflict,
    #[error("unexpected error while accessing otps")]
    UnexpectedError,
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct CreateOtpPayload {
    pub phone: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Persistence for otp records.
///
/// `increment_attempts` and `mark_used` are conditional: they only apply while
/// the record is still unused and its attempt counter still equals
/// `seen_attempts`, and report whether a row was changed.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn delete_unused_by_phone(&self, phone: &str) -> Result<u64>;

    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp>;

    async fn find_latest_unused_by_phone(&self, phone: &str) -> Result<Option<Otp>>;

    async fn increment_attempts(&self, id: &str, seen_attempts: i32) -> Result<bool>;

    async fn mark_used(&self, id: &str, seen_attempts: i32) -> Result<bool>;

    async fn find_expired_unused(&self, now: DateTime<Utc>) -> Result<Vec<Otp>>;

    /// Deleting a missing record is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}
