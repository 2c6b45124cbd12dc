use super::repository::{self, CreateOtpPayload, OtpStore};
use crate::{
    modules::notification::service::{
        sms::{SmsGateway, SmsReceipt},
        Notification,
    },
    types::DEFAULT_SMS_SENDER_NAME,
    utils::{
        clock::{Clock, SystemClock},
        phone,
    },
};
use chrono::Duration;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub const CODE_LENGTH: u32 = 6;
const MAX_CODE_LENGTH: u32 = 18;
const MAX_CREATE_ATTEMPTS: usize = 3;

#[derive(Clone, Debug)]
pub struct OtpPolicy {
    pub code_length: u32,
    pub validity: Duration,
    pub max_attempts: i32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            validity: Duration::minutes(10),
            max_attempts: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] repository::Error),
    #[error("gave up creating otp after {0} conflicting attempts")]
    Contended(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Uniformly random numeric code with exactly `length` digits.
pub fn generate_code(length: u32) -> String {
    let length = length.clamp(1, MAX_CODE_LENGTH);
    let low = 10u64.pow(length - 1);
    let high = low * 10;
    let low = if length == 1 { 0 } else { low };

    rand::rng().random_range(low..high).to_string()
}

pub struct OtpManager {
    store: Arc<dyn OtpStore>,
    gateway: Arc<dyn SmsGateway>,
    clock: Arc<dyn Clock>,
    policy: OtpPolicy,
    sender_name: String,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl OtpManager {
    pub fn new(store: Arc<dyn OtpStore>, gateway: Arc<dyn SmsGateway>) -> Self {
        Self {
            store,
            gateway,
            clock: Arc::new(SystemClock),
            policy: OtpPolicy::default(),
            sender_name: DEFAULT_SMS_SENDER_NAME.to_string(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sender_name(mut self, sender_name: String) -> Self {
        self.sender_name = sender_name;
        self
    }

    // Serializes create and verify per phone within this process.
    async fn lock_phone(&self, phone: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = match self.locks.lock() {
                Ok(locks) => locks,
                Err(poisoned) => poisoned.into_inner(),
            };
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(phone.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    /// Replaces any unused code for `phone` with a fresh one and returns it.
    pub async fn create(&self, phone: &str) -> Result<String> {
        let phone = phone::normalize(phone);
        let _guard = self.lock_phone(&phone).await;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let superseded = self.store.delete_unused_by_phone(&phone).await?;
            if superseded > 0 {
                tracing::debug!("Superseded {} unused otp(s) for {}", superseded, phone);
            }

            let code = generate_code(self.policy.code_length);
            let now = self.clock.now();

            match self
                .store
                .create(CreateOtpPayload {
                    phone: phone.clone(),
                    code: code.clone(),
                    created_at: now,
                    expires_at: now + self.policy.validity,
                })
                .await
            {
                Ok(otp) => {
                    tracing::info!("Created otp {} for {}", otp.id, phone);
                    return Ok(code);
                }
                Err(repository::Error::Conflict) => {
                    tracing::warn!(
                        "Otp creation for {} conflicted (attempt {}/{})",
                        phone,
                        attempt,
                        MAX_CREATE_ATTEMPTS
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(Error::Contended(MAX_CREATE_ATTEMPTS))
    }

    /// Checks `code` against the latest unused otp for `phone`.
    ///
    /// Expired, exhausted, mismatched and missing codes are all reported as
    /// `false`. Store failures are logged and reported the same way.
    pub async fn verify(&self, phone: &str, code: &str) -> bool {
        let phone = phone::normalize(phone);
        let _guard = self.lock_phone(&phone).await;

        match self.check(&phone, code).await {
            Ok(verified) => verified,
            Err(err) => {
                tracing::error!("Failed to verify otp for {}: {}", phone, err);
                false
            }
        }
    }

    async fn check(&self, phone: &str, code: &str) -> repository::Result<bool> {
        let Some(otp) = self.store.find_latest_unused_by_phone(phone).await? else {
            tracing::debug!("No unused otp for {}", phone);
            return Ok(false);
        };

        if otp.is_expired(self.clock.now()) {
            tracing::debug!("Otp {} expired at {}", otp.id, otp.expires_at);
            return Ok(false);
        }

        if otp.attempts >= self.policy.max_attempts {
            tracing::debug!("Otp {} is locked after {} attempts", otp.id, otp.attempts);
            return Ok(false);
        }

        if otp.code != code {
            if !self.store.increment_attempts(&otp.id, otp.attempts).await? {
                tracing::warn!("Otp {} changed while recording a failed attempt", otp.id);
            }
            return Ok(false);
        }

        let used = self.store.mark_used(&otp.id, otp.attempts).await?;
        if !used {
            tracing::warn!("Otp {} changed before it could be marked used", otp.id);
        }

        Ok(used)
    }

    /// Texts `code` to `phone`. True only when the gateway accepted the
    /// message and returned its identifier.
    pub async fn send_sms(&self, phone: &str, code: &str) -> bool {
        let recipient = phone::normalize(phone);
        let content = Notification::verification_otp_requested(
            code.to_string(),
            self.policy.validity.num_minutes(),
        )
        .render(&self.sender_name);

        match self.gateway.send(&recipient, &content).await {
            Ok(SmsReceipt {
                message_id: Some(message_id),
            }) => {
                tracing::info!("OTP sms sent to {} (message id {})", recipient, message_id);
                true
            }
            Ok(SmsReceipt { message_id: None }) => {
                tracing::error!("SMS gateway returned no message id for {}", recipient);
                false
            }
            Err(err) => {
                tracing::error!("Failed to send OTP sms to {}: {}", recipient, err);
                false
            }
        }
    }

    /// Deletes every unused otp whose expiry has passed. Returns how many
    /// records this run removed.
    pub async fn sweep_expired(&self) -> repository::Result<usize> {
        let expired = self.store.find_expired_unused(self.clock.now()).await?;
        let mut deleted = 0;

        for otp in expired {
            match self.store.delete_by_id(&otp.id).await {
                Ok(true) => deleted += 1,
                Ok(false) => tracing::debug!("Expired otp {} was already gone", otp.id),
                Err(err) => tracing::error!("Failed to delete expired otp {}: {}", otp.id, err),
            }
        }

        Ok(deleted)
    }
}
