use super::{CreateOtpPayload, Error, Otp, OtpStore, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use ulid::Ulid;

/// In-process store with the same single-unused-per-phone rule as the
/// `otps_phone_unused_idx` index.
#[derive(Default)]
pub struct MemoryOtpStore {
    records: Mutex<Vec<Otp>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, otp: Otp) {
        self.records.lock().unwrap().push(otp);
    }

    pub fn records(&self) -> Vec<Otp> {
        self.records.lock().unwrap().clone()
    }

    pub fn unused_for(&self, phone: &str) -> Vec<Otp> {
        self.records()
            .into_iter()
            .filter(|otp| otp.phone == phone && !otp.is_used)
            .collect()
    }

    fn update<F>(&self, id: &str, seen_attempts: i32, apply: F) -> bool
    where
        F: FnOnce(&mut Otp),
    {
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|otp| otp.id == id && otp.attempts == seen_attempts && !otp.is_used)
        {
            Some(otp) => {
                apply(otp);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn delete_unused_by_phone(&self, phone: &str) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|otp| otp.phone != phone || otp.is_used);
        Ok((before - records.len()) as u64)
    }

    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|otp| otp.phone == payload.phone && !otp.is_used)
        {
            return Err(Error::Conflict);
        }

        let otp = Otp {
            id: Ulid::new().to_string(),
            phone: payload.phone,
            code: payload.code,
            is_used: false,
            attempts: 0,
            expires_at: payload.expires_at,
            created_at: payload.created_at,
        };
        records.push(otp.clone());
        Ok(otp)
    }

    async fn find_latest_unused_by_phone(&self, phone: &str) -> Result<Option<Otp>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|otp| otp.phone == phone && !otp.is_used)
            .max_by_key(|otp| otp.created_at)
            .cloned())
    }

    async fn increment_attempts(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        Ok(self.update(id, seen_attempts, |otp| otp.attempts += 1))
    }

    async fn mark_used(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        Ok(self.update(id, seen_attempts, |otp| otp.is_used = true))
    }

    async fn find_expired_unused(&self, now: DateTime<Utc>) -> Result<Vec<Otp>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|otp| !otp.is_used && otp.expires_at < now)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|otp| otp.id != id);
        Ok(records.len() != before)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fault {
    /// Every call fails.
    Unavailable,
    /// Every insert collides with a concurrent writer.
    ConflictOnCreate,
    /// Deletes by id find the record already gone.
    DeletedElsewhere,
}

/// Wraps a [`MemoryOtpStore`] and injects one kind of failure.
pub struct FaultyOtpStore {
    inner: MemoryOtpStore,
    fault: Fault,
    creates: AtomicUsize,
    deletes: AtomicUsize,
}

impl FaultyOtpStore {
    pub fn new(fault: Fault) -> Self {
        Self {
            inner: MemoryOtpStore::new(),
            fault,
            creates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &MemoryOtpStore {
        &self.inner
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match self.fault {
            Fault::Unavailable => Err(Error::UnexpectedError),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl OtpStore for FaultyOtpStore {
    async fn delete_unused_by_phone(&self, phone: &str) -> Result<u64> {
        self.check()?;
        self.inner.delete_unused_by_phone(phone).await
    }

    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.fault == Fault::ConflictOnCreate {
            return Err(Error::Conflict);
        }
        self.inner.create(payload).await
    }

    async fn find_latest_unused_by_phone(&self, phone: &str) -> Result<Option<Otp>> {
        self.check()?;
        self.inner.find_latest_unused_by_phone(phone).await
    }

    async fn increment_attempts(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        self.check()?;
        self.inner.increment_attempts(id, seen_attempts).await
    }

    async fn mark_used(&self, id: &str, seen_attempts: i32) -> Result<bool> {
        self.check()?;
        self.inner.mark_used(id, seen_attempts).await
    }

    async fn find_expired_unused(&self, now: DateTime<Utc>) -> Result<Vec<Otp>> {
        self.check()?;
        self.inner.find_expired_unused(now).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.fault == Fault::DeletedElsewhere {
            return Ok(false);
        }
        self.inner.delete_by_id(id).await
    }
}
