use std::sync::Arc;

use chrono::Utc;
use painel_logging::{painel_info, painel_warn};

use crate::allowlist::{is_admin_listed, normalize_email, ADMIN_EMAILS};
use crate::store::{AdministratorRecord, DirectoryStore, StoreError};

/// Single source of truth for administrators.
///
/// The compiled [`ADMIN_EMAILS`] list is a bootstrap seed, reconciled into the
/// remote collection by [`AdminRegistry::bootstrap`]; when the store is down,
/// the seed is authoritative.
pub struct AdminRegistry {
    store: Arc<dyn DirectoryStore>,
}

impl AdminRegistry {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Seed every static admin missing from the collection, then rewrite the
    /// denormalized roster document. Returns how many records were seeded.
    pub async fn bootstrap(&self) -> Result<usize, StoreError> {
        let existing = self.store.list_administrators().await?;
        let mut seeded = 0;
        for email in ADMIN_EMAILS {
            if !existing.iter().any(|admin| admin.email == *email) {
                self.store.put_administrator(&seed_record(email)).await?;
                seeded += 1;
            }
        }

        let mut roster: Vec<String> = existing.into_iter().map(|admin| admin.email).collect();
        for email in ADMIN_EMAILS {
            if !roster.iter().any(|known| known == email) {
                roster.push((*email).to_owned());
            }
        }
        roster.sort();
        self.store.put_admin_roster(&roster).await?;

        painel_info!("admin bootstrap complete, {} record(s) seeded", seeded);
        Ok(seeded)
    }

    /// Remote records, falling back to the seed when the store is unreachable.
    pub async fn administrators(&self) -> Vec<AdministratorRecord> {
        match self.store.list_administrators().await {
            Ok(records) => records,
            Err(err) => {
                painel_warn!("administrator list unavailable, using seed: {}", err);
                ADMIN_EMAILS.iter().map(|email| seed_record(email)).collect()
            }
        }
    }

    /// Fails closed: store errors never grant the admin tag.
    pub async fn is_admin(&self, email: &str) -> bool {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return false;
        }
        if is_admin_listed(&normalized) {
            return true;
        }
        match self.store.list_administrators().await {
            Ok(records) => records
                .iter()
                .any(|admin| admin.is_active && admin.email == normalized),
            Err(err) => {
                painel_warn!("admin check failed for {}: {}", normalized, err);
                false
            }
        }
    }

    /// Upsert one administrator record (email is normalized first).
    pub async fn upsert_administrator(
        &self,
        mut record: AdministratorRecord,
    ) -> Result<(), StoreError> {
        record.email = normalize_email(&record.email);
        if record.email.is_empty() {
            return Err(StoreError::InvalidEmail);
        }
        if record.created_at.is_none() {
            record.created_at = Some(Utc::now());
        }
        self.store.put_administrator(&record).await
    }

    pub async fn remove_administrator(&self, email: &str) -> Result<(), StoreError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(StoreError::InvalidEmail);
        }
        self.store.delete_administrator(&normalized).await
    }
}

fn seed_record(email: &str) -> AdministratorRecord {
    let name = email.split('@').next().unwrap_or(email).to_owned();
    AdministratorRecord {
        email: email.to_owned(),
        name,
        role: "admin".to_owned(),
        is_active: true,
        created_at: None,
        last_login: None,
    }
}
