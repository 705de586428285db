use std::sync::{Arc, Mutex};

use chrono::Utc;
use painel_logging::painel_warn;

use crate::allowlist::{is_listed, normalize_email};
use crate::cache::{AuthCache, CachedDecision};
use crate::store::{AuthorizedEmailRecord, DirectoryStore, StoreError};

/// Decides whether an email may use the application.
///
/// Lookup order: compiled allow-list, decision cache, remote store. Store
/// failures fail closed and are never cached, so a transient outage does not
/// pin an email as denied.
pub struct AuthorizationGate {
    store: Arc<dyn DirectoryStore>,
    cache: Mutex<AuthCache>,
}

impl AuthorizationGate {
    pub fn new(store: Arc<dyn DirectoryStore>, cache: AuthCache) -> Self {
        Self {
            store,
            cache: Mutex::new(cache),
        }
    }

    /// Never errors: any indeterminate outcome is "not authorized".
    pub async fn is_authorized(&self, email: &str) -> bool {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return false;
        }
        if is_listed(&normalized) {
            return true;
        }
        if let Some(decision) = self.cached(&normalized) {
            return decision == CachedDecision::Authorized;
        }

        match self.store.find_authorized_email(&normalized).await {
            Ok(found) => {
                let decision = if found.is_some() {
                    CachedDecision::Authorized
                } else {
                    CachedDecision::Denied
                };
                self.remember(normalized, decision);
                decision == CachedDecision::Authorized
            }
            Err(err) => {
                painel_warn!("authorization lookup failed for {}: {}", normalized, err);
                false
            }
        }
    }

    /// Upsert the remote record and mark the email authorized locally.
    pub async fn add_authorized_email(&self, email: &str) -> Result<(), StoreError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(StoreError::InvalidEmail);
        }
        let record = AuthorizedEmailRecord {
            email: normalized.clone(),
            created_at: Some(Utc::now()),
        };
        self.store.put_authorized_email(&record).await?;
        self.remember(normalized, CachedDecision::Authorized);
        Ok(())
    }

    /// Delete the remote record and record an explicit local denial.
    pub async fn remove_authorized_email(&self, email: &str) -> Result<(), StoreError> {
        let normalized = normalize_email(email);
        if normalized.is_empty() {
            return Err(StoreError::InvalidEmail);
        }
        self.store.delete_authorized_email(&normalized).await?;
        self.remember(normalized, CachedDecision::Denied);
        Ok(())
    }

    pub async fn list_authorized_emails(&self) -> Result<Vec<String>, StoreError> {
        let records = self.store.list_authorized_emails().await?;
        Ok(records.into_iter().map(|record| record.email).collect())
    }

    fn cached(&self, email: &str) -> Option<CachedDecision> {
        self.lock_cache().get(email)
    }

    fn remember(&self, email: String, decision: CachedDecision) {
        self.lock_cache().insert(email, decision);
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AuthCache> {
        // A poisoned cache only holds booleans; keep using it.
        self.cache.lock().unwrap_or_else(|err| err.into_inner())
    }
}
