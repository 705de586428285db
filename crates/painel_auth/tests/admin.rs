use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use painel_auth::{
    AdminRegistry, AdministratorRecord, AuthorizedEmailRecord, DirectoryStore, StoreError,
    ADMIN_EMAILS,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct FakeStore {
    admins: Mutex<HashMap<String, AdministratorRecord>>,
    roster: Mutex<Option<Vec<String>>>,
    fail: AtomicBool,
}

impl FakeStore {
    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn insert_admin(&self, email: &str, is_active: bool) {
        self.admins.lock().unwrap().insert(
            email.to_owned(),
            AdministratorRecord {
                email: email.to_owned(),
                name: email.split('@').next().unwrap().to_owned(),
                role: "admin".to_owned(),
                is_active,
                created_at: None,
                last_login: None,
            },
        );
    }

    fn roster(&self) -> Option<Vec<String>> {
        self.roster.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryStore for FakeStore {
    async fn find_authorized_email(
        &self,
        _email: &str,
    ) -> Result<Option<AuthorizedEmailRecord>, StoreError> {
        Ok(None)
    }

    async fn put_authorized_email(&self, _record: &AuthorizedEmailRecord) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_authorized_email(&self, _email: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_authorized_emails(&self) -> Result<Vec<AuthorizedEmailRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_administrators(&self) -> Result<Vec<AdministratorRecord>, StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Network("store offline".to_owned()));
        }
        Ok(self.admins.lock().unwrap().values().cloned().collect())
    }

    async fn put_administrator(&self, record: &AdministratorRecord) -> Result<(), StoreError> {
        self.admins
            .lock()
            .unwrap()
            .insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn delete_administrator(&self, email: &str) -> Result<(), StoreError> {
        self.admins.lock().unwrap().remove(email);
        Ok(())
    }

    async fn put_admin_roster(&self, emails: &[String]) -> Result<(), StoreError> {
        *self.roster.lock().unwrap() = Some(emails.to_vec());
        Ok(())
    }
}

#[tokio::test]
async fn bootstrap_seeds_missing_admins_and_rewrites_roster() {
    let store = Arc::new(FakeStore::default());
    store.insert_admin(ADMIN_EMAILS[0], true);
    let registry = AdminRegistry::new(store.clone());

    let seeded = registry.bootstrap().await.unwrap();
    assert_eq!(seeded, ADMIN_EMAILS.len() - 1);

    let mut expected: Vec<String> = ADMIN_EMAILS.iter().map(|e| (*e).to_owned()).collect();
    expected.sort();
    assert_eq!(store.roster(), Some(expected));

    // A second bootstrap is a no-op seed-wise.
    let seeded = registry.bootstrap().await.unwrap();
    assert_eq!(seeded, 0);
}

#[tokio::test]
async fn administrators_falls_back_to_seed_when_store_is_down() {
    let store = Arc::new(FakeStore::default());
    store.set_failing(true);
    let registry = AdminRegistry::new(store);

    let admins = registry.administrators().await;
    assert_eq!(admins.len(), ADMIN_EMAILS.len());
    assert!(admins.iter().all(|admin| admin.is_active));
    assert!(admins.iter().all(|admin| admin.role == "admin"));
}

#[tokio::test]
async fn static_admin_recognized_even_when_store_is_down() {
    let store = Arc::new(FakeStore::default());
    store.set_failing(true);
    let registry = AdminRegistry::new(store);

    assert!(registry.is_admin(&ADMIN_EMAILS[0].to_uppercase()).await);
    assert!(!registry.is_admin("qualquer@fora.com").await);
}

#[tokio::test]
async fn store_admin_requires_active_flag() {
    let store = Arc::new(FakeStore::default());
    store.insert_admin("dinamico@fora.com", true);
    store.insert_admin("desativado@fora.com", false);
    let registry = AdminRegistry::new(store);

    assert!(registry.is_admin("dinamico@fora.com").await);
    assert!(!registry.is_admin("desativado@fora.com").await);
}

#[tokio::test]
async fn upsert_normalizes_email_and_stamps_creation() {
    let store = Arc::new(FakeStore::default());
    let registry = AdminRegistry::new(store.clone());

    registry
        .upsert_administrator(AdministratorRecord {
            email: "  Nova@Fora.com ".to_owned(),
            name: "Nova".to_owned(),
            role: "admin".to_owned(),
            is_active: true,
            created_at: None,
            last_login: None,
        })
        .await
        .unwrap();

    let admins = store.admins.lock().unwrap();
    let record = admins.get("nova@fora.com").expect("normalized key");
    assert!(record.created_at.is_some());
}

#[tokio::test]
async fn remove_administrator_deletes_the_record() {
    let store = Arc::new(FakeStore::default());
    store.insert_admin("dinamico@fora.com", true);
    let registry = AdminRegistry::new(store.clone());

    registry
        .remove_administrator("Dinamico@Fora.com")
        .await
        .unwrap();
    assert!(store.admins.lock().unwrap().is_empty());
}
