use std::thread;
use std::time::Duration;

use painel_auth::{AuthCache, CachedDecision};

#[test]
fn absent_entry_is_unknown() {
    let cache = AuthCache::default();
    assert_eq!(cache.get("x@y.com"), None);
}

#[test]
fn denied_is_a_definitive_answer() {
    let mut cache = AuthCache::default();
    cache.insert("x@y.com".to_owned(), CachedDecision::Denied);
    assert_eq!(cache.get("x@y.com"), Some(CachedDecision::Denied));
}

#[test]
fn overwrite_flips_the_decision_in_place() {
    let mut cache = AuthCache::default();
    cache.insert("x@y.com".to_owned(), CachedDecision::Denied);
    cache.insert("x@y.com".to_owned(), CachedDecision::Authorized);

    assert_eq!(cache.get("x@y.com"), Some(CachedDecision::Authorized));
    assert_eq!(cache.len(), 1);
}

#[test]
fn oldest_entry_is_evicted_at_capacity() {
    let mut cache = AuthCache::new(2, Duration::from_secs(60));
    cache.insert("a@y.com".to_owned(), CachedDecision::Authorized);
    thread::sleep(Duration::from_millis(5));
    cache.insert("b@y.com".to_owned(), CachedDecision::Denied);
    thread::sleep(Duration::from_millis(5));
    cache.insert("c@y.com".to_owned(), CachedDecision::Authorized);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a@y.com"), None);
    assert_eq!(cache.get("b@y.com"), Some(CachedDecision::Denied));
    assert_eq!(cache.get("c@y.com"), Some(CachedDecision::Authorized));
}

#[test]
fn zero_ttl_expires_immediately() {
    let mut cache = AuthCache::new(8, Duration::ZERO);
    cache.insert("a@y.com".to_owned(), CachedDecision::Authorized);
    assert_eq!(cache.get("a@y.com"), None);
    // The slot is still occupied until overwritten or evicted.
    assert!(!cache.is_empty());
}
