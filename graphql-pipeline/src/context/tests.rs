use std::time::Duration;

use crate::Context;

#[test]
fn test_context_insert() {
    let c = Context::new();
    assert!(c.insert("key1", 1).is_ok());
    assert_eq!(c.get("key1").unwrap(), Some(1));
}

#[test]
fn test_context_overwrite() {
    let c = Context::new();
    assert!(c.insert("overwrite", 2).is_ok());
    assert_eq!(c.insert("overwrite", 3).unwrap(), Some(2));
    assert_eq!(c.get("overwrite").unwrap(), Some(3));
}

#[test]
fn test_context_upsert() {
    let c = Context::new();
    assert!(c.insert("present", 1).is_ok());
    assert!(c.upsert("present", |v: i32| v + 1, || 0).is_ok());
    assert_eq!(c.get("present").unwrap(), Some(2));
    assert!(c.upsert("not_present", |v: i32| v + 1, || 0).is_ok());
    assert_eq!(c.get("not_present").unwrap(), Some(1));
}

#[test]
fn test_context_marshall_errors() {
    let c = Context::new();
    assert!(c.insert("string", "Some value".to_string()).is_ok());
    assert!(c.upsert("string", |v: i32| v + 1, || 0).is_err());
    assert!(c.get::<_, i32>("string").is_err());
}

#[test]
fn clones_share_entries_and_cancellation() {
    let c = Context::new();
    let clone = c.clone();
    clone.insert("user", "alice".to_string()).unwrap();
    assert!(c.contains_key("user"));

    assert!(!c.is_cancelled());
    clone.cancel();
    assert!(c.is_cancelled());
    assert!(c.cancellation_token().is_cancelled());
}

#[tokio::test]
async fn elapsed_deadline_counts_as_cancelled() {
    let c = Context::new().with_timeout(Duration::from_millis(10));
    assert!(c.deadline().is_some());
    assert!(!c.is_cancelled());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(c.is_cancelled());
}
