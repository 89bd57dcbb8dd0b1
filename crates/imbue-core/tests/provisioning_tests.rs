//! Integration tests for store provisioning: cold start, warm start,
//! bootstrap markers, and the readiness signal.

mod common;

use std::time::Duration;

use common::{config_for, sample_publication, write_seed};
use imbue_core::{ImbueStore, Platform, StoreApiError, StoreConfig};

#[tokio::test]
async fn test_cold_start_seeds_and_signals_ready() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImbueStore::open(config_for(dir.path(), Platform::Android)).unwrap();

    assert!(!store.is_ready());
    assert!(!store.is_seeded().unwrap());

    store.initialize().await.unwrap();

    assert!(store.is_ready());
    assert!(store.is_seeded().unwrap());
    assert_eq!(
        store.active_database_name().unwrap().as_deref(),
        Some("favorites")
    );

    let publications = store.list_publications().unwrap();
    assert_eq!(publications.len(), 1);
    assert_eq!(publications[0].id, "seed-1");
    assert_eq!(publications[0].name, "Gazpacho");
}

#[tokio::test]
async fn test_cold_start_writes_the_marker_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImbueStore::open(config_for(dir.path(), Platform::Android)).unwrap();
    store.initialize().await.unwrap();

    let text = std::fs::read_to_string(dir.path().join("imbue-bootstrap.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(record["seeded"], serde_json::json!(true));
    assert_eq!(record["database_name"], serde_json::json!("favorites"));
    assert!(record["provisioned_at"].is_string());
}

#[tokio::test]
async fn test_warm_start_reconnects_without_the_seed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), Platform::Android);

    let store = ImbueStore::open(config.clone()).unwrap();
    store.initialize().await.unwrap();
    store.create_publication(sample_publication("r1")).unwrap();
    drop(store);

    // A second cold start would need this file; a warm start must not.
    std::fs::remove_file(config.seed_path.as_deref().unwrap()).unwrap();

    let store = ImbueStore::open(config).unwrap();
    assert!(!store.is_ready());
    store.initialize().await.unwrap();
    assert!(store.is_ready());

    // Reimporting would have dropped r1 and left only the seed row.
    let ids: Vec<String> = store
        .list_publications()
        .unwrap()
        .into_iter()
        .map(|publication| publication.id)
        .collect();
    assert_eq!(ids, vec!["seed-1".to_string(), "r1".to_string()]);
}

#[tokio::test]
async fn test_invalid_seed_fails_and_leaves_device_unseeded() {
    let dir = tempfile::tempdir().unwrap();
    let seed_path = write_seed(dir.path());

    // Break the seed: drop one value from the row so arity no longer
    // matches the schema.
    let mut seed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&seed_path).unwrap()).unwrap();
    seed["tables"][0]["values"][0]
        .as_array_mut()
        .unwrap()
        .pop();
    std::fs::write(&seed_path, seed.to_string()).unwrap();

    let config = StoreConfig {
        data_dir: Some(dir.path().to_string_lossy().into_owned()),
        seed_url: None,
        seed_path: Some(seed_path.to_string_lossy().into_owned()),
        platform: Some(Platform::Android),
    };
    let store = ImbueStore::open(config).unwrap();
    let err = store.initialize().await.unwrap_err();

    assert!(matches!(err, StoreApiError::InvalidInput(_)));
    assert!(!store.is_ready());
    assert!(!store.is_seeded().unwrap());
}

#[tokio::test]
async fn test_failed_cold_start_retries_on_next_launch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), Platform::Android);
    let good_seed = config.seed_path.clone().unwrap();
    config.seed_path = Some(
        dir.path()
            .join("not-there.json")
            .to_string_lossy()
            .into_owned(),
    );

    let store = ImbueStore::open(config.clone()).unwrap();
    let err = store.initialize().await.unwrap_err();
    assert!(matches!(err, StoreApiError::Unavailable(_)));
    assert!(!store.is_seeded().unwrap());
    drop(store);

    // The marker record was never written, so the next launch provisions
    // cold again, this time from the good seed.
    config.seed_path = Some(good_seed);
    let store = ImbueStore::open(config).unwrap();
    store.initialize().await.unwrap();
    assert!(store.is_ready());
    assert_eq!(store.list_publications().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cold_start_without_a_seed_source_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        data_dir: Some(dir.path().to_string_lossy().into_owned()),
        seed_url: None,
        seed_path: None,
        platform: Some(Platform::Android),
    };
    let store = ImbueStore::open(config).unwrap();
    let err = store.initialize().await.unwrap_err();
    assert!(matches!(err, StoreApiError::InvalidInput(_)));
    assert!(!store.is_ready());
}

#[tokio::test]
async fn test_warm_start_needs_no_seed_source_at_all() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImbueStore::open(config_for(dir.path(), Platform::Android)).unwrap();
    store.initialize().await.unwrap();
    drop(store);

    let config = StoreConfig {
        data_dir: Some(dir.path().to_string_lossy().into_owned()),
        seed_url: None,
        seed_path: None,
        platform: Some(Platform::Android),
    };
    let store = ImbueStore::open(config).unwrap();
    store.initialize().await.unwrap();
    assert_eq!(store.list_publications().unwrap().len(), 1);
}

#[tokio::test]
async fn test_waiters_resume_when_initialize_completes() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImbueStore::open(config_for(dir.path(), Platform::Android)).unwrap();

    let waiter = {
        let store = store.clone();
        tokio::spawn(async move {
            store.wait_until_ready().await;
            store.list_publications().unwrap().len()
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    store.initialize().await.unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen, 1);
}

#[tokio::test]
async fn test_initialize_twice_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    let store = ImbueStore::open(config_for(dir.path(), Platform::Android)).unwrap();
    store.initialize().await.unwrap();
    store.create_publication(sample_publication("r1")).unwrap();

    store.initialize().await.unwrap();
    assert!(store.is_ready());
    assert_eq!(store.list_publications().unwrap().len(), 2);
}

#[tokio::test]
async fn test_web_snapshot_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), Platform::Web);

    let store = ImbueStore::open(config.clone()).unwrap();
    store.initialize().await.unwrap();
    store.create_publication(sample_publication("r1")).unwrap();
    drop(store);

    let store = ImbueStore::open(config).unwrap();
    store.initialize().await.unwrap();
    let ids: Vec<String> = store
        .list_publications()
        .unwrap()
        .into_iter()
        .map(|publication| publication.id)
        .collect();
    assert_eq!(ids, vec!["seed-1".to_string(), "r1".to_string()]);
}
