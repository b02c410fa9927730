//! End-to-end tests for the `auth.Auth` gRPC service.

mod common;

use bound_store::{MemoryStore, TimeBoundStore};
use common::{StalledStore, TestServer, TTL};
use gsm_auth::proto::PhoneNumber;
use gsm_auth::Fingerprint;
use std::sync::Arc;
use std::time::Duration;
use tonic::{Code, Request};

fn phone(number: &str) -> PhoneNumber {
    PhoneNumber {
        number: number.to_string(),
    }
}

#[tokio::test]
async fn test_hash_and_store_round_trip() {
    let store = MemoryStore::new();
    let server = TestServer::start(Arc::new(store.clone())).await;
    let mut client = server.client().await;

    let code = client
        .hash_and_store(phone("+15551234567"))
        .await
        .unwrap()
        .into_inner()
        .code;

    assert_eq!(code, Fingerprint::of("+15551234567").as_str());
    assert_eq!(code.len(), 64);
    assert_eq!(store.get("+15551234567").await, Some(code.clone()));

    let info = server.log.info.lock().clone();
    assert_eq!(info, vec![("+15551234567".to_string(), code)]);
    assert!(server.log.errors.lock().is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_store_failure_returns_error_status() {
    let store = MemoryStore::new();
    store.close().await.unwrap();
    let server = TestServer::start(Arc::new(store)).await;
    let mut client = server.client().await;

    let status = client
        .hash_and_store(phone("+15551234567"))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::Unavailable);
    assert!(!status.message().contains("+15551234567"));
    assert!(server.log.info.lock().is_empty());
    assert_eq!(server.log.errors.lock().len(), 1);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_repeat_submission_returns_same_code() {
    let store = MemoryStore::new();
    let server = TestServer::start(Arc::new(store.clone())).await;
    let mut client = server.client().await;

    let first = client
        .hash_and_store(phone("+15551234567"))
        .await
        .unwrap()
        .into_inner()
        .code;
    let second = client
        .hash_and_store(phone("+15551234567"))
        .await
        .unwrap()
        .into_inner()
        .code;

    assert_eq!(first, second);
    assert_eq!(store.len().await, 1);
    assert_eq!(server.log.info.lock().len(), 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_number_is_accepted() {
    let store = MemoryStore::new();
    let server = TestServer::start(Arc::new(store.clone())).await;
    let mut client = server.client().await;

    let code = client
        .hash_and_store(phone(""))
        .await
        .unwrap()
        .into_inner()
        .code;

    assert_eq!(code, Fingerprint::of("").as_str());
    assert_eq!(store.get("").await, Some(code));

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_are_independent() {
    let store = MemoryStore::new();
    let server = TestServer::start(Arc::new(store.clone())).await;
    let client = server.client().await;

    let calls = (1..=100).map(|i| {
        let mut client = client.clone();
        let number = format!("+1555000{:04}", i);
        async move {
            let code = client
                .hash_and_store(phone(&number))
                .await
                .map(|r| r.into_inner().code);
            (number, code)
        }
    });

    for (number, code) in futures::future::join_all(calls).await {
        let code = code.unwrap();
        assert_eq!(code, Fingerprint::of(&number).as_str());
        assert_eq!(store.get(&number).await, Some(code), "record for {}", number);
    }

    assert_eq!(store.len().await, 100);
    assert_eq!(server.log.info.lock().len(), 100);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_caller_deadline_abandons_write() {
    let server = TestServer::start(Arc::new(StalledStore)).await;
    let mut client = server.client().await;

    let mut request = Request::new(phone("+15551234567"));
    request.set_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let status = client.hash_and_store(request).await.unwrap_err();

    assert!(matches!(
        status.code(),
        Code::Cancelled | Code::DeadlineExceeded
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(server.log.info.lock().is_empty());
    assert!(server.log.errors.lock().is_empty());

    server.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_issued_code_expires_with_ttl() {
    let store = MemoryStore::new();
    let issuer = gsm_auth::FingerprintIssuer::new(
        Arc::new(store.clone()),
        Arc::new(common::RecordingLog::default()),
        TTL,
    );

    let fingerprint = issuer.hash_and_store("+15551234567").await.unwrap();
    assert_eq!(
        store.get("+15551234567").await.as_deref(),
        Some(fingerprint.as_str())
    );

    tokio::time::advance(TTL).await;
    assert!(store.get("+15551234567").await.is_none());
}

#[tokio::test]
async fn test_shutdown_completes_cleanly() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let mut client = server.client().await;

    client.hash_and_store(phone("+15551234567")).await.unwrap();
    drop(client);

    assert!(server.stop().await.is_ok());
}
