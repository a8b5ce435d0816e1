// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the best-effort image upload pipeline.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use tempfile::tempdir;

use gn_core::{ImageReference, Order};

use super::*;
use crate::store::{LocalStore, MemoryStore};

/// Scripted image host: answers uploads from a queue of canned results.
struct MockHost {
    results: Arc<Mutex<VecDeque<UploadResult<String>>>>,
}

impl MockHost {
    fn new() -> Self {
        MockHost {
            results: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    fn push_result(&self, result: UploadResult<String>) {
        self.results.lock().unwrap().push_back(result);
    }
}

impl ImageHost for MockHost {
    fn upload(
        &mut self,
        _bytes: Vec<u8>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = UploadResult<String>> + Send + '_>>
    {
        let results = Arc::clone(&self.results);
        Box::pin(async move {
            results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("https://img.example/default.jpg".to_string()))
        })
    }
}

fn seeded_store() -> (Arc<dyn LocalStore>, i64) {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    let order = Order {
        id: 0,
        customer: "Marta".to_string(),
        flavor: "chocolate".to_string(),
        filling: "raspberry".to_string(),
        price: 45.0,
        delivery_date: NaiveDate::from_ymd_opt(2026, 6, 14).unwrap(),
        notes: None,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let id = store.insert_order(&order).unwrap();
    (store, id)
}

fn make_reference(order_id: i64, path: &str) -> ImageReference {
    ImageReference {
        order_id,
        local_path: path.to_string(),
        remote_url: None,
        uploaded: false,
        created_at: Utc::now(),
    }
}

#[test]
fn test_pending_uploads_persist_and_remove() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    let uploads = PendingUploads::new(Arc::clone(&store));
    assert!(uploads.is_empty().unwrap());

    uploads.push(make_reference(1, "/a.jpg")).unwrap();
    uploads.push(make_reference(1, "/b.jpg")).unwrap();
    assert_eq!(uploads.len().unwrap(), 2);

    // A fresh handle over the same store sees the persisted list
    let reopened = PendingUploads::new(Arc::clone(&store));
    assert_eq!(reopened.len().unwrap(), 2);

    uploads.remove(1, "/a.jpg").unwrap();
    let remaining = uploads.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].local_path, "/b.jpg");
}

#[test]
fn test_pending_uploads_corruption_loads_as_empty() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    store.put_blob(UPLOADS_BLOB_KEY, "not json at all").unwrap();

    let uploads = PendingUploads::new(store);
    assert!(uploads.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_successful_upload_updates_order_and_clears_pending() {
    let dir = tempdir().unwrap();
    let photo = dir.path().join("cake.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    let (store, order_id) = seeded_store();
    let local: Arc<dyn crate::store::LocalStore> = Arc::clone(&store);
    PendingUploads::new(Arc::clone(&local))
        .push(make_reference(order_id, photo.to_str().unwrap()))
        .unwrap();

    let host = MockHost::new();
    host.push_result(Ok("https://img.example/cake.jpg".to_string()));

    let mut uploader = ImageUploader::new(Arc::clone(&local), host);
    let report = uploader.process().await.unwrap();

    assert_eq!(report.uploaded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(
        store.get_order(order_id).unwrap().unwrap().image_url.as_deref(),
        Some("https://img.example/cake.jpg")
    );
    assert!(PendingUploads::new(local).is_empty().unwrap());
}

#[tokio::test]
async fn test_failed_upload_stays_pending() {
    let dir = tempdir().unwrap();
    let photo = dir.path().join("cake.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    let (store, order_id) = seeded_store();
    let local: Arc<dyn crate::store::LocalStore> = Arc::clone(&store);
    PendingUploads::new(Arc::clone(&local))
        .push(make_reference(order_id, photo.to_str().unwrap()))
        .unwrap();

    let host = MockHost::new();
    host.push_result(Err(UploadError::Network("socket reset".to_string())));

    let mut uploader = ImageUploader::new(Arc::clone(&local), host);
    let report = uploader.process().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.uploaded, 0);
    // No retry ceiling here: the photo just waits for the next pass
    assert_eq!(PendingUploads::new(Arc::clone(&local)).len().unwrap(), 1);
    assert!(store.get_order(order_id).unwrap().unwrap().image_url.is_none());
}

#[tokio::test]
async fn test_missing_file_is_dropped() {
    let (store, order_id) = seeded_store();
    let local: Arc<dyn crate::store::LocalStore> = Arc::clone(&store);
    PendingUploads::new(Arc::clone(&local))
        .push(make_reference(order_id, "/no/such/photo.jpg"))
        .unwrap();

    let mut uploader = ImageUploader::new(Arc::clone(&local), MockHost::new());
    let report = uploader.process().await.unwrap();

    assert_eq!(report.missing, 1);
    assert!(PendingUploads::new(local).is_empty().unwrap());
}

#[tokio::test]
async fn test_upload_for_deleted_order_still_clears_pending() {
    let dir = tempdir().unwrap();
    let photo = dir.path().join("cake.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    let (store, order_id) = seeded_store();
    let local: Arc<dyn crate::store::LocalStore> = Arc::clone(&store);
    PendingUploads::new(Arc::clone(&local))
        .push(make_reference(order_id, photo.to_str().unwrap()))
        .unwrap();
    store.delete_order(order_id).unwrap();

    let mut uploader = ImageUploader::new(Arc::clone(&local), MockHost::new());
    let report = uploader.process().await.unwrap();

    assert_eq!(report.uploaded, 1);
    assert!(PendingUploads::new(local).is_empty().unwrap());
}
