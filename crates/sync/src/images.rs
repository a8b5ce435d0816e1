// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort image upload pipeline.
//!
//! Reference photos are large and have different failure economics than
//! record mutations, so they travel through their own pending list —
//! structurally like the sync queue but intentionally separate, with no
//! retry ceiling. A failed upload simply stays pending until the next
//! [`ImageUploader::process`] run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gn_core::ImageReference;

use crate::queue::QueueResult;
use crate::store::LocalStore;

/// Blob key the pending-uploads list is persisted under.
pub const UPLOADS_BLOB_KEY: &str = "pending_uploads";

/// Error type for image host operations.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Network-level failure; the upload stays pending.
    #[error("upload failed: {0}")]
    Network(String),

    /// The host rejected the image.
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Result type for image host operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// The external image-hosting service: accepts bytes, returns a stable URL.
pub trait ImageHost: Send + Sync {
    fn upload(
        &mut self,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = UploadResult<String>> + Send + '_>>;
}

/// Durable list of photos awaiting upload.
///
/// Persisted to the local store's blob table on every mutation, like the
/// sync queue; an unparseable list loads as empty.
pub struct PendingUploads {
    store: Arc<dyn LocalStore>,
}

impl PendingUploads {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        PendingUploads { store }
    }

    /// Appends a reference to the pending list.
    pub fn push(&self, reference: ImageReference) -> QueueResult<()> {
        let mut pending = self.list()?;
        pending.push(reference);
        self.persist(&pending)
    }

    /// All pending references, oldest first.
    pub fn list(&self) -> QueueResult<Vec<ImageReference>> {
        match self.store.get_blob(UPLOADS_BLOB_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(pending) => Ok(pending),
                Err(e) => {
                    tracing::warn!("discarding unparseable pending uploads: {}", e);
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Number of pending references.
    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.list()?.len())
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes the reference for the given order and path.
    pub fn remove(&self, order_id: i64, local_path: &str) -> QueueResult<()> {
        let mut pending = self.list()?;
        pending.retain(|r| !(r.order_id == order_id && r.local_path == local_path));
        self.persist(&pending)
    }

    fn persist(&self, pending: &[ImageReference]) -> QueueResult<()> {
        let raw = serde_json::to_string(pending)?;
        self.store.put_blob(UPLOADS_BLOB_KEY, &raw)?;
        Ok(())
    }
}

/// Outcome of one upload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Photos uploaded and removed from the pending list.
    pub uploaded: usize,
    /// Photos that failed to upload and stay pending.
    pub failed: usize,
    /// Photos whose local file no longer exists; dropped from the list.
    pub missing: usize,
}

/// Drives the pending list against an [`ImageHost`].
pub struct ImageUploader<H: ImageHost> {
    uploads: PendingUploads,
    host: H,
    local: Arc<dyn LocalStore>,
}

impl<H: ImageHost> ImageUploader<H> {
    pub fn new(local: Arc<dyn LocalStore>, host: H) -> Self {
        ImageUploader {
            uploads: PendingUploads::new(Arc::clone(&local)),
            host,
            local,
        }
    }

    /// Attempts every pending upload once.
    ///
    /// On success the order's `image_url` is updated in the local store and
    /// the reference leaves the pending list. Failures stay pending for the
    /// next pass; references to files that no longer exist are dropped.
    pub async fn process(&mut self) -> crate::error::Result<UploadReport> {
        let pending = self.uploads.list()?;
        let mut report = UploadReport::default();

        for reference in pending {
            let bytes = match std::fs::read(&reference.local_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        "dropping upload for missing file {}: {}",
                        reference.local_path,
                        e
                    );
                    self.uploads.remove(reference.order_id, &reference.local_path)?;
                    report.missing += 1;
                    continue;
                }
            };

            match self.host.upload(bytes).await {
                Ok(url) => {
                    if let Some(mut order) = self.local.get_order(reference.order_id)? {
                        order.image_url = Some(url);
                        self.local.update_order(&order)?;
                    }
                    self.uploads.remove(reference.order_id, &reference.local_path)?;
                    report.uploaded += 1;
                }
                Err(e) => {
                    tracing::debug!(
                        "upload for order {} failed, staying pending: {}",
                        reference.order_id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "images_tests.rs"]
mod tests;
