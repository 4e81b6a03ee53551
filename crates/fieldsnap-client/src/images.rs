//! In-memory registry of the transient binary data behind capture
//! records.
//!
//! Handles are scoped resources: they stay valid until released, and
//! the session releases every outstanding handle on teardown so the
//! bytes never outlive the visit.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use fieldsnap_shared::types::ImageHandle;

#[derive(Debug, Default)]
pub struct ImageStore {
    blobs: HashMap<ImageHandle, Bytes>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: Bytes) -> ImageHandle {
        let handle = ImageHandle::new();
        debug!(handle = %handle, size = data.len(), "Stored image bytes");
        self.blobs.insert(handle, data);
        handle
    }

    /// Bytes behind the handle. `Bytes` clones are cheap reference
    /// bumps, not copies.
    pub fn get(&self, handle: ImageHandle) -> Option<Bytes> {
        self.blobs.get(&handle).cloned()
    }

    pub fn release(&mut self, handle: ImageHandle) -> bool {
        self.blobs.remove(&handle).is_some()
    }

    /// Release every handle (session teardown).
    pub fn release_all(&mut self) {
        if !self.blobs.is_empty() {
            debug!(count = self.blobs.len(), "Released image handles");
        }
        self.blobs.clear();
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut store = ImageStore::new();
        let handle = store.insert(Bytes::from_static(b"jpeg-bytes"));

        assert_eq!(store.get(handle).unwrap(), Bytes::from_static(b"jpeg-bytes"));
    }

    #[test]
    fn test_release() {
        let mut store = ImageStore::new();
        let handle = store.insert(Bytes::from_static(b"jpeg-bytes"));

        assert!(store.release(handle));
        assert!(store.get(handle).is_none());
        assert!(!store.release(handle));
    }

    #[test]
    fn test_release_all() {
        let mut store = ImageStore::new();
        store.insert(Bytes::from_static(b"one"));
        store.insert(Bytes::from_static(b"two"));

        store.release_all();
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_handle_is_none() {
        let store = ImageStore::new();
        assert!(store.get(ImageHandle::new()).is_none());
    }
}
