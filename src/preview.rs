//! Transient preview URLs for selected images.
//!
//! A preview URL is a local handle to the *original* file for on-screen
//! display only; it is never sent to the service. URLs resolve through a
//! [`PreviewRegistry`] for as long as their [`PreviewHandle`] lives, and stop
//! resolving once the handle is dropped or revoked. [`PreviewSlot`] holds the
//! handle for the current selection and releases the old one on replace.

use crate::imaging::SourceImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:dish-go/";

/// Bytes behind a live preview URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub content_type: Option<String>,
    pub data: Arc<[u8]>,
}

type Entries = Mutex<HashMap<Uuid, Arc<PreviewEntry>>>;

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<Uuid, Arc<PreviewEntry>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Table of live preview URLs. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Entries>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` and return the handle that keeps its URL alive.
    pub fn create(&self, source: &SourceImage) -> PreviewHandle {
        let id = Uuid::new_v4();
        let entry = PreviewEntry {
            content_type: source.content_type.clone(),
            data: Arc::from(source.data.as_slice()),
        };
        lock(&self.entries).insert(id, Arc::new(entry));
        PreviewHandle {
            id,
            url: format!("{URL_PREFIX}{id}"),
            registry: Arc::downgrade(&self.entries),
        }
    }

    /// Look up a URL; `None` once it has been revoked.
    pub fn resolve(&self, url: &str) -> Option<Arc<PreviewEntry>> {
        let id = Uuid::parse_str(url.strip_prefix(URL_PREFIX)?).ok()?;
        lock(&self.entries).get(&id).cloned()
    }

    /// Number of URLs currently alive.
    pub fn live_count(&self) -> usize {
        lock(&self.entries).len()
    }
}

/// Create a preview URL for `source` in `registry`.
pub fn encode_preview_url(registry: &PreviewRegistry, source: &SourceImage) -> PreviewHandle {
    registry.create(source)
}

/// Owner of one preview URL. Dropping it revokes the URL.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    registry: Weak<Entries>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Revoke explicitly; equivalent to dropping.
    pub fn revoke(self) {}
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(entries) = self.registry.upgrade() {
            lock(&entries).remove(&self.id);
        }
    }
}

/// Holds the preview of the current selection, at most one at a time.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    current: Option<PreviewHandle>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new preview, revoking the one it supersedes.
    pub fn replace(&mut self, handle: PreviewHandle) -> &str {
        self.current.insert(handle).url()
    }

    pub fn url(&self) -> Option<&str> {
        self.current.as_ref().map(PreviewHandle::url)
    }

    /// Revoke the current preview, if any.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
