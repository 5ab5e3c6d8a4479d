use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{Tier, WatchItem};

/// Watchlist hard cap; oldest entries fall off the tail.
pub const WATCHLIST_CAP: usize = 200;

/// Tier + watchlist persistence, injected into the engine rather than read
/// from ambient global state. Implementations must be safe to call in
/// environments with no storage at all: reads fall back to defaults, writes
/// may be lost but never fail the caller.
pub trait TapeStore: Send + Sync {
    fn tier(&self) -> Tier;
    fn set_tier(&self, tier: Tier);

    /// Newest-first snapshot of the watchlist.
    fn watchlist(&self) -> Vec<WatchItem>;

    /// Insert at the head unless the condition id is already present.
    /// Returns whether the list changed.
    fn add_to_watchlist(&self, item: WatchItem) -> bool;

    fn remove_from_watchlist(&self, condition_id: &str);

    fn is_watched(&self, condition_id: &str) -> bool {
        self.watchlist().iter().any(|i| i.condition_id == condition_id)
    }
}

/// Build a watch item stamped now.
pub fn watch_item(condition_id: &str, slug: &str, question: &str) -> WatchItem {
    WatchItem {
        condition_id: condition_id.to_string(),
        slug: slug.to_string(),
        question: question.to_string(),
        added_at: Utc::now(),
    }
}

fn insert_deduped(list: &mut Vec<WatchItem>, item: WatchItem) -> bool {
    if list.iter().any(|i| i.condition_id == item.condition_id) {
        return false;
    }
    list.insert(0, item);
    list.truncate(WATCHLIST_CAP);
    true
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store; the default for tests and for running without disk.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreDoc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(tier: Tier) -> Self {
        let store = Self::default();
        store.set_tier(tier);
        store
    }
}

impl TapeStore for MemoryStore {
    fn tier(&self) -> Tier {
        self.inner.lock().expect("store poisoned").tier
    }

    fn set_tier(&self, tier: Tier) {
        self.inner.lock().expect("store poisoned").tier = tier;
    }

    fn watchlist(&self) -> Vec<WatchItem> {
        self.inner.lock().expect("store poisoned").watchlist.clone()
    }

    fn add_to_watchlist(&self, item: WatchItem) -> bool {
        insert_deduped(&mut self.inner.lock().expect("store poisoned").watchlist, item)
    }

    fn remove_from_watchlist(&self, condition_id: &str) {
        self.inner
            .lock()
            .expect("store poisoned")
            .watchlist
            .retain(|i| i.condition_id != condition_id);
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDoc {
    #[serde(default)]
    tier: Tier,
    #[serde(default)]
    watchlist: Vec<WatchItem>,
}

/// File-backed store: one JSON document holding the tier and watchlist.
/// A missing or corrupt file reads as defaults; write failures are logged
/// and swallowed so the engine keeps running.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<StoreDoc>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            inner: Mutex::new(doc),
        }
    }

    fn persist(&self, doc: &StoreDoc) {
        match serde_json::to_string_pretty(doc) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist store");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize store"),
        }
    }
}

impl TapeStore for JsonFileStore {
    fn tier(&self) -> Tier {
        self.inner.lock().expect("store poisoned").tier
    }

    fn set_tier(&self, tier: Tier) {
        let mut doc = self.inner.lock().expect("store poisoned");
        doc.tier = tier;
        self.persist(&doc);
    }

    fn watchlist(&self) -> Vec<WatchItem> {
        self.inner.lock().expect("store poisoned").watchlist.clone()
    }

    fn add_to_watchlist(&self, item: WatchItem) -> bool {
        let mut doc = self.inner.lock().expect("store poisoned");
        let changed = insert_deduped(&mut doc.watchlist, item);
        if changed {
            self.persist(&doc);
        }
        changed
    }

    fn remove_from_watchlist(&self, condition_id: &str) {
        let mut doc = self.inner.lock().expect("store poisoned");
        let before = doc.watchlist.len();
        doc.watchlist.retain(|i| i.condition_id != condition_id);
        if doc.watchlist.len() != before {
            self.persist(&doc);
        }
    }
}
