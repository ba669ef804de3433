#![forbid(unsafe_code)]

//! `localStorage`-backed preference store.

use vitrine_core::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
use wasm_bindgen::JsValue;
use web_sys::{Storage, Window};

/// Browser storage with an in-memory fallback.
///
/// `window.localStorage` throws in some sandboxed and privacy modes; the page
/// then keeps preferences for the current load only.
#[derive(Debug)]
pub struct BrowserStorage {
    local: Option<Storage>,
    fallback: MemoryStore,
}

impl BrowserStorage {
    /// Open the window's `localStorage`, falling back to memory.
    #[must_use]
    pub fn from_window(window: &Window) -> Self {
        let local = match window.local_storage() {
            Ok(Some(storage)) => Some(storage),
            Ok(None) => {
                tracing::warn!("localStorage missing, preferences will not persist");
                None
            }
            Err(err) => {
                tracing::warn!(error = %describe(&err), "localStorage blocked, preferences will not persist");
                None
            }
        };
        Self {
            local,
            fallback: MemoryStore::new(),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn name(&self) -> &str {
        if self.local.is_some() {
            "localStorage"
        } else {
            self.fallback.name()
        }
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match &self.local {
            Some(storage) => storage.get_item(key).map_err(rejected),
            None => self.fallback.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        match &self.local {
            Some(storage) => storage.set_item(key, value).map_err(rejected),
            None => self.fallback.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match &self.local {
            Some(storage) => storage.remove_item(key).map_err(rejected),
            None => self.fallback.remove(key),
        }
    }
}

fn rejected(err: JsValue) -> StorageError {
    StorageError::Rejected(describe(&err))
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
