//! Durable storage for the bearer credential.
//!
//! The browser store keeps a single `localStorage` key; every tab sharing the
//! origin sees the same value and there is no cross-tab locking. Storage API
//! failures are logged and swallowed so reads and writes never fail.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::RefCell;
use std::rc::Rc;

use super::auth::Credential;

/// Holds at most one credential.
pub trait TokenStore {
    fn read(&self) -> Option<Credential>;
    fn write(&self, credential: &Credential);
    fn clear(&self);
}

/// Process-local store used for tests and server rendering.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    value: RefCell<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn with_credential(credential: Credential) -> Self {
        Self { value: RefCell::new(Some(credential)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<Credential> {
        self.value.borrow().clone()
    }

    fn write(&self, credential: &Credential) {
        *self.value.borrow_mut() = Some(credential.clone());
    }

    fn clear(&self) {
        self.value.borrow_mut().take();
    }
}

/// `localStorage`-backed store for the browser build.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone)]
pub struct LocalStorageTokenStore {
    key: String,
}

#[cfg(feature = "hydrate")]
impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl TokenStore for LocalStorageTokenStore {
    fn read(&self) -> Option<Credential> {
        let raw = Self::storage()?.get_item(&self.key).ok().flatten()?;
        // An empty string is what a cleared form field or a manual reset leaves behind.
        (!raw.is_empty()).then(|| Credential::new(raw))
    }

    fn write(&self, credential: &Credential) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; credential kept in memory only");
            return;
        };
        if storage.set_item(&self.key, credential.as_str()).is_err() {
            log::warn!("failed to persist credential under '{}'", self.key);
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            if storage.remove_item(&self.key).is_err() {
                log::warn!("failed to remove credential under '{}'", self.key);
            }
        }
    }
}

/// Store appropriate for the current build: `localStorage` in the browser,
/// memory elsewhere.
pub fn default_token_store(key: &str) -> Rc<dyn TokenStore> {
    #[cfg(feature = "hydrate")]
    {
        Rc::new(LocalStorageTokenStore::new(key))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
        Rc::new(MemoryTokenStore::default())
    }
}
