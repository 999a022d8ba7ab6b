//! Saving and loading a cart to a durable key-value slot.
//!
//! The in-memory [`Cart`] is always authoritative. Persisting it is best
//! effort: write failures are logged and reported as [`SaveOutcome::Failed`],
//! and a missing, unreadable or corrupt stored value loads as an empty cart.
//! Nothing here returns an error to the caller.
//!
//! Storage backends implement [`CartSlot`]. [`MemorySlot`] is provided here;
//! the storefront crate backs the slot with the visitor's session.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::cart::Cart;

/// Fixed key the cart is stored under.
pub const CART_SLOT_KEY: &str = "kiro-cart";

/// Errors a slot backend can report.
#[derive(Debug, Error)]
pub enum SlotError {
    /// The backend refused the value because it is full.
    #[error("storage quota exceeded ({needed} bytes needed, {available} available)")]
    QuotaExceeded { needed: usize, available: usize },

    /// The backend failed for another reason.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A durable location holding string values by key.
pub trait CartSlot: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, SlotError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), SlotError>> + Send;
}

/// Result of [`CartPersistence::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The cart could not be written; the in-memory cart is unaffected.
    Failed,
}

/// The only reader and writer of the cart slot.
#[derive(Debug)]
pub struct CartPersistence<S> {
    slot: S,
}

impl<S: CartSlot> CartPersistence<S> {
    /// Wrap a slot.
    #[must_use]
    pub const fn new(slot: S) -> Self {
        Self { slot }
    }

    /// The wrapped slot.
    #[must_use]
    pub const fn slot(&self) -> &S {
        &self.slot
    }

    /// Serialize the cart into the slot.
    pub async fn save(&self, cart: &Cart) -> SaveOutcome {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize cart");
                return SaveOutcome::Failed;
            }
        };

        match self.slot.write(CART_SLOT_KEY, json).await {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                warn!(error = %e, "Could not save cart");
                SaveOutcome::Failed
            }
        }
    }

    /// Load the cart from the slot, or an empty cart if there is none.
    ///
    /// A read failure or a stored value that does not parse as a valid cart
    /// is logged and treated as no cart at all.
    pub async fn load(&self) -> Cart {
        let raw = match self.slot.read(CART_SLOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(error = %e, "Could not read saved cart");
                return Cart::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Saved cart is corrupted, starting with an empty cart");
            Cart::new()
        })
    }
}

/// An in-process slot, optionally limited to a byte quota.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySlot {
    /// An unbounded slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that rejects writes larger than `quota` bytes in total.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: Mutex::default(),
            quota: Some(quota),
        }
    }

    /// Store a raw value, bypassing [`CartPersistence`].
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Backend` if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), SlotError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Read a raw value, bypassing [`CartPersistence`].
    ///
    /// # Errors
    ///
    /// Returns `SlotError::Backend` if the lock is poisoned.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SlotError> {
        self.values
            .lock()
            .map_err(|_| SlotError::Backend("memory slot lock poisoned".to_owned()))
    }
}

impl CartSlot for MemorySlot {
    async fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.get_raw(key)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), SlotError> {
        let mut values = self.lock()?;

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(others);
            if needed > available {
                return Err(SlotError::QuotaExceeded { needed, available });
            }
        }

        values.insert(key.to_owned(), value);
        Ok(())
    }
}
