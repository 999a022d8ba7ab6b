//! Kiro Core - Cart state and shared types.
//!
//! This crate provides the pieces shared by every Kiro component:
//! - `storefront` - The HTTP server (legacy cart page, catalog and cart API)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains types, pure state transitions and traits - no
//! network access, no database access. Storage backends implement the
//! [`persist::CartSlot`] trait in the crates that own the I/O.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`cart`] - The cart store: items, derived totals, mutations
//! - [`persist`] - Saving and loading a cart to a key-value slot
//! - [`feedback`] - User-facing notifications and soft-read results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod feedback;
pub mod persist;
pub mod types;

pub use cart::{Cart, CartChange, CartItem, CartSummary};
pub use feedback::{Notification, NotificationVariant, SoftRead};
pub use persist::{CART_SLOT_KEY, CartPersistence, CartSlot, MemorySlot, SaveOutcome, SlotError};
pub use types::*;
