//! Domain models for the storefront.
//!
//! Rows map one-to-one onto the hosted tables. Ids use the typed wrappers
//! from `kiro_core` so a product id can never be passed where a cart row id
//! is expected.

pub mod cart;
pub mod catalog;
pub mod session;

pub use cart::{CartLine, CartLines, CartRow};
pub use catalog::{Category, Product, ProductDetail, Review};
pub use session::keys as session_keys;
