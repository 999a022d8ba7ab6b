//! Business logic services.
//!
//! Services sit between route handlers and repositories and own any state
//! that outlives a single request, such as caches.

pub mod cart;

pub use cart::{AddToCartOutcome, CartError, CartGateway};
