//! JSON API routes.

pub mod cart;
pub mod catalog;
