//! Kiro storefront library.
//!
//! This crate provides the storefront server as a library, allowing it to be
//! tested and reused. The binary in `main.rs` only wires configuration,
//! tracing, Sentry and the database pool around [`app::build_router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
