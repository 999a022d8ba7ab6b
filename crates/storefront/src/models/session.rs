//! Session-related types.
//!
//! Keys for values stored in the visitor's session.

/// Session keys.
pub mod keys {
    /// Key for the anonymous visitor id scoping remote cart rows.
    pub const SESSION_ID: &str = "session_id";
}
