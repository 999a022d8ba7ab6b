//! Session middleware configuration.
//!
//! Every visitor gets a cookie-backed session. The session holds two things:
//! the anonymous [`SessionId`] that scopes remote cart rows, and the legacy
//! cart page's saved cart under [`kiro_core::CART_SLOT_KEY`].
//!
//! The session store shares the database with the remote cart, so it goes
//! down at the same moment. [`FailSoftStore`] keeps that from failing the
//! request: the visitor carries on with a fresh, unsaved session.

use async_trait::async_trait;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tracing::warn;

use kiro_core::{CartSlot, SessionId, SlotError};

use crate::config::StorefrontConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "kiro_session";

/// Session expiry time in seconds (1 year of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// A session store whose failures are logged instead of returned.
///
/// A failed load reads as "no such session" and a failed save or delete is
/// dropped.
#[derive(Debug, Clone)]
pub struct FailSoftStore<S> {
    inner: S,
}

impl<S> FailSoftStore<S> {
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SessionStore> SessionStore for FailSoftStore<S> {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        if let Err(e) = self.inner.create(record).await {
            warn!(error = %e, "Could not create session");
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        if let Err(e) = self.inner.save(record).await {
            warn!(error = %e, "Could not save session");
        }
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self.inner.load(session_id).await {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(error = %e, "Could not load session, starting a new one");
                Ok(None)
            }
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        if let Err(e) = self.inner.delete(session_id).await {
            warn!(error = %e, "Could not delete session");
        }
        Ok(())
    }
}

/// Create the session layer over any session store.
///
/// The server uses `tower_sessions_sqlx_store::PostgresStore`; tests use
/// `tower_sessions::MemoryStore`. Either is wrapped in [`FailSoftStore`].
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<FailSoftStore<S>> {
    SessionManagerLayer::new(FailSoftStore::new(store))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The visitor's anonymous id, created and stored on first use.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn visitor_session_id(
    session: &Session,
) -> Result<SessionId, tower_sessions::session::Error> {
    if let Some(id) = session.get::<SessionId>(session_keys::SESSION_ID).await? {
        return Ok(id);
    }

    let id = SessionId::generate();
    session.insert(session_keys::SESSION_ID, id).await?;
    Ok(id)
}

/// A [`CartSlot`] stored in the visitor's session.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    session: Session,
}

impl SessionSlot {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartSlot for SessionSlot {
    async fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        self.session
            .get::<String>(key)
            .await
            .map_err(|e| SlotError::Backend(e.to_string()))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), SlotError> {
        self.session
            .insert(key, value)
            .await
            .map_err(|e| SlotError::Backend(e.to_string()))
    }
}
