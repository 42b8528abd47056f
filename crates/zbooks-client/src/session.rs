//! Session storage.
//!
//! A [`Session`] is the access/refresh token pair issued at login. It is the
//! single source of truth for authentication state; user and organization
//! data are re-fetched projections. Storage is an injected capability so
//! embedders choose where tokens live (memory, disk, platform keychain) and
//! tests can substitute a fake and assert exact write sequences.
//!
//! Invariant: a store holds a whole session or nothing. There is no state
//! with only one of the two tokens present.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::ApiError;

/// An access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer token attached to authenticated requests.
    pub access_token: String,

    /// Long-lived token used to obtain new access tokens. Not rotated on
    /// refresh in this design.
    pub refresh_token: String,

    /// When this session was last written.
    pub saved_at: DateTime<Utc>,
}

impl Session {
    /// Create a session from a freshly issued token pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Persistence capability for the session token pair.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the current session, if any.
    async fn load(&self) -> Result<Option<Session>, ApiError>;

    /// Persist a session, replacing any existing one.
    async fn save(&self, session: &Session) -> Result<(), ApiError>;

    /// Replace only the access token of the stored session.
    ///
    /// A no-op when no session is stored: the session may have been cleared
    /// by a concurrent logout, and writing half a session would violate the
    /// both-or-neither invariant.
    async fn update_access_token(&self, access_token: &str) -> Result<(), ApiError>;

    /// Remove the stored session. Idempotent.
    async fn clear(&self) -> Result<(), ApiError>;
}

/// In-memory session store. The default for tests and short-lived embedders.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a session.
    pub fn with_session(session: Session) -> Self {
        Self { inner: Arc::new(RwLock::new(Some(session))) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), ApiError> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn update_access_token(&self, access_token: &str) -> Result<(), ApiError> {
        let mut guard = self.inner.write().await;
        if let Some(session) = guard.as_mut() {
            session.access_token = access_token.to_string();
            session.saved_at = Utc::now();
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        *self.inner.write().await = None;
        Ok(())
    }
}

/// File-backed session store: a pretty-printed JSON file in a directory.
///
/// Survives process restarts, which is what page reloads amount to for a
/// CLI or desktop embedder. An unreadable or garbled file loads as absent
/// rather than erroring; the next login overwrites it.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    const FILE_NAME: &'static str = "session.json";

    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: &Path) -> Result<Self, ApiError> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                ApiError::Storage(format!("failed to create session directory: {e}"))
            })?;
        }
        Ok(Self { path: dir.join(Self::FILE_NAME) })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, ApiError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| ApiError::Storage(format!("failed to read session file: {e}")))?;

        match serde_json::from_str::<Session>(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), ApiError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ApiError::Storage(format!("failed to serialize session: {e}")))?;

        std::fs::write(&self.path, json)
            .map_err(|e| ApiError::Storage(format!("failed to write session file: {e}")))
    }

    async fn update_access_token(&self, access_token: &str) -> Result<(), ApiError> {
        let Some(mut session) = self.load().await? else {
            return Ok(());
        };
        session.access_token = access_token.to_string();
        session.saved_at = Utc::now();
        self.save(&session).await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| ApiError::Storage(format!("failed to remove session file: {e}")))?;
        }
        Ok(())
    }
}
