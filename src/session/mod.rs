//! Session layer
//!
//! A signed-in user's backend tokens are kept server side. The browser only
//! holds an opaque session id in an HttpOnly cookie.
//!
//! # Usage
//!
//! ```rust,ignore
//! use funews::session::{MemorySessionStore, Session, SessionStore};
//!
//! let store = MemorySessionStore::new(Duration::from_secs(86400));
//! let session = Session::from_auth(auth_response);
//! store.put(session.clone()).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AccountRole, AuthResponse, SystemAccount};

pub use memory::MemorySessionStore;

/// Flash severity, mapped to a banner style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Signed-in user session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque id stored in the cookie
    pub id: String,
    /// Backend bearer token
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted; `None` if unknown
    pub expires_at: Option<DateTime<Utc>>,
    pub account: SystemAccount,
    pub flash: Option<Flash>,
}

impl Session {
    /// Start a session from a successful login
    pub fn from_auth(auth: AuthResponse) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_at: auth.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            account: auth.account,
            flash: None,
        }
    }

    /// Swap in refreshed tokens, keeping the old refresh token if none came back
    pub fn apply_refresh(&mut self, auth: AuthResponse) {
        self.access_token = auth.access_token;
        if auth.refresh_token.is_some() {
            self.refresh_token = auth.refresh_token;
        }
        self.expires_at = auth.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        self.account = auth.account;
    }

    pub fn role(&self) -> AccountRole {
        self.account.account_role
    }

    /// Whether the access token expires within `margin`
    pub fn needs_refresh(&self, margin: Duration) -> bool {
        self.needs_refresh_at(Utc::now(), margin)
    }

    pub fn needs_refresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - margin <= now,
            None => false,
        }
    }
}

/// Session storage
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Insert or replace a session
    async fn put(&self, session: Session) -> Result<()>;

    async fn remove(&self, id: &str) -> Result<()>;

    /// Attach a flash to an existing session; ignored when the session is gone
    async fn set_flash(&self, id: &str, flash: Flash) -> Result<()> {
        if let Some(mut session) = self.get(id).await? {
            session.flash = Some(flash);
            self.put(session).await?;
        }
        Ok(())
    }

    /// Remove and return the pending flash
    async fn take_flash(&self, id: &str) -> Result<Option<Flash>> {
        match self.get(id).await? {
            Some(mut session) => {
                let flash = session.flash.take();
                if flash.is_some() {
                    self.put(session).await?;
                }
                Ok(flash)
            }
            None => Ok(None),
        }
    }
}
