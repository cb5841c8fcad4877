//! Session lifecycle and the session store.
//!
//! A session is an opaque identifier the client carries in a cookie, mapped
//! server-side to a small attribute bag. [`Sessions`] owns the lifecycle —
//! restore, start, get, delete — against any [`SessionStore`]. Starting or
//! deleting a session also queues the matching cookie change on the context,
//! so controllers cannot forget (or double-send) it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::context::{Context, CookieChange, SESSION_COOKIE};
use crate::error::Error;

/// The attribute bag held per session identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionData {
    pub user_id: u64,
    pub started_at: SystemTime,
}

impl SessionData {
    pub fn for_user(user_id: u64) -> Self {
        Self { user_id, started_at: SystemTime::now() }
    }
}

/// Backing storage for sessions. The core only needs save / load / remove;
/// anything from a hash map to Redis fits behind this.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, id: &str, data: SessionData);
    async fn load(&self, id: &str) -> Option<SessionData>;
    async fn remove(&self, id: &str);
}

/// In-memory store. Good for a single process; swap behind the trait for
/// anything shared.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, id: &str, data: SessionData) {
        self.sessions.write().await.insert(id.to_owned(), data);
    }

    async fn load(&self, id: &str) -> Option<SessionData> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

/// Session operations over a shared store.
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
}

impl Sessions {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Reads the session cookie, validates the identifier against the store,
    /// and attaches it to the context. Absence is not an error — it denotes
    /// an anonymous client. A cookie whose identifier the store no longer
    /// knows is ignored the same way.
    pub async fn restore(&self, ctx: &Context) {
        let Some(id) = ctx.cookie(SESSION_COOKIE) else {
            return;
        };
        if self.store.load(id).await.is_some() {
            ctx.attach_session(id.to_owned());
        } else {
            debug!(session = %id, "cookie carries an unknown session identifier");
        }
    }

    /// Mints a fresh identifier, stores the attributes, attaches the session
    /// to the context, and queues the cookie for the response.
    pub async fn start(&self, ctx: &Context, data: SessionData) {
        let id = Uuid::new_v4().to_string();
        self.store.save(&id, data).await;
        ctx.attach_session(id.clone());
        ctx.queue_cookie(CookieChange::Set(id));
    }

    /// Current attributes, or [`Error::SessionExpired`] if the context is
    /// anonymous or the identifier was deleted concurrently.
    pub async fn get(&self, ctx: &Context) -> Result<SessionData, Error> {
        let id = ctx.session_id().ok_or(Error::SessionExpired)?;
        self.store.load(&id).await.ok_or(Error::SessionExpired)
    }

    /// Removes the session and queues a clearing cookie. Deleting an
    /// anonymous context only clears the cookie.
    pub async fn delete(&self, ctx: &Context) {
        if let Some(id) = ctx.session_id() {
            self.store.remove(&id).await;
        }
        ctx.detach_session();
        ctx.queue_cookie(CookieChange::Clear);
    }
}
