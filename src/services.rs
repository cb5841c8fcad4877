//! Persistence collaborators.
//!
//! The controllers only see these traits. The shipped implementations keep
//! everything in process memory behind `tokio::sync::RwLock`; a database
//! backend slots in without touching the pipeline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Error;

/// A registered user. `password` holds the one-way digest, never plaintext.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// A user as submitted on signup, before the store assigns an id.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Persists a new user and returns its id. Usernames are unique;
    /// a duplicate is [`Error::UsernameTaken`].
    async fn create(&self, user: NewUser) -> Result<u64, Error>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error>;
    async fn find_by_id(&self, id: u64) -> Result<User, Error>;
}

/// Tasks are opaque JSON objects; the store assigns ids and embeds them
/// under `"id"` so clients can address tasks in update/delete bodies.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Value>, Error>;
    async fn create(&self, task: Value) -> Result<Value, Error>;
    async fn update(&self, id: u64, task: Value) -> Result<Value, Error>;
    async fn delete(&self, id: u64) -> Result<(), Error>;
}

// ── In-memory implementations ─────────────────────────────────────────────────

pub struct MemoryUserStore {
    users: RwLock<HashMap<u64, User>>,
    next_id: AtomicU64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self { users: RwLock::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }
}

#[async_trait]
impl UserService for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<u64, Error> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(Error::UsernameTaken(user.username));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        users.insert(
            id,
            User {
                id,
                first_name: user.first_name,
                last_name: user.last_name,
                username: user.username,
                password: user.password,
            },
        );
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: u64) -> Result<User, Error> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(Error::UserMissing(id))
    }
}

/// BTreeMap keeps listing order stable across runs.
pub struct MemoryTaskStore {
    tasks: RwLock<BTreeMap<u64, Value>>,
    next_id: AtomicU64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self { tasks: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(1) }
    }
}

#[async_trait]
impl TaskService for MemoryTaskStore {
    async fn find_all(&self) -> Result<Vec<Value>, Error> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn create(&self, mut task: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Some(fields) = task.as_object_mut() {
            fields.insert("id".to_owned(), Value::from(id));
        }
        self.tasks.write().await.insert(id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: u64, mut task: Value) -> Result<Value, Error> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&id) {
            return Err(Error::TaskMissing(id));
        }
        if let Some(fields) = task.as_object_mut() {
            fields.insert("id".to_owned(), Value::from(id));
        }
        tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn delete(&self, id: u64) -> Result<(), Error> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::TaskMissing(id))
    }
}

/// Convenience aliases for the `Arc<dyn …>` the controllers hold.
pub type SharedUserService = Arc<dyn UserService>;
pub type SharedTaskService = Arc<dyn TaskService>;
