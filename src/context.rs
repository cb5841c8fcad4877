//! Per-request client context.
//!
//! One [`Context`] is built per incoming request and shared (via `Arc`) with
//! the gate and the handler. It carries the parsed request side — method,
//! path, cookies, body bytes — plus two mutable cells the session layer
//! writes into: the resolved session identifier and the pending `Set-Cookie`
//! change. The server loop drains the cookie cell exactly once when it
//! renders the response.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::method::Method;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sid";

/// How a request shared across the gate and its handler.
pub type Ctx = Arc<Context>;

/// A pending change to the session cookie, emitted with the response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CookieChange {
    /// Send the identifier to the client (signup / signin).
    Set(String),
    /// Expire the cookie on the client (signout).
    Clear,
}

/// One request's worth of state.
pub struct Context {
    method: Method,
    path: String,
    cookies: HashMap<String, String>,
    body: Bytes,
    state: Mutex<SessionCell>,
}

#[derive(Default)]
struct SessionCell {
    session_id: Option<String>,
    cookie: Option<CookieChange>,
}

impl Context {
    pub fn new(method: Method, path: &str, cookie_header: Option<&str>, body: Bytes) -> Self {
        Self {
            method,
            path: path.to_owned(),
            cookies: parse_cookies(cookie_header),
            body,
            state: Mutex::new(SessionCell::default()),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a cookie sent by the client, by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The restored session identifier, if any. `None` means anonymous.
    pub fn session_id(&self) -> Option<String> {
        self.cell().session_id.clone()
    }

    pub(crate) fn attach_session(&self, id: String) {
        self.cell().session_id = Some(id);
    }

    pub(crate) fn detach_session(&self) {
        self.cell().session_id = None;
    }

    /// Queues a session-cookie change for the response. At most one change
    /// survives per request; a later call replaces an earlier one.
    pub(crate) fn queue_cookie(&self, change: CookieChange) {
        self.cell().cookie = Some(change);
    }

    /// Takes the queued cookie change, leaving the cell empty. Called once
    /// by the renderer.
    pub fn take_cookie(&self) -> Option<CookieChange> {
        self.cell().cookie.take()
    }

    // The lock guards two Options and is never held across an await; a
    // poisoned lock means a panic already escaped a handler.
    fn cell(&self) -> MutexGuard<'_, SessionCell> {
        self.state.lock().expect("session cell lock poisoned")
    }
}

fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let Some(header) = header else {
        return HashMap::new();
    };
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}
