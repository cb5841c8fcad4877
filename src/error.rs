//! Unified error type.

use std::fmt;

use crate::method::Method;

/// The error type returned by taskboard's fallible operations.
///
/// Domain outcomes (bad credentials, empty body, missing task) are expressed
/// as [`Outcome::Error`](crate::response::Outcome) values, not as `Error`s.
/// This type surfaces infrastructure failures: binding a port, reading an
/// asset file, or a collaborator misbehaving mid-request. Anything that
/// reaches the server loop as `Err` becomes a logged, generic 500.
#[derive(Debug)]
pub enum Error {
    /// Socket or filesystem failure.
    Io(std::io::Error),
    /// A body that claimed to be JSON and was not.
    Json(serde_json::Error),
    /// The request method has no route table at all.
    UnroutedMethod(Method),
    /// The context carries no session, or its identifier no longer resolves
    /// (deleted concurrently).
    SessionExpired,
    /// `find_by_id` on an id the user store does not know.
    UserMissing(u64),
    /// Update or delete on a task id the task store does not know.
    TaskMissing(u64),
    /// Signup with a username that already exists.
    UsernameTaken(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::UnroutedMethod(m) => write!(f, "no routes registered for {m}"),
            Self::SessionExpired => f.write_str("session expired or never started"),
            Self::UserMissing(id) => write!(f, "no user with id {id}"),
            Self::TaskMissing(id) => write!(f, "no task with id {id}"),
            Self::UsernameTaken(name) => write!(f, "username `{name}` already taken"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
