//! # taskboard
//!
//! A small session-backed application server: user signup/signin, a task
//! CRUD API, and static asset serving for the companion front end.
//!
//! ## The pipeline
//!
//! Every request takes the same path, and that path is the whole design:
//!
//! ```text
//! accept → Context → session restore → route lookup → gate → handler
//!        → Outcome → render (one terminating write)
//! ```
//!
//! - The [`Router`] matches exact paths first, then wildcard patterns with
//!   the same segment count — never a "closest-looking" route.
//! - [`gate::wrap`] decorates **every** handler, the 404 fallback included,
//!   and enforces the authentication rules before any of them run.
//! - Handlers return a typed [`Outcome`](response::Outcome); only the server
//!   loop writes to the wire, exactly once per request.
//!
//! Persistence, password digests, logging, and file reads are collaborators
//! behind traits — the shipped implementations are in-memory and
//! filesystem-backed.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard::{
//!     App, Assets, AssetsController, Config, MemorySessionStore, MemoryTaskStore,
//!     MemoryUserStore, Server, Sessions, TaskController, UserController,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env();
//!     let sessions = Sessions::new(Arc::new(MemorySessionStore::new()));
//!     let assets = Arc::new(Assets::new(&config.assets_dir));
//!
//!     let app = App::new(
//!         Arc::new(UserController::new(
//!             Arc::new(MemoryUserStore::new()),
//!             sessions.clone(),
//!             Arc::clone(&assets),
//!         )),
//!         Arc::new(TaskController::new(Arc::new(MemoryTaskStore::new()))),
//!         Arc::new(AssetsController::new(assets)),
//!         sessions,
//!     );
//!
//!     Server::bind(&config.addr).serve(app).await.unwrap();
//! }
//! ```

mod app;
mod config;
mod context;
mod controllers;
mod error;
mod handler;
mod method;
mod response;
mod router;
mod server;
mod services;
mod session;

pub mod gate;

pub use app::App;
pub use config::Config;
pub use context::{Context, CookieChange, Ctx, SESSION_COOKIE};
pub use controllers::{Assets, AssetsController, TaskController, UserController};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use response::{Outcome, Payload, render};
pub use router::Router;
pub use server::Server;
pub use services::{
    MemoryTaskStore, MemoryUserStore, NewUser, TaskService, User, UserService,
};
pub use session::{MemorySessionStore, SessionData, SessionStore, Sessions};
