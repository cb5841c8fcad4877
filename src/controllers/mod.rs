//! Business-logic handlers invoked by the router.
//!
//! Each controller is constructed with explicit references to its service
//! collaborators and returns an [`Outcome`](crate::response::Outcome); no
//! controller ever writes to the wire itself.

mod assets;
mod tasks;
mod users;

pub use assets::{Assets, AssetsController};
pub use tasks::TaskController;
pub use users::UserController;
