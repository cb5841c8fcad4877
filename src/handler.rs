//! Handler trait and type erasure.
//!
//! The router needs to hold handlers of *different* types in a single table.
//! Rust collections can only hold one concrete type, so we use trait objects
//! (`dyn ErasedHandler`) to hide the concrete handler type behind a common
//! interface and store everything uniformly.
//!
//! The chain from registration to vtable call is:
//!
//! ```text
//! move |ctx| { let c = ctrl.clone(); async move { c.sign_in(&ctx).await } }
//!        ↓ router.on(…)
//! closure.into_boxed_handler()                 ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(closure))                 ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time           ← one vtable dispatch
//! ```
//!
//! The only runtime cost per request is one Arc clone (atomic inc) + one
//! virtual call — negligible compared to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Ctx;
use crate::error::Error;
use crate::response::Outcome;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future resolving to the handler's decision.
///
/// `Pin<Box<…>>` because the runtime must poll the future in place;
/// `Send + 'static` so tokio may move it across threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Result<Outcome, Error>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Ctx) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `Fn(Ctx) -> Fut` where the future resolves
/// to `Result<Outcome, Error>` — in practice, a closure that clones a
/// controller `Arc` and awaits one of its methods. The trait is sealed: only
/// the impls in this crate can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed for F
where
    F: Fn(Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outcome, Error>> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Outcome, Error>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Ctx) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Outcome, Error>> + Send + 'static,
{
    fn call(&self, ctx: Ctx) -> BoxFuture {
        Box::pin((self.0)(ctx))
    }
}
