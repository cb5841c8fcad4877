//! Authentication gate.
//!
//! [`wrap`] decorates any handler: the returned handler checks the request's
//! authentication state against the path before the inner handler runs, and
//! short-circuits with its own [`Outcome`] when the combination is not
//! allowed. Every route — including the not-found fallback — is wrapped at
//! registration, so no handler executes ungated.
//!
//! The rules:
//!
//! - A client *with* a session asking for the signin or signup page is sent
//!   back to `/`; submitting those forms again is a 400.
//! - A client *without* a session may only reach signin, signup, and the
//!   static frontend assets. Anything else: GET is redirected to signin,
//!   mutating methods are denied with a 403.

use std::sync::Arc;

use tracing::info;

use crate::context::Ctx;
use crate::handler::{ErasedHandler, Handler};
use crate::method::Method;
use crate::response::Outcome;

pub const ROOT_PATH: &str = "/";
pub const SIGNIN_PATH: &str = "/users/signin";
pub const SIGNUP_PATH: &str = "/users/signup";
pub const ASSETS_PREFIX: &str = "/frontend/";

/// Decorates `inner` with the access check.
pub fn wrap(inner: impl Handler) -> impl Handler {
    let inner = inner.into_boxed_handler();
    move |ctx: Ctx| {
        let inner = Arc::clone(&inner);
        async move {
            if let Some(outcome) = screen(&ctx) {
                return Ok(outcome);
            }
            inner.call(ctx).await
        }
    }
}

/// The access decision, separated from the delegation so it is trivially
/// testable: `None` means "let the inner handler run".
fn screen(ctx: &Ctx) -> Option<Outcome> {
    let session = ctx.session_id();
    let method = ctx.method();
    let path = ctx.path();
    info!(session = ?session, %method, path, "gate");

    let auth_page = path == SIGNIN_PATH || path == SIGNUP_PATH;

    if session.is_some() && auth_page {
        info!("client already holds a session");
        return Some(match method {
            Method::Get => Outcome::redirect(ROOT_PATH),
            _ => Outcome::error(400, "already authorized"),
        });
    }

    if session.is_none() && !auth_page && !path.starts_with(ASSETS_PREFIX) {
        info!("anonymous client on a protected path");
        return Some(match method {
            Method::Get => Outcome::redirect(SIGNIN_PATH),
            _ => Outcome::Empty(403),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::context::Context;
    use crate::handler::BoxedHandler;
    use crate::response::Payload;

    fn ctx(method: Method, path: &str) -> Ctx {
        Ctx::new(Context::new(method, path, None, Bytes::new()))
    }

    fn authed(method: Method, path: &str) -> Ctx {
        let ctx = ctx(method, path);
        ctx.attach_session("live-session".into());
        ctx
    }

    fn gated_passthrough() -> BoxedHandler {
        wrap(|_ctx: Ctx| async move { Ok::<_, crate::error::Error>(Outcome::Success(Payload::Text("inner".into()))) })
            .into_boxed_handler()
    }

    async fn run(ctx: Ctx) -> Outcome {
        gated_passthrough()
            .call(ctx)
            .await
            .expect("inner handler is infallible")
    }

    #[tokio::test]
    async fn session_holder_is_redirected_off_the_signin_page() {
        let outcome = run(authed(Method::Get, SIGNIN_PATH)).await;
        assert!(matches!(outcome, Outcome::Redirect(loc) if loc == ROOT_PATH));

        let outcome = run(authed(Method::Get, SIGNUP_PATH)).await;
        assert!(matches!(outcome, Outcome::Redirect(loc) if loc == ROOT_PATH));
    }

    #[tokio::test]
    async fn session_holder_resubmitting_credentials_gets_400() {
        let outcome = run(authed(Method::Post, SIGNIN_PATH)).await;
        match outcome {
            Outcome::Error { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "already authorized");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn anonymous_get_is_redirected_to_signin() {
        let outcome = run(ctx(Method::Get, "/tasks")).await;
        assert!(matches!(outcome, Outcome::Redirect(loc) if loc == SIGNIN_PATH));
    }

    #[tokio::test]
    async fn anonymous_mutations_are_denied() {
        for method in [Method::Post, Method::Put, Method::Delete] {
            let outcome = run(ctx(method, "/tasks")).await;
            assert!(matches!(outcome, Outcome::Empty(403)), "{method} should be denied");
        }
    }

    #[tokio::test]
    async fn anonymous_client_still_reaches_auth_pages_and_assets() {
        for path in [SIGNIN_PATH, SIGNUP_PATH, "/frontend/css", "/frontend/js"] {
            let outcome = run(ctx(Method::Get, path)).await;
            assert!(
                matches!(&outcome, Outcome::Success(Payload::Text(t)) if t == "inner"),
                "{path} should delegate, got {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn session_holder_reaches_protected_paths() {
        let outcome = run(authed(Method::Get, "/tasks")).await;
        assert!(matches!(&outcome, Outcome::Success(Payload::Text(t)) if t == "inner"));
    }
}
