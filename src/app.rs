//! Application assembly and the request pipeline.
//!
//! [`App`] owns the router and the session layer, and [`App::handle`] is the
//! whole pipeline for one request: build a [`Context`], restore the session,
//! resolve the handler (every route and the not-found fallback gated at
//! registration), convert a handler failure into a generic 500, and render
//! exactly one response. The server loop and the integration tests both
//! drive requests through this method.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use tracing::{error, info};

use crate::context::{Context, Ctx};
use crate::controllers::{AssetsController, TaskController, UserController};
use crate::gate::{self, SIGNIN_PATH, SIGNUP_PATH};
use crate::handler::ErasedHandler;
use crate::method::Method;
use crate::response::{Outcome, Payload, render};
use crate::router::Router;
use crate::session::Sessions;

pub struct App {
    router: Router,
    sessions: Sessions,
}

impl App {
    pub fn new(
        users: Arc<UserController>,
        tasks: Arc<TaskController>,
        assets: Arc<AssetsController>,
        sessions: Sessions,
    ) -> Self {
        Self { router: routes(users, tasks, assets), sessions }
    }

    /// Runs one request through the pipeline and returns the one response it
    /// gets. Infallible by construction: every failure mode has a rendering.
    pub async fn handle(
        &self,
        method: &http::Method,
        path: &str,
        cookie: Option<&str>,
        body: Bytes,
    ) -> http::Response<Full<Bytes>> {
        let Ok(method) = Method::from_str(method.as_str()) else {
            info!(method = %method, "unknown request method");
            return render(Outcome::Empty(405), None);
        };

        let ctx: Ctx = Arc::new(Context::new(method, path, cookie, body));
        self.sessions.restore(&ctx).await;
        info!(%method, path, session = ?ctx.session_id(), "request");

        let handler = match self.router.lookup(method, path) {
            Ok(handler) => handler,
            Err(e) => {
                error!(error = %e, "no route table for method");
                return render(Outcome::Empty(405), None);
            }
        };

        let outcome = match handler.call(Arc::clone(&ctx)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "request handling failed");
                Outcome::error(500, "Internal Server Error")
            }
        };

        render(outcome, ctx.take_cookie())
    }
}

/// The route table. Every handler — the 404 fallback included — goes through
/// [`gate::wrap`], so nothing executes ungated. Each registered closure
/// clones its controller `Arc` into the future, keeping the future `'static`.
fn routes(
    users: Arc<UserController>,
    tasks: Arc<TaskController>,
    assets: Arc<AssetsController>,
) -> Router {
    macro_rules! on {
        ($ctrl:ident, |$c:ident, $ctx:pat_param| $body:expr) => {{
            let $c = Arc::clone(&$ctrl);
            move |$ctx: Ctx| {
                let $c = Arc::clone(&$c);
                async move { $body }
            }
        }};
    }

    Router::new(gate::wrap(not_found))
        .on(Method::Get, "/", gate::wrap(index))
        .on(Method::Get, SIGNIN_PATH, gate::wrap(on!(users, |c, _ctx| c.sign_in_get().await)))
        .on(Method::Get, SIGNUP_PATH, gate::wrap(on!(users, |c, _ctx| c.sign_up_get().await)))
        .on(Method::Post, SIGNIN_PATH, gate::wrap(on!(users, |c, ctx| c.sign_in_post(&ctx).await)))
        .on(Method::Post, SIGNUP_PATH, gate::wrap(on!(users, |c, ctx| c.sign_up_post(&ctx).await)))
        .on(Method::Delete, "/users/signout", gate::wrap(on!(users, |c, ctx| c.sign_out(&ctx).await)))
        .on(Method::Get, "/users/me", gate::wrap(on!(users, |c, ctx| c.find_me(&ctx).await)))
        .on(Method::Get, "/tasks", gate::wrap(on!(tasks, |c, _ctx| c.find_all().await)))
        .on(Method::Post, "/tasks", gate::wrap(on!(tasks, |c, ctx| c.create(&ctx).await)))
        .on(Method::Put, "/tasks", gate::wrap(on!(tasks, |c, ctx| c.update(&ctx).await)))
        .on(Method::Delete, "/tasks", gate::wrap(on!(tasks, |c, ctx| c.delete(&ctx).await)))
        .on(Method::Get, "/frontend/css", gate::wrap(on!(assets, |c, _ctx| c.get_css().await)))
        .on(Method::Get, "/frontend/js", gate::wrap(on!(assets, |c, _ctx| c.get_js().await)))
}

async fn index(_ctx: Ctx) -> Result<Outcome, crate::error::Error> {
    Ok(Outcome::Success(Payload::Html("<h1>Main page</h1>".to_owned())))
}

async fn not_found(_ctx: Ctx) -> Result<Outcome, crate::error::Error> {
    Ok(Outcome::error(404, "Not Found"))
}
