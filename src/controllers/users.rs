//! Signup, signin, signout, and the current-user lookup.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::Error;
use crate::gate::{ROOT_PATH, SIGNIN_PATH};
use crate::response::{Outcome, Payload};
use crate::services::{NewUser, SharedUserService};
use crate::session::{SessionData, Sessions};

use super::Assets;

/// One-way password digest, hex-encoded sha-256.
fn digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpForm {
    first_name: String,
    last_name: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct SignInForm {
    username: String,
    password: String,
}

pub struct UserController {
    users: SharedUserService,
    sessions: Sessions,
    assets: Arc<Assets>,
}

impl UserController {
    pub fn new(users: SharedUserService, sessions: Sessions, assets: Arc<Assets>) -> Self {
        Self { users, sessions, assets }
    }

    pub async fn sign_up_get(&self) -> Result<Outcome, Error> {
        Ok(Outcome::Success(Payload::Html(self.assets.signup_page().await?)))
    }

    pub async fn sign_in_get(&self) -> Result<Outcome, Error> {
        Ok(Outcome::Success(Payload::Html(self.assets.signin_page().await?)))
    }

    pub async fn sign_up_post(&self, ctx: &Context) -> Result<Outcome, Error> {
        let form: SignUpForm = match parse_body(ctx) {
            Ok(form) => form,
            Err(outcome) => return Ok(outcome),
        };

        let user = NewUser {
            first_name: form.first_name,
            last_name: form.last_name,
            username: form.username,
            password: digest(&form.password),
        };
        let user_id = match self.users.create(user).await {
            Ok(id) => id,
            Err(Error::UsernameTaken(name)) => {
                debug!(username = %name, "signup with a taken username");
                return Ok(Outcome::error(400, "Username already taken"));
            }
            Err(e) => return Err(e),
        };

        self.sessions.start(ctx, SessionData::for_user(user_id)).await;
        info!(user_id, "signup: session started");
        Ok(Outcome::redirect(ROOT_PATH))
    }

    pub async fn sign_in_post(&self, ctx: &Context) -> Result<Outcome, Error> {
        let form: SignInForm = match parse_body(ctx) {
            Ok(form) => form,
            Err(outcome) => return Ok(outcome),
        };

        let Some(user) = self.users.find_by_username(&form.username).await? else {
            return Ok(Outcome::error(400, "User not found"));
        };
        if user.password != digest(&form.password) {
            return Ok(Outcome::error(400, "Incorrect password"));
        }

        self.sessions.start(ctx, SessionData::for_user(user.id)).await;
        info!(user_id = user.id, "signin: session started");
        Ok(Outcome::redirect(ROOT_PATH))
    }

    pub async fn sign_out(&self, ctx: &Context) -> Result<Outcome, Error> {
        self.sessions.delete(ctx).await;
        info!("signout: session deleted");
        Ok(Outcome::redirect(SIGNIN_PATH))
    }

    /// Profile of the user behind the current session.
    pub async fn find_me(&self, ctx: &Context) -> Result<Outcome, Error> {
        let session = self.sessions.get(ctx).await?;
        let user = self.users.find_by_id(session.user_id).await?;
        debug!(username = %user.username, "current-user lookup");
        Ok(Outcome::Success(Payload::Json(json!({
            "username": user.username,
            "firstName": user.first_name,
            "lastName": user.last_name,
        }))))
    }
}

/// Shared body handling for the POST endpoints: an empty body and a
/// malformed one both end the request with a 400 envelope.
fn parse_body<T: serde::de::DeserializeOwned>(ctx: &Context) -> Result<T, Outcome> {
    if ctx.body().is_empty() {
        debug!("request body is empty");
        return Err(Outcome::error(400, "Got no JSON data from the request"));
    }
    serde_json::from_slice(ctx.body()).map_err(|e| {
        debug!(error = %e, "request body is not the expected JSON");
        Outcome::error(400, "Malformed JSON body")
    })
}
