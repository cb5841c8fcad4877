//! Handler outcomes and the renderer.
//!
//! Handlers never touch the wire. They return an [`Outcome`] — an explicit,
//! tagged description of the one terminating write this request gets — and
//! [`render`] turns it into the HTTP response. There is no fallback path: a
//! handler that wants "no body" says so with [`Outcome::Empty`].

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;
use tracing::error;

use crate::context::{CookieChange, SESSION_COOKIE};

/// A successful response body, tagged with how to serialize it.
#[derive(Debug)]
pub enum Payload {
    /// `text/plain; charset=utf-8`.
    Text(String),
    /// `text/html; charset=utf-8`.
    Html(String),
    /// `application/json`, serialized from a [`serde_json::Value`].
    Json(serde_json::Value),
    /// Raw bytes sent verbatim with the given content type (assets).
    Bytes {
        content_type: &'static str,
        data: Vec<u8>,
    },
}

/// Everything a handler (or the gate) can decide about a request.
///
/// The server loop performs exactly one terminating write per request, driven
/// by this type.
#[derive(Debug)]
pub enum Outcome {
    /// `200 OK` with a typed body.
    Success(Payload),
    /// `302 Found` to the given location, no body.
    Redirect(String),
    /// A structured error envelope: HTTP status = `code`, body
    /// `{"error":{"code":…,"message":…}}`.
    Error { code: u16, message: String },
    /// A bare status with no body (e.g. 403 from the gate, 204 from delete).
    Empty(u16),
}

impl Outcome {
    /// Shorthand for the error envelope.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error { code, message: message.into() }
    }

    /// Shorthand for a redirect.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }
}

/// Converts an [`Outcome`] plus the request's pending cookie change into the
/// wire response.
pub fn render(outcome: Outcome, cookie: Option<CookieChange>) -> Response<Full<Bytes>> {
    let (status, content_type, body, location) = match outcome {
        Outcome::Success(payload) => {
            let (content_type, body) = match payload {
                Payload::Text(s) => ("text/plain; charset=utf-8", s.into_bytes()),
                Payload::Html(s) => ("text/html; charset=utf-8", s.into_bytes()),
                // Display on Value cannot fail, unlike to_vec on arbitrary types.
                Payload::Json(v) => ("application/json", v.to_string().into_bytes()),
                Payload::Bytes { content_type, data } => (content_type, data),
            };
            (StatusCode::OK, Some(content_type), body, None)
        }
        Outcome::Redirect(loc) => (StatusCode::FOUND, None, Vec::new(), Some(loc)),
        Outcome::Error { code, message } => {
            let body = serde_json::json!({"error": {"code": code, "message": message}})
                .to_string()
                .into_bytes();
            (status_or_500(code), Some("application/json"), body, None)
        }
        Outcome::Empty(code) => (status_or_500(code), None, Vec::new(), None),
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if let Some(ct) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(ct));
    }
    if let Some(loc) = location {
        match HeaderValue::from_str(&loc) {
            Ok(v) => {
                response.headers_mut().insert(LOCATION, v);
            }
            Err(_) => {
                error!(location = %loc, "redirect location is not a valid header value");
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            }
        }
    }
    if let Some(change) = cookie {
        let value = match change {
            CookieChange::Set(id) => format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly"),
            CookieChange::Clear => format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly"),
        };
        if let Ok(v) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(SET_COOKIE, v);
        }
    }
    response
}

fn status_or_500(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
