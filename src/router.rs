//! Request router.
//!
//! One table per HTTP method. Exact paths live in a hash map checked first;
//! patterns with wildcard segments are scanned in registration order. A
//! pattern only matches a path with the *same number* of segments — a miss
//! resolves to the not-found handler, never to the closest-looking route.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// One segment of a route pattern.
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Matches any single request segment.
    Wildcard,
}

/// A parsed route pattern.
struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses `/`-separated segments. `:name` and `*` segments are wildcards,
    /// everything else is literal.
    fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|s| {
                if s == "*" || s.starts_with(':') {
                    Segment::Wildcard
                } else {
                    Segment::Literal(s.to_owned())
                }
            })
            .collect();
        Self { segments }
    }

    fn is_exact(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Segment counts must agree; wildcards then match anything.
    fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/');
        let mut matched = 0usize;
        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Literal(lit), Some(part)) if lit == part => matched += 1,
                (Segment::Wildcard, Some(_)) => matched += 1,
                _ => return false,
            }
        }
        matched == self.segments.len() && parts.next().is_none()
    }
}

#[derive(Default)]
struct RouteTable {
    exact: HashMap<String, BoxedHandler>,
    patterns: Vec<(Pattern, BoxedHandler)>,
}

/// The application router.
///
/// Build it once at startup; each [`Router::on`] call returns `self` so
/// registrations chain naturally. Construction takes the not-found handler
/// explicitly so a miss always resolves to *some* handler and flows through
/// the same gate and renderer as every registered route.
pub struct Router {
    routes: HashMap<Method, RouteTable>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new(not_found: impl Handler) -> Self {
        Self {
            routes: HashMap::new(),
            not_found: not_found.into_boxed_handler(),
        }
    }

    /// Register a handler for a method + pattern pair. Returns `self` for
    /// chaining. Wildcard segments use `:name` or `*` syntax.
    pub fn on(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        let parsed = Pattern::parse(pattern);
        let table = self.routes.entry(method).or_default();
        if parsed.is_exact() {
            table.exact.insert(pattern.to_owned(), handler.into_boxed_handler());
        } else {
            table.patterns.push((parsed, handler.into_boxed_handler()));
        }
        self
    }

    /// Resolves a handler for the request. Always returns a handler for a
    /// registered method (falling back to the not-found handler); a method
    /// with no routes at all is a lookup error.
    pub fn lookup(&self, method: Method, path: &str) -> Result<BoxedHandler, Error> {
        let table = self
            .routes
            .get(&method)
            .ok_or(Error::UnroutedMethod(method))?;
        if let Some(handler) = table.exact.get(path) {
            return Ok(Arc::clone(handler));
        }
        for (pattern, handler) in &table.patterns {
            if pattern.matches(path) {
                return Ok(Arc::clone(handler));
            }
        }
        Ok(Arc::clone(&self.not_found))
    }
}
