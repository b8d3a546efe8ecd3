//! # Virgule
//!
//! An in-process HTTP request router with support for:
//! - Static routes (`/about`)
//! - Dynamic parameters (`/users/:id`)
//! - Catch-all splats (`/files/*path`)
//! - Optional trailing groups (`/report(/full)`)
//! - Global and route-scoped middleware chains
//! - Controller mapping, plain and model-resolving
//!
//! ## Build, then freeze
//!
//! Routes are registered on a mutable [`Router`] during a single-threaded
//! setup phase. [`Router::seal`] consumes it and produces a
//! [`SealedRouter`] whose trie structure can never change, so the host
//! runtime may dispatch requests concurrently through a shared reference
//! without coordination. Each request owns its own [`Params`] map.
//!
//! ## Example
//!
//! ```
//! use virgule::{handler, Request, Response, Router};
//!
//! let mut router = Router::new();
//! router.get("/users/:id", handler(|_req, params| {
//!     Ok(Response::text(format!("user {}", params.get_str("id").unwrap_or(""))))
//! }));
//!
//! let router = router.seal();
//! let response = router.route(&Request::get("/users/123")).unwrap();
//! assert_eq!(response.body(), "user 123");
//! ```
//!
//! The router does not parse HTTP wire syntax, persist anything, or manage
//! connections; it receives an already-parsed [`Request`] from a host HTTP
//! layer and hands back a [`Response`]. Handler and middleware errors
//! propagate out of [`SealedRouter::route`] for the host to map to a 5xx.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, error};

// ============================================================================
// Module Declarations
// ============================================================================

mod controller;
mod group;
mod middleware;
mod params;
pub mod pattern;
mod request;
mod response;
mod trie;

pub use axum::http::{HeaderMap, Method, StatusCode};
pub use controller::{Controller, CreateHandler, Finder, ModelController, ShowHandler};
pub use group::RouteGroup;
pub use middleware::{handler, middleware, Handler, Middleware, Next};
pub use params::Params;
pub use pattern::{PatternError, Segment};
pub use request::Request;
pub use response::Response;

use trie::Trie;

/// Methods the router keeps a trie for; anything else answers 404
const METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

// ============================================================================
// Router — registration phase
// ============================================================================

/// Route registration surface: one trie per method plus the global
/// middleware list
///
/// Registration is a single-threaded setup phase; call [`Router::seal`]
/// before serving.
pub struct Router {
    tries: HashMap<Method, Trie>,
    middlewares: Vec<Middleware>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a router with an empty trie per supported method
    pub fn new() -> Self {
        Self {
            tries: METHODS.into_iter().map(|m| (m, Trie::new())).collect(),
            middlewares: Vec::new(),
        }
    }

    /// Registers a route
    ///
    /// The pattern is compiled into trie segments plus an advisory
    /// full-path validator. An unparsable pattern is logged and skipped;
    /// re-registering an identical `(method, pattern)` overwrites the
    /// previous terminal, last write wins.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        middlewares: Vec<Middleware>,
        handler: Handler,
    ) -> &mut Self {
        let Some(trie) = self.tries.get_mut(&method) else {
            error!(method = %method, pattern, "unsupported method, skipping route");
            return self;
        };
        let (segments, validator) = match (pattern::split(pattern), pattern::compile(pattern)) {
            (Ok(segments), Ok(validator)) => (segments, validator),
            (Err(err), _) | (_, Err(err)) => {
                error!(%err, pattern, "unparsable route pattern, skipping registration");
                return self;
            }
        };
        debug!(method = %method, pattern, "registered route");
        trie.register(&segments, handler, Some(validator), middlewares);
        self
    }

    /// Registers a GET route
    pub fn get(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::GET, pattern, Vec::new(), handler)
    }

    /// Registers a POST route
    pub fn post(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::POST, pattern, Vec::new(), handler)
    }

    /// Registers a PUT route
    pub fn put(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::PUT, pattern, Vec::new(), handler)
    }

    /// Registers a DELETE route
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::DELETE, pattern, Vec::new(), handler)
    }

    /// Registers a PATCH route
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::PATCH, pattern, Vec::new(), handler)
    }

    /// Registers an OPTIONS route
    pub fn options(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::OPTIONS, pattern, Vec::new(), handler)
    }

    /// Appends a global middleware; globals run before route-scoped
    /// middlewares, in registration order
    pub fn use_middleware(&mut self, mw: Middleware) -> &mut Self {
        self.middlewares.push(mw);
        self
    }

    /// Opens a prefix + middleware scope and hands it to the builder
    ///
    /// The prefix is normalized to end with `/`; every registration made
    /// through the group forwards here with the prefix prepended and the
    /// group's middlewares prepended to call-site middlewares.
    pub fn group(
        &mut self,
        prefix: &str,
        middlewares: Vec<Middleware>,
        build: impl FnOnce(&mut RouteGroup<'_>),
    ) -> &mut Self {
        let mut group = RouteGroup::new(self, prefix, middlewares);
        build(&mut group);
        self
    }

    /// Freezes the router for serving
    ///
    /// Consumes the registration surface; the returned [`SealedRouter`]
    /// is read-only and safe to share across request tasks.
    pub fn seal(self) -> SealedRouter {
        SealedRouter {
            tries: self.tries,
            middlewares: self.middlewares,
        }
    }
}

// ============================================================================
// SealedRouter — serving phase
// ============================================================================

/// The frozen, shareable form of a [`Router`]
///
/// Matching never mutates trie structure, so a shared reference may serve
/// concurrent requests without coordination.
pub struct SealedRouter {
    tries: HashMap<Method, Trie>,
    middlewares: Vec<Middleware>,
}

impl SealedRouter {
    /// Dispatches one request
    ///
    /// Unmatched method or path, and handler-less terminals, answer 404
    /// without invoking any handler. Errors from handlers or middlewares
    /// are not caught here; they propagate for the host layer to turn into
    /// a server-error response.
    pub fn route(&self, request: &Request) -> Result<Response> {
        let Some(trie) = self.tries.get(request.method()) else {
            debug!(method = %request.method(), "no trie for method");
            return Ok(Response::not_found());
        };

        let segments: Vec<&str> = request
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let Some((node, mut params)) = trie.find(&segments) else {
            debug!(method = %request.method(), path = request.path(), "no route matched");
            return Ok(Response::not_found());
        };

        // The trie walk is authoritative; the stored validator is a
        // secondary diagnostic check only
        if let Some(validator) = node.validator() {
            if !validator.is_match(request.path()) {
                debug!(
                    path = request.path(),
                    "matched route's validator disagrees with trie walk"
                );
            }
        }

        params.extend(source_params(request));

        let Some(handler) = node.handler() else {
            // Should not occur after a successful match
            return Ok(Response::not_found());
        };
        middleware::run_chain(
            &self.middlewares,
            node.middlewares(),
            handler,
            request,
            &mut params,
        )
    }
}

/// Builds the non-path parameter contribution for a request
///
/// Reads take the query string; mutating methods take a content-type
/// driven body decode. An unrecognized or absent content type contributes
/// nothing — that is not an error at this stage.
fn source_params(request: &Request) -> Params {
    if *request.method() == Method::GET {
        return Params::from_pairs(request.query_pairs());
    }
    match request.content_type() {
        Some("application/json") => request
            .json()
            .map(|body| Params::from_json(&body))
            .unwrap_or_default(),
        Some("application/x-www-form-urlencoded") => Params::from_pairs(request.form_fields()),
        Some("multipart/form-data") => Params::from_pairs(request.multipart_fields()),
        _ => Params::new(),
    }
}
