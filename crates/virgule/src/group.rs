//! Route groups
//!
//! A group is a prefix plus an inherited middleware list. It stores no
//! routes itself; every registration made through it forwards to the owning
//! router with the prefix prepended and the group's middlewares prepended
//! to any call-site middlewares.

use crate::controller::{Controller, ModelController};
use crate::middleware::{Handler, Middleware};
use crate::Router;
use axum::http::Method;

/// A prefix + middleware scope over a [`Router`]
///
/// Created with [`Router::group`]:
///
/// ```
/// use virgule::{handler, middleware, Response, Router};
///
/// let mut router = Router::new();
/// router.group("/api", vec![middleware(|req, params, next| next.run(req, params))], |api| {
///     api.get("/ping", handler(|_req, _params| Ok(Response::text("pong"))));
/// });
/// ```
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    middlewares: Vec<Middleware>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: &str, middlewares: Vec<Middleware>) -> Self {
        Self {
            router,
            prefix: normalize_prefix(prefix),
            middlewares,
        }
    }

    /// The group's prefix, normalized to end with `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers a route under the group's prefix
    ///
    /// The group's middlewares run before the call-site middlewares.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        middlewares: Vec<Middleware>,
        handler: Handler,
    ) -> &mut Self {
        let pattern = self.join(pattern);
        self.router
            .register(method, &pattern, self.combine(middlewares), handler);
        self
    }

    /// Registers a GET route under the prefix
    pub fn get(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::GET, pattern, Vec::new(), handler)
    }

    /// Registers a POST route under the prefix
    pub fn post(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::POST, pattern, Vec::new(), handler)
    }

    /// Registers a PUT route under the prefix
    pub fn put(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::PUT, pattern, Vec::new(), handler)
    }

    /// Registers a DELETE route under the prefix
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::DELETE, pattern, Vec::new(), handler)
    }

    /// Registers a PATCH route under the prefix
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::PATCH, pattern, Vec::new(), handler)
    }

    /// Registers an OPTIONS route under the prefix
    pub fn options(&mut self, pattern: &str, handler: Handler) -> &mut Self {
        self.register(Method::OPTIONS, pattern, Vec::new(), handler)
    }

    /// Maps a controller under the group's prefix
    pub fn map_controller(
        &mut self,
        path: &str,
        controller: Controller,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let path = self.join(path);
        self.router
            .map_controller(&path, controller, self.combine(middlewares));
        self
    }

    /// Maps a model controller under the group's prefix
    pub fn map_model_controller<T: Send + Sync + 'static>(
        &mut self,
        path: &str,
        controller: ModelController<T>,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let path = self.join(path);
        self.router
            .map_model_controller(&path, controller, self.combine(middlewares));
        self
    }

    fn join(&self, pattern: &str) -> String {
        format!("{}{}", self.prefix, pattern.trim_start_matches('/'))
    }

    fn combine(&self, call_site: Vec<Middleware>) -> Vec<Middleware> {
        let mut combined = self.middlewares.clone();
        combined.extend(call_site);
        combined
    }
}

/// Normalizes a group prefix to start and end with `/`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
