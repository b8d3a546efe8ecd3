//! Middleware chain execution
//!
//! A request runs through the global middlewares (registration order), then
//! the matched route's middlewares, then the terminal handler. Each
//! middleware receives the request, the mutable parameter map, and a
//! [`Next`] continuation. Calling [`Next::run`] invokes the rest of the
//! chain; not calling it short-circuits with the middleware's own response.
//!
//! `Next::run` consumes the continuation, so no middleware can invoke the
//! tail of the chain more than once per request.

use crate::params::Params;
use crate::request::Request;
use crate::response::Response;
use anyhow::Result;
use std::sync::Arc;

/// Terminal route handler
pub type Handler = Arc<dyn Fn(&Request, &mut Params) -> Result<Response> + Send + Sync>;

/// One link of the middleware chain
pub type Middleware =
    Arc<dyn Fn(&Request, &mut Params, Next<'_>) -> Result<Response> + Send + Sync>;

/// Wraps a closure as a [`Handler`]
///
/// ```
/// use virgule::{handler, Response};
///
/// let hello = handler(|_req, _params| Ok(Response::text("hello")));
/// ```
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure as a [`Middleware`]
///
/// ```
/// use virgule::middleware;
///
/// let passthrough = middleware(|req, params, next| next.run(req, params));
/// ```
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(&Request, &mut Params, Next<'_>) -> Result<Response> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Continuation into the remainder of the chain
///
/// Holds the two middleware lists, the terminal handler, and the position
/// of the next link. Consumed by [`Next::run`].
pub struct Next<'a> {
    globals: &'a [Middleware],
    scoped: &'a [Middleware],
    handler: &'a Handler,
    index: usize,
}

impl Next<'_> {
    /// Invokes the next link of the chain and returns its response
    pub fn run(self, request: &Request, params: &mut Params) -> Result<Response> {
        dispatch(
            self.globals,
            self.scoped,
            self.handler,
            self.index,
            request,
            params,
        )
    }
}

/// Runs the full chain: globals, then route-scoped middlewares, then the
/// handler
pub(crate) fn run_chain(
    globals: &[Middleware],
    scoped: &[Middleware],
    handler: &Handler,
    request: &Request,
    params: &mut Params,
) -> Result<Response> {
    dispatch(globals, scoped, handler, 0, request, params)
}

fn dispatch(
    globals: &[Middleware],
    scoped: &[Middleware],
    handler: &Handler,
    index: usize,
    request: &Request,
    params: &mut Params,
) -> Result<Response> {
    let next = Next {
        globals,
        scoped,
        handler,
        index: index + 1,
    };

    if let Some(mw) = globals.get(index) {
        mw(request, params, next)
    } else if let Some(mw) = scoped.get(index - globals.len()) {
        mw(request, params, next)
    } else {
        handler(request, params)
    }
}
