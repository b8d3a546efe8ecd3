//! Controller-to-route mapping
//!
//! A controller is a declarative bundle of optional operations; mapping it
//! turns each present operation into one concrete route registration.
//! A *model* controller additionally carries a `find(id)` capability and
//! resolves the `:id` path parameter to an entity before its `show`
//! operation runs — a lookup miss answers 404 without ever invoking the
//! user's `show`.
//!
//! Controller shape is resolved once here, at mapping time. Request-time
//! dispatch goes through the same trie terminals as any other route and
//! never re-inspects the controller.

use crate::middleware::{handler, Handler, Middleware};
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;
use crate::Router;
use anyhow::Result;
use axum::http::Method;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Entity-lookup capability of a model controller
pub type Finder<T> = Arc<dyn Fn(i64) -> Option<T> + Send + Sync>;

/// `show` operation of a model controller — receives the resolved entity
pub type ShowHandler<T> =
    Arc<dyn Fn(&Request, &mut Params, &T) -> Result<Response> + Send + Sync>;

/// `create` operation of a model controller — receives the parsed JSON body
pub type CreateHandler =
    Arc<dyn Fn(&Request, &mut Params, JsonValue) -> Result<Response> + Send + Sync>;

/// A plain controller: any subset of the standard operations
///
/// Built with consuming `with_*` setters; absent operations register no
/// route when the controller is mapped.
///
/// # Examples
///
/// ```
/// use virgule::{Controller, Response, Router};
///
/// let posts = Controller::new()
///     .with_index(|_req, _params| Ok(Response::text("all posts")))
///     .with_show(|_req, params| {
///         Ok(Response::text(format!("post {}", params.get_str("id").unwrap_or(""))))
///     });
///
/// let mut router = Router::new();
/// router.map_controller("/posts", posts, Vec::new());
/// ```
#[derive(Clone, Default)]
pub struct Controller {
    pub(crate) index: Option<Handler>,
    pub(crate) show: Option<Handler>,
    pub(crate) create: Option<Handler>,
    pub(crate) update: Option<Handler>,
    pub(crate) delete: Option<Handler>,
    pub(crate) patch: Option<Handler>,
    pub(crate) options: Option<Handler>,
}

impl Controller {
    /// Creates a controller with no operations
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `index` operation (`GET path`)
    pub fn with_index<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.index = Some(handler(f));
        self
    }

    /// Sets the `show` operation (`GET path/:id`)
    pub fn with_show<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.show = Some(handler(f));
        self
    }

    /// Sets the `create` operation (`POST path`)
    pub fn with_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.create = Some(handler(f));
        self
    }

    /// Sets the `update` operation (`PUT path`)
    pub fn with_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.update = Some(handler(f));
        self
    }

    /// Sets the `delete` operation (`DELETE path`)
    pub fn with_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.delete = Some(handler(f));
        self
    }

    /// Sets the `patch` operation (`PATCH path`)
    pub fn with_patch<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.patch = Some(handler(f));
        self
    }

    /// Sets the `options` operation (`OPTIONS path`)
    pub fn with_options<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.options = Some(handler(f));
        self
    }
}

/// A controller that resolves an entity by identifier before `show`
///
/// Requires a `find(id)` capability at construction. `show` receives the
/// resolved entity; `create` is only invoked for `application/json` bodies
/// and receives the parsed body.
///
/// # Examples
///
/// ```
/// use virgule::{ModelController, Response, Router};
///
/// #[derive(Clone)]
/// struct User { name: String }
///
/// let users = ModelController::new(|id| {
///     (id == 1).then(|| User { name: "Alice".to_string() })
/// })
/// .with_show(|_req, _params, user: &User| Ok(Response::text(user.name.clone())));
///
/// let mut router = Router::new();
/// router.map_model_controller("/users", users, Vec::new());
/// ```
pub struct ModelController<T> {
    pub(crate) finder: Finder<T>,
    pub(crate) index: Option<Handler>,
    pub(crate) show: Option<ShowHandler<T>>,
    pub(crate) create: Option<CreateHandler>,
    pub(crate) update: Option<Handler>,
    pub(crate) delete: Option<Handler>,
    pub(crate) patch: Option<Handler>,
    pub(crate) options: Option<Handler>,
}

impl<T: Send + Sync + 'static> ModelController<T> {
    /// Creates a model controller from its `find(id)` capability
    pub fn new<F>(find: F) -> Self
    where
        F: Fn(i64) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            finder: Arc::new(find),
            index: None,
            show: None,
            create: None,
            update: None,
            delete: None,
            patch: None,
            options: None,
        }
    }

    /// Sets the `index` operation (`GET path`)
    pub fn with_index<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.index = Some(handler(f));
        self
    }

    /// Sets the `show` operation (`GET path/:id`, entity resolved first)
    pub fn with_show<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params, &T) -> Result<Response> + Send + Sync + 'static,
    {
        self.show = Some(Arc::new(f));
        self
    }

    /// Sets the `create` operation (`POST path`, JSON body enforced)
    pub fn with_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params, JsonValue) -> Result<Response> + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(f));
        self
    }

    /// Sets the `update` operation (`PUT path`)
    pub fn with_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.update = Some(handler(f));
        self
    }

    /// Sets the `delete` operation (`DELETE path`)
    pub fn with_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.delete = Some(handler(f));
        self
    }

    /// Sets the `patch` operation (`PATCH path`)
    pub fn with_patch<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.patch = Some(handler(f));
        self
    }

    /// Sets the `options` operation (`OPTIONS path`)
    pub fn with_options<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request, &mut Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.options = Some(handler(f));
        self
    }
}

impl Router {
    /// Maps a plain controller onto standard routes at `path`
    ///
    /// `index → GET path`, `show → GET path/:id`, `create → POST path`,
    /// `update → PUT path`, `delete → DELETE path`, `patch → PATCH path`,
    /// `options → OPTIONS path`. Absent operations register nothing.
    pub fn map_controller(
        &mut self,
        path: &str,
        controller: Controller,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let base = base_path(path);
        let show_path = format!("{}/:id", base);

        if let Some(op) = controller.index {
            self.register(Method::GET, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.show {
            self.register(Method::GET, &show_path, middlewares.clone(), op);
        }
        if let Some(op) = controller.create {
            self.register(Method::POST, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.update {
            self.register(Method::PUT, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.delete {
            self.register(Method::DELETE, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.patch {
            self.register(Method::PATCH, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.options {
            self.register(Method::OPTIONS, &base, middlewares, op);
        }
        self
    }

    /// Maps a model controller onto standard routes at `path`
    ///
    /// Wraps `show` with identifier resolution (404 on a lookup miss, the
    /// controller's `show` is never invoked) and `create` with a JSON
    /// content-type check (415 otherwise).
    pub fn map_model_controller<T: Send + Sync + 'static>(
        &mut self,
        path: &str,
        controller: ModelController<T>,
        middlewares: Vec<Middleware>,
    ) -> &mut Self {
        let base = base_path(path);
        let show_path = format!("{}/:id", base);

        if let Some(op) = controller.index {
            self.register(Method::GET, &base, middlewares.clone(), op);
        }
        if let Some(show) = controller.show {
            let find = controller.finder.clone();
            let resolving = handler(move |request, params| {
                let Some(id) = params.get_as::<i64>("id") else {
                    return Ok(Response::not_found());
                };
                match find(id) {
                    Some(entity) => show(request, params, &entity),
                    None => Ok(Response::not_found()),
                }
            });
            self.register(Method::GET, &show_path, middlewares.clone(), resolving);
        }
        if let Some(create) = controller.create {
            let guarded = handler(move |request, params| {
                if request.content_type() != Some("application/json") {
                    return Ok(Response::unsupported_media_type());
                }
                let body = request.json().unwrap_or(JsonValue::Null);
                create(request, params, body)
            });
            self.register(Method::POST, &base, middlewares.clone(), guarded);
        }
        if let Some(op) = controller.update {
            self.register(Method::PUT, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.delete {
            self.register(Method::DELETE, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.patch {
            self.register(Method::PATCH, &base, middlewares.clone(), op);
        }
        if let Some(op) = controller.options {
            self.register(Method::OPTIONS, &base, middlewares, op);
        }
        self
    }
}

fn base_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
