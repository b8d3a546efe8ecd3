//! Integration tests for virgule
//!
//! Tests are organized by feature area and cover:
//! - Literal, parameter, and splat matching
//! - Match precedence
//! - Parameter sources (path, query, body) and their merge order
//! - Middleware ordering and short-circuiting
//! - Route groups
//! - Plain and model controller mapping
//! - Registration idempotence
//! - Concurrent dispatch through a sealed router

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};
use virgule::{handler, middleware, Controller, ModelController, Request, Response, Router};

fn text_handler(label: &'static str) -> virgule::Handler {
    handler(move |_req, _params| Ok(Response::text(label)))
}

fn logging_middleware(
    log: Arc<Mutex<Vec<&'static str>>>,
    label: &'static str,
) -> virgule::Middleware {
    middleware(move |request, params, next| {
        log.lock().unwrap().push(label);
        next.run(request, params)
    })
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_literal_routes_match_exactly() {
    let mut router = Router::new();
    router.get("/about", text_handler("about"));
    router.get("/about/team", text_handler("team"));
    let router = router.seal();

    let response = router.route(&Request::get("/about")).unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "about");

    let response = router.route(&Request::get("/about/team")).unwrap();
    assert_eq!(response.body(), "team");

    // Anything not identical to a registered literal path is a 404
    for path in ["/abou", "/about/tea", "/about/team/extra", "/"] {
        let response = router.route(&Request::get(path)).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
    }
}

#[test]
fn test_param_route_extracts_string_value() {
    let mut router = Router::new();
    router.get(
        "/users/:id",
        handler(|_req, params| {
            Ok(Response::text(format!(
                "id={}",
                params.get_str("id").unwrap_or("missing")
            )))
        }),
    );
    let router = router.seal();

    let response = router.route(&Request::get("/users/42")).unwrap();
    assert_eq!(response.body(), "id=42");

    // No trailing segment consumed
    let response = router.route(&Request::get("/users/42/extra")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_splat_route_captures_remainder() {
    let mut router = Router::new();
    router.get(
        "/files/*path",
        handler(|_req, params| {
            Ok(Response::text(params.get_str("path").unwrap_or("").to_string()))
        }),
    );
    let router = router.seal();

    let response = router.route(&Request::get("/files/a/b/c")).unwrap();
    assert_eq!(response.body(), "a/b/c");
}

#[test]
fn test_literal_takes_precedence_over_param() {
    let mut router = Router::new();
    router.get("/users/:id", text_handler("param"));
    router.get("/users/active", text_handler("literal"));
    let router = router.seal();

    let response = router.route(&Request::get("/users/active")).unwrap();
    assert_eq!(response.body(), "literal");

    let response = router.route(&Request::get("/users/7")).unwrap();
    assert_eq!(response.body(), "param");
}

#[test]
fn test_optional_group_matches_both_forms() {
    let mut router = Router::new();
    router.get("/report(/full)", text_handler("report"));
    let router = router.seal();

    assert_eq!(router.route(&Request::get("/report")).unwrap().body(), "report");
    assert_eq!(
        router.route(&Request::get("/report/full")).unwrap().body(),
        "report"
    );
    assert_eq!(
        router.route(&Request::get("/report/partial")).unwrap().status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_method_selects_its_own_trie() {
    let mut router = Router::new();
    router.get("/things", text_handler("list"));
    router.post("/things", text_handler("create"));
    let router = router.seal();

    assert_eq!(router.route(&Request::get("/things")).unwrap().body(), "list");
    assert_eq!(router.route(&Request::post("/things")).unwrap().body(), "create");

    // DELETE was never registered for this path
    let response = router.route(&Request::delete("/things")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_unsupported_method_is_not_found() {
    let mut router = Router::new();
    router.get("/about", text_handler("about"));
    let router = router.seal();

    let request = Request::new(
        Method::HEAD,
        "/about",
        axum::http::HeaderMap::new(),
        Vec::new(),
    );
    let response = router.route(&request).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_unparsable_pattern_is_skipped_without_panic() {
    let mut router = Router::new();
    router.get("/broken/:", text_handler("never"));
    let router = router.seal();

    let response = router.route(&Request::get("/broken/anything")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_duplicate_registration_last_write_wins() {
    let mut router = Router::new();
    router.get("/users", text_handler("first"));
    router.get("/users", text_handler("second"));
    let router = router.seal();

    let response = router.route(&Request::get("/users")).unwrap();
    assert_eq!(response.body(), "second");
}

// ============================================================================
// Parameter sources
// ============================================================================

#[test]
fn test_query_params_populate_on_get() {
    let mut router = Router::new();
    router.get(
        "/search",
        handler(|_req, params| {
            Ok(Response::text(format!(
                "{}:{}",
                params.get_str("q").unwrap_or(""),
                params.get_str("page").unwrap_or("")
            )))
        }),
    );
    let router = router.seal();

    let response = router
        .route(&Request::get("/search?q=hello+world&page=2"))
        .unwrap();
    assert_eq!(response.body(), "hello world:2");
}

#[test]
fn test_json_body_populates_on_post() {
    let mut router = Router::new();
    router.post(
        "/users",
        handler(|_req, params| {
            Ok(Response::text(format!(
                "{}:{}",
                params.get_str("name").unwrap_or(""),
                params.get_as::<i64>("age").unwrap_or(0)
            )))
        }),
    );
    let router = router.seal();

    let request =
        Request::post("/users").with_json_body(&json!({"name": "Alice", "age": 30}));
    let response = router.route(&request).unwrap();
    assert_eq!(response.body(), "Alice:30");
}

#[test]
fn test_form_body_populates_on_post() {
    let mut router = Router::new();
    router.post(
        "/login",
        handler(|_req, params| {
            Ok(Response::text(params.get_str("user").unwrap_or("").to_string()))
        }),
    );
    let router = router.seal();

    let request = Request::post("/login").with_form_body(&[("user", "admin")]);
    let response = router.route(&request).unwrap();
    assert_eq!(response.body(), "admin");
}

#[test]
fn test_body_overwrites_path_param_of_same_name() {
    let mut router = Router::new();
    router.put(
        "/users/:id",
        handler(|_req, params| {
            Ok(Response::text(params.get_str("id").unwrap_or("").to_string()))
        }),
    );
    let router = router.seal();

    let request = Request::put("/users/42").with_json_body(&json!({"id": "from-body"}));
    let response = router.route(&request).unwrap();
    assert_eq!(response.body(), "from-body");
}

#[test]
fn test_unknown_content_type_contributes_nothing() {
    let mut router = Router::new();
    router.post(
        "/upload",
        handler(|_req, params| Ok(Response::text(format!("{}", params.len())))),
    );
    let router = router.seal();

    let request = Request::post("/upload").with_body("application/octet-stream", vec![0u8, 1]);
    let response = router.route(&request).unwrap();
    assert_eq!(response.body(), "0");
}

// ============================================================================
// Middleware
// ============================================================================

#[test]
fn test_middleware_order_globals_then_route() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut router = Router::new();
    router.use_middleware(logging_middleware(log.clone(), "A"));
    router.use_middleware(logging_middleware(log.clone(), "B"));
    let handler_log = log.clone();
    router.register(
        Method::GET,
        "/chained",
        vec![
            logging_middleware(log.clone(), "C"),
            logging_middleware(log.clone(), "D"),
        ],
        handler(move |_req, _params| {
            handler_log.lock().unwrap().push("handler");
            Ok(Response::ok())
        }),
    );
    let router = router.seal();

    router.route(&Request::get("/chained")).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C", "D", "handler"]);
}

#[test]
fn test_middleware_short_circuit_returns_its_response() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut router = Router::new();
    router.use_middleware(logging_middleware(log.clone(), "A"));
    let blocker_log = log.clone();
    router.use_middleware(middleware(move |_req, _params, _next| {
        blocker_log.lock().unwrap().push("B");
        Ok(Response::new(StatusCode::FORBIDDEN).with_body("denied"))
    }));
    router.register(
        Method::GET,
        "/guarded",
        vec![logging_middleware(log.clone(), "C")],
        text_handler("secret"),
    );
    let router = router.seal();

    let response = router.route(&Request::get("/guarded")).unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.body(), "denied");
    assert_eq!(*log.lock().unwrap(), vec!["A", "B"]);
}

#[test]
fn test_handler_error_propagates_to_caller() {
    let mut router = Router::new();
    router.get(
        "/explode",
        handler(|_req, _params| Err(anyhow::anyhow!("boom"))),
    );
    let router = router.seal();

    let result = router.route(&Request::get("/explode"));
    assert_eq!(result.unwrap_err().to_string(), "boom");
}

// ============================================================================
// Route groups
// ============================================================================

#[test]
fn test_group_prefixes_routes() {
    let mut router = Router::new();
    router.group("/api", Vec::new(), |api| {
        api.get("/ping", text_handler("pong"));
        api.get("/users/:id", text_handler("user"));
    });
    let router = router.seal();

    assert_eq!(router.route(&Request::get("/api/ping")).unwrap().body(), "pong");
    assert_eq!(router.route(&Request::get("/api/users/1")).unwrap().body(), "user");
    assert_eq!(
        router.route(&Request::get("/ping")).unwrap().status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_group_middlewares_run_before_call_site_middlewares() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut router = Router::new();
    let group_mw = logging_middleware(log.clone(), "group");
    let call_site_mw = logging_middleware(log.clone(), "call-site");
    router.group("/admin", vec![group_mw], |admin| {
        admin.register(
            Method::GET,
            "/stats",
            vec![call_site_mw.clone()],
            text_handler("stats"),
        );
    });
    let router = router.seal();

    router.route(&Request::get("/admin/stats")).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["group", "call-site"]);
}

// ============================================================================
// Controllers
// ============================================================================

#[test]
fn test_plain_controller_registers_present_operations() {
    let controller = Controller::new()
        .with_index(|_req, _params| Ok(Response::text("index")))
        .with_show(|_req, params| {
            Ok(Response::text(format!(
                "show {}",
                params.get_str("id").unwrap_or("")
            )))
        })
        .with_create(|_req, _params| Ok(Response::text("create")));

    let mut router = Router::new();
    router.map_controller("/posts", controller, Vec::new());
    let router = router.seal();

    assert_eq!(router.route(&Request::get("/posts")).unwrap().body(), "index");
    assert_eq!(router.route(&Request::get("/posts/9")).unwrap().body(), "show 9");
    assert_eq!(router.route(&Request::post("/posts")).unwrap().body(), "create");

    // update was never set, so PUT registers nothing
    assert_eq!(
        router.route(&Request::put("/posts")).unwrap().status(),
        StatusCode::NOT_FOUND
    );
}

#[derive(Clone)]
struct User {
    name: &'static str,
}

fn user_controller() -> ModelController<User> {
    ModelController::new(|id| (id == 1).then_some(User { name: "Alice" }))
        .with_show(|_req, _params, user: &User| Ok(Response::text(user.name)))
        .with_create(|_req, _params, body| {
            Ok(Response::text(format!(
                "created {}",
                body.get("name").and_then(|v| v.as_str()).unwrap_or("?")
            )))
        })
}

#[test]
fn test_model_controller_show_resolves_entity() {
    let mut router = Router::new();
    router.map_model_controller("/users", user_controller(), Vec::new());
    let router = router.seal();

    let response = router.route(&Request::get("/users/1")).unwrap();
    assert_eq!(response.body(), "Alice");
}

#[test]
fn test_model_controller_show_miss_is_not_found() {
    let show_called = Arc::new(Mutex::new(false));
    let called = show_called.clone();

    let controller = ModelController::new(|id: i64| (id == 1).then_some(User { name: "Alice" }))
        .with_show(move |_req, _params, user: &User| {
            *called.lock().unwrap() = true;
            Ok(Response::text(user.name))
        });

    let mut router = Router::new();
    router.map_model_controller("/users", controller, Vec::new());
    let router = router.seal();

    let response = router.route(&Request::get("/users/99")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!*show_called.lock().unwrap(), "show ran on a lookup miss");

    // A non-numeric identifier cannot resolve either
    let response = router.route(&Request::get("/users/abc")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_model_controller_create_requires_json() {
    let mut router = Router::new();
    router.map_model_controller("/users", user_controller(), Vec::new());
    let router = router.seal();

    let request = Request::post("/users").with_body("text/plain", "name=Bob");
    let response = router.route(&request).unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let request = Request::post("/users").with_json_body(&json!({"name": "Bob"}));
    let response = router.route(&request).unwrap();
    assert_eq!(response.body(), "created Bob");
}

#[test]
fn test_model_controller_inside_group() {
    let mut router = Router::new();
    router.group("/api", Vec::new(), |api| {
        api.map_model_controller("/users", user_controller(), Vec::new());
    });
    let router = router.seal();

    let response = router.route(&Request::get("/api/users/1")).unwrap();
    assert_eq!(response.body(), "Alice");

    let response = router.route(&Request::get("/users/1")).unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_sealed_router_dispatches_from_multiple_threads() {
    let mut router = Router::new();
    router.get(
        "/users/:id",
        handler(|_req, params| {
            Ok(Response::text(params.get_str("id").unwrap_or("").to_string()))
        }),
    );
    let router = router.seal();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let router = &router;
            scope.spawn(move || {
                let path = format!("/users/{i}");
                let response = router.route(&Request::get(&path)).unwrap();
                assert_eq!(response.body(), i.to_string());
            });
        }
    });
}
