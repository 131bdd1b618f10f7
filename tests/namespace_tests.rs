//! Namespace behaviour through the public API
//!
//! # Test Coverage
//!
//! - fluent and declarative (`ns_*`) construction
//! - prefix concatenation for nested namespaces, with and without params
//! - controller routing: mapping strings, auto-routing, per-method routes
//! - `before` filter short-circuit
//! - condition gating falling back to 404 or 405
//!
//! Every test builds its own [`Router`]; there is no shared registry.

use http::Method;
use nsrouter::namespace::{
    ns_auto_router, ns_get, ns_namespace, ns_router_any, ns_router_delete, ns_router_get,
    ns_router_head, ns_router_options, ns_router_patch, ns_router_post, ns_router_put,
};
use nsrouter::router::STANDARD_METHODS;
use nsrouter::{controller, Context, Dispatcher, Namespace, NsOption, Router};

const EXAMPLE_BODY: &str = "hello world";
const NS_NAMESPACE: &str = "/router";
const NS_PATH: &str = "/user";
const NS_NAMESPACE_PATH: &str = "/router/user";

#[derive(Default)]
pub struct TestController;

#[controller]
impl TestController {
    pub fn list(&self, ctx: &mut Context) {
        ctx.write("i am list");
    }

    pub fn get(&self, ctx: &mut Context) {
        ctx.write("i am get");
    }
}

#[derive(Default)]
pub struct ExampleController;

#[controller]
impl ExampleController {
    pub fn ping(&self, ctx: &mut Context) {
        ctx.write(EXAMPLE_BODY);
    }

    #[allow(dead_code)]
    fn hidden(&self, ctx: &mut Context) {
        ctx.write("ping method");
    }
}

fn serve(namespaces: Vec<Namespace>, method: Method, uri: &str) -> Context {
    serve_ctx(namespaces, Context::new(method, uri))
}

fn serve_ctx(namespaces: Vec<Namespace>, mut ctx: Context) -> Context {
    let mut router = Router::new();
    router.add_namespaces(namespaces).unwrap();
    Dispatcher::new(router).dispatch(&mut ctx);
    ctx
}

fn write_param(ctx: &mut Context) {
    let id = ctx.param(":id").unwrap_or_default().to_string();
    ctx.write(id);
}

#[test]
fn test_namespace_get() {
    let ns = Namespace::new("/v1").get("/user", |ctx: &mut Context| ctx.write("v1_user"));
    let ctx = serve(vec![ns], Method::GET, "/v1/user");
    assert_eq!(ctx.output.text(), "v1_user");
}

#[test]
fn test_namespace_post() {
    let ns = Namespace::new("/v1").post("/user/:id", write_param);
    let ctx = serve(vec![ns], Method::POST, "/v1/user/123");
    assert_eq!(ctx.output.text(), "123");
}

#[test]
fn test_namespace_nest() {
    let ns = Namespace::new("/v1").namespace(
        Namespace::new("/admin").get("/order", |ctx: &mut Context| ctx.write("order")),
    );
    let ctx = serve(vec![ns], Method::GET, "/v1/admin/order");
    assert_eq!(ctx.output.text(), "order");

    // only reachable under the full prefix
    let ns = Namespace::new("/v1").namespace(
        Namespace::new("/admin").get("/order", |ctx: &mut Context| ctx.write("order")),
    );
    let ctx = serve(vec![ns], Method::GET, "/admin/order");
    assert_eq!(ctx.status(), 404);
}

#[test]
fn test_namespace_nest_param() {
    let ns = Namespace::new("/v1").namespace(Namespace::new("/admin").get("/order/:id", write_param));
    let ctx = serve(vec![ns], Method::GET, "/v1/admin/order/123");
    assert_eq!(ctx.output.text(), "123");
}

#[test]
fn test_namespace_router_mapping_answers_every_method() {
    for method in STANDARD_METHODS.iter() {
        let ns = Namespace::new("/v1").router("/api/list", TestController, "*:List");
        let ctx = serve(vec![ns], method.clone(), "/v1/api/list");
        assert_eq!(ctx.output.text(), "i am list", "method {method}");
    }
}

#[test]
fn test_namespace_auto_func() {
    let ns = Namespace::new("/v1").auto_router(TestController);
    let ctx = serve(vec![ns], Method::GET, "/v1/test/list");
    assert_eq!(ctx.output.text(), "i am list");
}

#[test]
fn test_namespace_auto_unknown_action_is_404() {
    let ns = Namespace::new("/v1").auto_router(TestController);
    let ctx = serve(vec![ns], Method::GET, "/v1/test/missing");
    assert_eq!(ctx.status(), 404);
}

#[test]
fn test_namespace_filter() {
    let ns = Namespace::new("/v1")
        .filter_at("before", |ctx: &mut Context| ctx.write("this is Filter"))
        .get("/user/:id", write_param);
    let ctx = serve(vec![ns], Method::GET, "/v1/user/123");
    assert_eq!(ctx.output.text(), "this is Filter");
}

#[test]
fn test_namespace_cond_alone_is_not_found() {
    let ns = Namespace::new("/v2")
        .cond(|ctx: &Context| ctx.domain() == "api.example.com")
        .auto_router(TestController);
    let ctx = serve(vec![ns], Method::GET, "/v2/test/list");
    // a closed namespace is absent for the request, so nothing claims the path
    assert_eq!(ctx.status(), 404);
    assert_ne!(ctx.output.text(), "i am list");
}

#[test]
fn test_namespace_cond_with_competing_route_is_method_not_allowed() {
    let gated = Namespace::new("/v2")
        .cond(|ctx: &Context| ctx.domain() == "api.example.com")
        .auto_router(TestController);
    let other = Namespace::new("/v2").post("/test/list", |ctx: &mut Context| ctx.write("posted"));

    let ctx = serve(vec![gated, other], Method::GET, "/v2/test/list");
    assert_eq!(ctx.status(), 405);
    assert_eq!(ctx.output.header("allow"), Some("POST"));
}

#[test]
fn test_namespace_cond_holds() {
    let ns = Namespace::new("/v2")
        .cond(|ctx: &Context| ctx.domain() == "api.example.com")
        .auto_router(TestController);
    let ctx = serve_ctx(
        vec![ns],
        Context::new(Method::GET, "/v2/test/list").with_host("api.example.com:8080"),
    );
    assert_eq!(ctx.output.text(), "i am list");
}

#[test]
fn test_namespace_inside() {
    let ns = Namespace::with_options(
        "/v3",
        vec![
            ns_auto_router(TestController),
            ns_namespace("/shop", vec![ns_get("/order/:id", write_param)]),
        ],
    );
    let ctx = serve(vec![ns], Method::GET, "/v3/shop/order/123");
    assert_eq!(ctx.output.text(), "123");
}

#[test]
fn test_namespace_router_per_method() {
    type Register = fn(Namespace) -> Namespace;
    let cases: [(Method, Register); 7] = [
        (Method::GET, |ns| ns.router_get(NS_PATH, ExampleController::ping)),
        (Method::POST, |ns| ns.router_post(NS_PATH, ExampleController::ping)),
        (Method::PUT, |ns| ns.router_put(NS_PATH, ExampleController::ping)),
        (Method::DELETE, |ns| ns.router_delete(NS_PATH, ExampleController::ping)),
        (Method::HEAD, |ns| ns.router_head(NS_PATH, ExampleController::ping)),
        (Method::OPTIONS, |ns| ns.router_options(NS_PATH, ExampleController::ping)),
        (Method::PATCH, |ns| ns.router_patch(NS_PATH, ExampleController::ping)),
    ];

    for (method, register) in cases {
        let ns = register(Namespace::new(NS_NAMESPACE));
        let ctx = serve(vec![ns], method.clone(), NS_NAMESPACE_PATH);
        assert_eq!(ctx.output.text(), EXAMPLE_BODY, "method {method}");
    }
}

#[test]
fn test_namespace_ns_router_per_method() {
    let cases: [(Method, fn() -> NsOption); 7] = [
        (Method::GET, || ns_router_get(NS_PATH, ExampleController::ping)),
        (Method::POST, || ns_router_post(NS_PATH, ExampleController::ping)),
        (Method::PUT, || ns_router_put(NS_PATH, ExampleController::ping)),
        (Method::DELETE, || ns_router_delete(NS_PATH, ExampleController::ping)),
        (Method::HEAD, || ns_router_head(NS_PATH, ExampleController::ping)),
        (Method::OPTIONS, || ns_router_options(NS_PATH, ExampleController::ping)),
        (Method::PATCH, || ns_router_patch(NS_PATH, ExampleController::ping)),
    ];

    for (method, option) in cases {
        let ns = Namespace::new(NS_NAMESPACE).apply(option());
        let ctx = serve(vec![ns], method.clone(), NS_NAMESPACE_PATH);
        assert_eq!(ctx.output.text(), EXAMPLE_BODY, "method {method}");
    }
}

#[test]
fn test_namespace_router_get_rejects_other_methods() {
    let ns = Namespace::new(NS_NAMESPACE).router_get(NS_PATH, ExampleController::ping);
    let ctx = serve(vec![ns], Method::POST, NS_NAMESPACE_PATH);
    assert_eq!(ctx.status(), 405);
    assert_eq!(ctx.output.header("allow"), Some("GET"));
}

#[test]
fn test_namespace_router_any() {
    for method in STANDARD_METHODS.iter() {
        let ns = Namespace::new(NS_NAMESPACE).router_any(NS_PATH, ExampleController::ping);
        let ctx = serve(vec![ns], method.clone(), NS_NAMESPACE_PATH);
        assert_eq!(ctx.output.text(), EXAMPLE_BODY, "method {method}");
    }
}

#[test]
fn test_namespace_ns_router_any() {
    for method in STANDARD_METHODS.iter() {
        let ns = Namespace::new(NS_NAMESPACE).apply(ns_router_any(NS_PATH, ExampleController::ping));
        let ctx = serve(vec![ns], method.clone(), NS_NAMESPACE_PATH);
        assert_eq!(ctx.output.text(), EXAMPLE_BODY, "method {method}");
    }
}

#[test]
fn test_private_methods_are_not_actions() {
    let ns = Namespace::new("/v1").auto_router(ExampleController);
    let ctx = serve(vec![ns], Method::GET, "/v1/example/hidden");
    assert_eq!(ctx.status(), 404);

    let ns = Namespace::new("/v1").auto_router(ExampleController);
    let ctx = serve(vec![ns], Method::GET, "/v1/example/ping");
    assert_eq!(ctx.output.text(), EXAMPLE_BODY);
}

#[test]
fn test_any_route_answers_standard_methods() {
    for method in STANDARD_METHODS.iter() {
        let ns = Namespace::new("/v1").any("/all", |ctx: &mut Context| ctx.write("any"));
        let ctx = serve(vec![ns], method.clone(), "/v1/all");
        assert_eq!(ctx.output.text(), "any", "method {method}");
    }
}

#[test]
fn test_registering_twice_keeps_route_working() {
    let build = || Namespace::new("/v1").get("/user", |ctx: &mut Context| ctx.write("v1_user"));
    let mut router = Router::new();
    router.add_namespace(build()).unwrap();
    router.add_namespace(build()).unwrap();
    assert_eq!(router.namespace_count(), 2);

    let dispatcher = Dispatcher::new(router);
    let mut ctx = Context::new(Method::GET, "/v1/user");
    dispatcher.dispatch(&mut ctx);
    assert_eq!(ctx.output.text(), "v1_user");
}
