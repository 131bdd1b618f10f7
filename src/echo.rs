//! Demo application served by `nsrouter serve`.
//!
//! An echo namespace of plain handlers, a filter and a condition, and a
//! sample controller reached through all three controller routing styles.

use serde_json::{json, Map, Value};

use crate::context::Context;
use crate::error::ConfigError;
use crate::filter::FilterPosition;
use crate::namespace::{ns_auto_router, ns_get, Namespace};
use crate::router::{MethodSet, ParamVec, Router};
use crate::controller;

fn params_json(params: &ParamVec) -> Value {
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

/// Echo the request back as JSON.
pub fn echo_handler(ctx: &mut Context) {
    let body = json!({
        "method": ctx.input.method().as_str(),
        "path": ctx.input.path(),
        "domain": ctx.domain(),
        "params": params_json(ctx.input.params()),
        "query": params_json(ctx.input.query_params()),
        "body": String::from_utf8_lossy(ctx.input.body()),
        "request_id": ctx.request_id,
    });
    ctx.output.json(200, &body);
}

/// Sample controller for the demo routes.
#[derive(Debug, Default)]
pub struct UserController;

#[controller(default_action = "index")]
impl UserController {
    pub fn index(&self, ctx: &mut Context) {
        ctx.write("user index");
    }

    pub fn list(&self, ctx: &mut Context) {
        ctx.write("i am list");
    }

    pub fn get_user(&self, ctx: &mut Context) {
        let id = ctx.param("id").or_else(|| ctx.param("p0")).unwrap_or("unknown");
        let body = json!({ "id": id });
        ctx.output.json(200, &body);
    }

    pub fn create(&self, ctx: &mut Context) {
        ctx.set_status(201);
        ctx.write("created");
    }

    pub fn finish(&self, ctx: &mut Context) {
        ctx.output
            .set_header("x-controller", "UserController".to_string());
    }
}

/// Namespaces of the demo application.
#[must_use]
pub fn demo_namespaces() -> Vec<Namespace> {
    let api = Namespace::new("/v1")
        .filter(FilterPosition::BeforeRouter, |ctx: &mut Context| {
            ctx.output
                .set_header("x-namespace", "v1".to_string());
        })
        .handle(MethodSet::Any, "/echo", echo_handler)
        .get("/echo/:id", echo_handler)
        .get("/files/*path", echo_handler)
        .router("/users", UserController, "get:List;post:Create")
        .router_get("/users/:id", UserController::get_user)
        .namespace(Namespace::with_options(
            "/ctl",
            vec![ns_auto_router(UserController)],
        ));

    // answers only when the request asks for the admin host
    let admin = Namespace::with_options(
        "/admin",
        vec![ns_get("/status", |ctx: &mut Context| {
            ctx.output.json(200, &json!({ "admin": true }));
        })],
    )
    .cond(|ctx: &Context| ctx.domain().starts_with("admin."));

    vec![api, admin]
}

/// Router for the demo application.
///
/// # Errors
///
/// Only if one of the demo namespaces is misconfigured.
pub fn demo_router() -> Result<Router, ConfigError> {
    let mut router = Router::new();
    router.add_namespaces(demo_namespaces())?;
    Ok(router)
}
