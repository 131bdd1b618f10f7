//! Controllers generated by `#[controller]`
//!
//! Covers action discovery (public methods only), name normalization,
//! lifecycle hooks, `default_action` and mapping-string validation.

use http::Method;
use nsrouter::controller::{ControllerBinding, MethodMapping};
use nsrouter::{controller, ConfigError, Context, Controller, Dispatcher, Namespace, Router};

#[derive(Default)]
pub struct AdminController;

#[controller(default_action = "dashboard")]
impl AdminController {
    pub fn dashboard(&self, ctx: &mut Context) {
        ctx.write("dashboard");
    }

    pub fn get_user(&self, ctx: &mut Context) {
        let id = ctx.param("p0").unwrap_or("none").to_string();
        ctx.write(format!("user {id}"));
    }

    fn prepare(&self, ctx: &mut Context) {
        if ctx.input.query("locked").is_some() {
            ctx.set_status(423);
            ctx.write("locked");
        }
    }

    fn finish(&self, ctx: &mut Context) {
        ctx.output.set_header("x-admin", "done".to_string());
    }

    #[allow(dead_code)]
    fn audit(&self, _ctx: &mut Context) {}

    #[allow(dead_code)]
    pub fn not_an_action(&self) -> usize {
        0
    }
}

#[derive(Default)]
pub struct Renamed;

#[controller(name = "ShopController")]
impl Renamed {
    pub fn index(&self, ctx: &mut Context) {
        ctx.write("shop");
    }
}

fn dispatch(ns: Namespace, ctx: Context) -> Context {
    let mut router = Router::new();
    router.add_namespace(ns).unwrap();
    let mut ctx = ctx;
    Dispatcher::new(router).dispatch(&mut ctx);
    ctx
}

#[test]
fn test_only_public_action_shaped_methods_are_actions() {
    let names: Vec<&str> = AdminController.actions().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["dashboard", "get_user"]);
    assert_eq!(AdminController.controller_name(), "AdminController");
    assert_eq!(AdminController.default_action(), Some("dashboard"));
}

#[test]
fn test_binding_normalizes_names() {
    let binding = ControllerBinding::new(AdminController).unwrap();
    assert_eq!(binding.route_segment(), "admin");
    assert!(binding.has_action("GetUser"));
    assert!(binding.has_action("getuser"));
    assert!(!binding.has_action("audit"));
    assert_eq!(binding.action_names(), vec!["dashboard", "get_user"]);
}

#[test]
fn test_renamed_controller_segment() {
    let ns = Namespace::new("/").auto_router(Renamed);
    let ctx = dispatch(ns, Context::new(Method::GET, "/shop/index"));
    assert_eq!(ctx.output.text(), "shop");
}

#[test]
fn test_auto_router_default_action_and_extra_segments() {
    let ctx = dispatch(
        Namespace::new("/v1").auto_router(AdminController),
        Context::new(Method::GET, "/v1/admin"),
    );
    assert_eq!(ctx.output.text(), "dashboard");
    assert_eq!(ctx.output.header("x-admin"), Some("done"));

    let ctx = dispatch(
        Namespace::new("/v1").auto_router(AdminController),
        Context::new(Method::DELETE, "/v1/admin/GetUser/17"),
    );
    assert_eq!(ctx.output.text(), "user 17");
}

#[test]
fn test_prepare_short_circuits_action_but_finish_runs() {
    let ctx = dispatch(
        Namespace::new("/v1").router("/admin", AdminController, "get:Dashboard"),
        Context::new(Method::GET, "/v1/admin?locked=1"),
    );
    assert_eq!(ctx.status(), 423);
    assert_eq!(ctx.output.text(), "locked");
    assert_eq!(ctx.output.header("x-admin"), Some("done"));
}

#[test]
fn test_mapping_only_answers_named_methods() {
    let ns = Namespace::new("/v1").router("/admin", AdminController, "get,post:Dashboard;put:GetUser");
    let ctx = dispatch(ns, Context::new(Method::PUT, "/v1/admin"));
    assert_eq!(ctx.output.text(), "user none");

    let ns = Namespace::new("/v1").router("/admin", AdminController, "get,post:Dashboard;put:GetUser");
    let ctx = dispatch(ns, Context::new(Method::DELETE, "/v1/admin"));
    assert_eq!(ctx.status(), 405);
    assert_eq!(ctx.output.header("allow"), Some("GET, POST, PUT"));
}

#[test]
fn test_empty_mapping_uses_rest_convention() {
    #[derive(Default)]
    pub struct Items;

    #[controller]
    impl Items {
        pub fn get(&self, ctx: &mut Context) {
            ctx.write("got");
        }
        pub fn post(&self, ctx: &mut Context) {
            ctx.set_status(201);
            ctx.write("posted");
        }
    }

    let ctx = dispatch(
        Namespace::new("/").router("/items", Items, ""),
        Context::new(Method::POST, "/items"),
    );
    assert_eq!(ctx.status(), 201);

    let ctx = dispatch(
        Namespace::new("/").router("/items", Items, ""),
        Context::new(Method::PATCH, "/items"),
    );
    assert_eq!(ctx.status(), 405);
}

#[test]
fn test_bad_mappings_are_reported_by_add_namespace() {
    let cases = [
        ("get:", "malformed"),
        (":List", "malformed"),
        ("bogus:List", "method"),
        ("*:Remove", "action"),
        ("  ;  ", "empty"),
    ];
    for (mapping, kind) in cases {
        let mut router = Router::new();
        let err = router
            .add_namespace(Namespace::new("/v1").router("/admin", AdminController, mapping))
            .unwrap_err();
        let ok = match kind {
            "malformed" => matches!(err, ConfigError::MalformedMapping { .. }),
            "method" => matches!(err, ConfigError::UnknownMethod { .. }),
            "action" => matches!(err, ConfigError::UnknownAction { .. }),
            _ => matches!(err, ConfigError::EmptyMapping),
        };
        assert!(ok, "mapping {mapping:?} gave {err:?}");
        assert_eq!(router.route_count(), 0);
    }
}

#[test]
fn test_mapping_grammar() {
    let mapping: MethodMapping = "get,post:Api;put:Update".parse().unwrap();
    assert_eq!(mapping.action_for(&Method::GET), Some("Api"));
    assert_eq!(mapping.action_for(&Method::POST), Some("Api"));
    assert_eq!(mapping.action_for(&Method::PUT), Some("Update"));
    assert_eq!(mapping.action_for(&Method::DELETE), None);

    let mapping = MethodMapping::parse("*:List").unwrap();
    assert_eq!(mapping.action_for(&Method::PATCH), Some("List"));
}
