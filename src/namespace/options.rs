//! Declarative namespace options.
//!
//! Each `ns_*` function returns an [`NsOption`]: a deferred mutation of a
//! [`Namespace`]. Options are applied in order by [`Namespace::with_options`]
//! or one at a time by [`Namespace::apply`]; the fluent builder methods are
//! thin wrappers over the same functions.

use http::Method;
use std::sync::Arc;

use super::{Namespace, RouteDecl};
use crate::context::Context;
use crate::controller::{run_lifecycle, ActionMethod, Controller, ControllerBinding, MethodMapping};
use crate::filter::{Filter, FilterPosition};
use crate::router::{pattern, Action, MethodSet, SPLAT};

/// A deferred namespace mutation.
pub type NsOption = Box<dyn FnOnce(&mut Namespace) + Send>;

/// Register `handler` for `methods` at `pattern`.
pub fn ns_handle<H>(methods: MethodSet, pattern: &str, handler: H) -> NsOption
where
    H: Fn(&mut Context) + Send + Sync + 'static,
{
    let pattern = pattern.to_string();
    Box::new(move |ns: &mut Namespace| {
        ns.routes.push(RouteDecl {
            pattern,
            methods,
            action: Action::Handler(Arc::new(handler)),
        });
    })
}

macro_rules! method_options {
    ($($(#[$doc:meta])* $name:ident => $method:expr;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<H>(pattern: &str, handler: H) -> NsOption
            where
                H: Fn(&mut Context) + Send + Sync + 'static,
            {
                ns_handle(MethodSet::single($method), pattern, handler)
            }
        )*
    };
}

method_options! {
    /// `GET pattern` → `handler`.
    ns_get => Method::GET;
    ns_post => Method::POST;
    ns_put => Method::PUT;
    ns_delete => Method::DELETE;
    ns_head => Method::HEAD;
    ns_options => Method::OPTIONS;
    ns_patch => Method::PATCH;
}

/// Register `handler` for every method at `pattern`.
pub fn ns_any<H>(pattern: &str, handler: H) -> NsOption
where
    H: Fn(&mut Context) + Send + Sync + 'static,
{
    ns_handle(MethodSet::Any, pattern, handler)
}

/// Route `pattern` to `controller`, picking the action from `mapping`
/// (`"*:List"`, `"get:Index;post:Create"`). An empty mapping applies the
/// REST convention: each method maps to the action of the same name.
pub fn ns_router<C: Controller>(pattern: &str, controller: C, mapping: &str) -> NsOption {
    let pattern = pattern.to_string();
    let mapping = mapping.to_string();
    Box::new(move |ns: &mut Namespace| {
        let result = ControllerBinding::new(controller).and_then(|binding| {
            let mapping = if mapping.trim().is_empty() {
                MethodMapping::rest(|name| binding.has_action(name))
            } else {
                MethodMapping::parse(&mapping)?
            };
            binding.check_mapping(&mapping)?;
            Ok(Action::Mapping {
                controller: Arc::new(binding),
                mapping,
            })
        });
        match result {
            Ok(action) => ns.routes.push(RouteDecl {
                pattern,
                methods: MethodSet::Any,
                action,
            }),
            Err(err) => ns.errors.push(err),
        }
    })
}

/// Mount `controller` at `<prefix>/<name>` and `<prefix>/<name>/*`, where
/// `<name>` is its lower-cased name without a `Controller` suffix. The first
/// segment after `<name>` selects the action.
pub fn ns_auto_router<C: Controller>(controller: C) -> NsOption {
    Box::new(move |ns: &mut Namespace| match ControllerBinding::new(controller) {
        Ok(binding) => {
            let binding = Arc::new(binding);
            let base = format!("/{}", binding.route_segment());
            ns.routes.push(RouteDecl {
                pattern: base.clone(),
                methods: MethodSet::Any,
                action: Action::Auto(Arc::clone(&binding)),
            });
            ns.routes.push(RouteDecl {
                pattern: pattern::join(&base, &format!("*{SPLAT}")),
                methods: MethodSet::Any,
                action: Action::Auto(binding),
            });
        }
        Err(err) => ns.errors.push(err),
    })
}

/// Route `methods` at `pattern` to `action` on a fresh `C::default()` per
/// request, with the controller's `prepare`/`finish` hooks around it.
pub fn ns_router_method<C>(methods: MethodSet, pattern: &str, action: ActionMethod<C>) -> NsOption
where
    C: Controller + Default,
{
    ns_handle(methods, pattern, move |ctx: &mut Context| {
        let controller = C::default();
        run_lifecycle(&controller, action, ctx);
    })
}

macro_rules! router_method_options {
    ($($name:ident => $method:expr;)*) => {
        $(
            pub fn $name<C>(pattern: &str, action: ActionMethod<C>) -> NsOption
            where
                C: Controller + Default,
            {
                ns_router_method(MethodSet::single($method), pattern, action)
            }
        )*
    };
}

router_method_options! {
    ns_router_get => Method::GET;
    ns_router_post => Method::POST;
    ns_router_put => Method::PUT;
    ns_router_delete => Method::DELETE;
    ns_router_head => Method::HEAD;
    ns_router_options => Method::OPTIONS;
    ns_router_patch => Method::PATCH;
}

/// [`ns_router_method`] for every method.
pub fn ns_router_any<C>(pattern: &str, action: ActionMethod<C>) -> NsOption
where
    C: Controller + Default,
{
    ns_router_method(MethodSet::Any, pattern, action)
}

/// Attach a filter to the namespace prefix.
pub fn ns_filter<F>(position: FilterPosition, filter: F) -> NsOption
where
    F: Filter + 'static,
{
    Box::new(move |ns: &mut Namespace| {
        let filter: Arc<dyn Filter> = Arc::new(filter);
        ns.filters.push((position, filter));
    })
}

/// [`ns_filter`] with the position given by name (`"before"`,
/// `"before_exec"`, `"after"`). An unknown name is reported by
/// `add_namespace`.
pub fn ns_filter_at<F>(position: &str, filter: F) -> NsOption
where
    F: Filter + 'static,
{
    let position = position.to_string();
    Box::new(move |ns: &mut Namespace| match position.parse::<FilterPosition>() {
        Ok(position) => {
            let filter: Arc<dyn Filter> = Arc::new(filter);
            ns.filters.push((position, filter));
        }
        Err(err) => ns.errors.push(err),
    })
}

/// Add a condition. All conditions of a namespace and of its ancestors must
/// hold for any of its routes to match.
pub fn ns_cond<P>(predicate: P) -> NsOption
where
    P: Fn(&Context) -> bool + Send + Sync + 'static,
{
    Box::new(move |ns: &mut Namespace| {
        ns.conditions.push(Arc::new(predicate));
    })
}

/// Nest `children` under the namespace.
pub fn ns_namespace(prefix: &str, options: Vec<NsOption>) -> NsOption {
    let child = Namespace::with_options(prefix, options);
    ns_child(child)
}

/// Nest an already built namespace.
pub fn ns_child(child: Namespace) -> NsOption {
    Box::new(move |ns: &mut Namespace| ns.children.push(child))
}
