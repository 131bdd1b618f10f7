//! # Namespaces
//!
//! A [`Namespace`] groups routes under a common prefix together with the
//! filters and conditions that apply to them, and may nest further
//! namespaces. It can be built fluently:
//!
//! ```rust,ignore
//! let ns = Namespace::new("/v1")
//!     .cond(|ctx| ctx.domain() == "api.example.com")
//!     .get("/user", |ctx| ctx.write("v1_user"))
//!     .namespace(Namespace::new("/admin").get("/order", |ctx| ctx.write("v1_admin_order")));
//! ```
//!
//! or declaratively from a list of options:
//!
//! ```rust,ignore
//! let ns = Namespace::with_options("/v1", vec![
//!     ns_get("/user", |ctx| ctx.write("v1_user")),
//!     ns_namespace("/admin", vec![ns_get("/order", |ctx| ctx.write("v1_admin_order"))]),
//! ]);
//! ```
//!
//! Both forms go through [`Namespace::apply`]. Configuration mistakes (bad
//! mapping strings, unknown actions, malformed patterns) are recorded and
//! reported when the namespace is registered with
//! [`Router::add_namespace`](crate::router::Router::add_namespace).

mod compile;
mod options;

pub(crate) use compile::CompiledNamespace;
pub use options::*;

use std::sync::Arc;

use crate::context::Context;
use crate::controller::{ActionMethod, Controller};
use crate::error::ConfigError;
use crate::filter::{Condition, Filter, FilterPosition};
use crate::router::{Action, MethodSet};

/// A route as declared, before prefix concatenation.
pub(crate) struct RouteDecl {
    pub(crate) pattern: String,
    pub(crate) methods: MethodSet,
    pub(crate) action: Action,
}

/// A prefix-scoped group of routes, filters and conditions.
pub struct Namespace {
    pub(crate) prefix: String,
    pub(crate) routes: Vec<RouteDecl>,
    pub(crate) filters: Vec<(FilterPosition, Arc<dyn Filter>)>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) children: Vec<Namespace>,
    pub(crate) errors: Vec<ConfigError>,
}

impl Namespace {
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            routes: Vec::new(),
            filters: Vec::new(),
            conditions: Vec::new(),
            children: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Create a namespace and apply `options` in order.
    #[must_use]
    pub fn with_options(prefix: &str, options: impl IntoIterator<Item = NsOption>) -> Self {
        options.into_iter().fold(Self::new(prefix), Self::apply)
    }

    /// Apply one option.
    #[must_use]
    pub fn apply(mut self, option: NsOption) -> Self {
        option(&mut self);
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Routes declared directly on this namespace (children excluded).
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Configuration errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    #[must_use]
    pub fn get<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_get(pattern, handler))
    }

    #[must_use]
    pub fn post<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_post(pattern, handler))
    }

    #[must_use]
    pub fn put<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_put(pattern, handler))
    }

    #[must_use]
    pub fn delete<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_delete(pattern, handler))
    }

    #[must_use]
    pub fn head<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_head(pattern, handler))
    }

    #[must_use]
    pub fn options<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_options(pattern, handler))
    }

    #[must_use]
    pub fn patch<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_patch(pattern, handler))
    }

    #[must_use]
    pub fn any<H>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_any(pattern, handler))
    }

    /// Register `handler` for an explicit method set.
    #[must_use]
    pub fn handle<H>(self, methods: MethodSet, pattern: &str, handler: H) -> Self
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.apply(ns_handle(methods, pattern, handler))
    }

    /// See [`ns_router`].
    #[must_use]
    pub fn router<C: Controller>(self, pattern: &str, controller: C, mapping: &str) -> Self {
        self.apply(ns_router(pattern, controller, mapping))
    }

    /// See [`ns_auto_router`].
    #[must_use]
    pub fn auto_router<C: Controller>(self, controller: C) -> Self {
        self.apply(ns_auto_router(controller))
    }

    #[must_use]
    pub fn router_get<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_get(pattern, action))
    }

    #[must_use]
    pub fn router_post<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_post(pattern, action))
    }

    #[must_use]
    pub fn router_put<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_put(pattern, action))
    }

    #[must_use]
    pub fn router_delete<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_delete(pattern, action))
    }

    #[must_use]
    pub fn router_head<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_head(pattern, action))
    }

    #[must_use]
    pub fn router_options<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_options(pattern, action))
    }

    #[must_use]
    pub fn router_patch<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_patch(pattern, action))
    }

    #[must_use]
    pub fn router_any<C: Controller + Default>(self, pattern: &str, action: ActionMethod<C>) -> Self {
        self.apply(ns_router_any(pattern, action))
    }

    #[must_use]
    pub fn filter<F: Filter + 'static>(self, position: FilterPosition, filter: F) -> Self {
        self.apply(ns_filter(position, filter))
    }

    /// Attach a filter by position name (`"before"`, `"before_exec"`, `"after"`).
    #[must_use]
    pub fn filter_at<F: Filter + 'static>(self, position: &str, filter: F) -> Self {
        self.apply(ns_filter_at(position, filter))
    }

    #[must_use]
    pub fn cond<P>(self, predicate: P) -> Self
    where
        P: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.apply(ns_cond(predicate))
    }

    /// Nest `child`; its prefix is appended to this one.
    #[must_use]
    pub fn namespace(self, child: Namespace) -> Self {
        self.apply(ns_child(child))
    }

    pub(crate) fn compile(self) -> Result<CompiledNamespace, ConfigError> {
        compile::compile(self)
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix)
            .field("routes", &self.routes.len())
            .field("filters", &self.filters.len())
            .field("conditions", &self.conditions.len())
            .field("children", &self.children)
            .field("errors", &self.errors)
            .finish()
    }
}
