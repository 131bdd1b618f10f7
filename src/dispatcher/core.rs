use arc_swap::ArcSwap;
use http::Method;
use serde_json::json;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::context::{Context, Output};
use crate::filter::{run_filters, FilterPosition};
use crate::router::{Action, Gate, Lookup, RouteEntry, RouteMatch, Router, SPLAT};

/// How a request left the dispatch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action ran (its response may still be an error status it chose).
    Handled,
    /// A filter at this position wrote the response.
    ShortCircuited(FilterPosition),
    NotFound,
    MethodNotAllowed,
    /// A filter or action panicked; the response is a 500.
    Panicked,
}

impl Outcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::ShortCircuited(FilterPosition::BeforeRouter) => "short_circuit_before_router",
            Outcome::ShortCircuited(FilterPosition::BeforeExec) => "short_circuit_before_exec",
            Outcome::ShortCircuited(FilterPosition::AfterExec) => "short_circuit_after_exec",
            Outcome::NotFound => "not_found",
            Outcome::MethodNotAllowed => "method_not_allowed",
            Outcome::Panicked => "panicked",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the per-request chain against a [`Router`]:
/// `BeforeRouter filters → routing (conditions gate entries) → BeforeExec
/// filters → action → AfterExec filters`.
///
/// Every outcome, including panics, ends as a response on the [`Context`].
pub struct Dispatcher {
    router: ArcSwap<Router>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            router: ArcSwap::from_pointee(router),
        }
    }

    /// The router currently serving requests.
    #[must_use]
    pub fn router(&self) -> Arc<Router> {
        self.router.load_full()
    }

    /// Replace the router. Requests already in flight finish on the old one.
    pub fn swap_router(&self, router: Router) {
        let routes_count = router.route_count();
        self.router.store(Arc::new(router));
        info!(routes_count, "Router swapped");
    }

    /// Dispatch one request, writing the response into `ctx.output`.
    pub fn dispatch(&self, ctx: &mut Context) -> Outcome {
        let router = self.router.load();
        let start = Instant::now();

        let outcome = match catch_unwind(AssertUnwindSafe(|| run_chain(&router, ctx))) {
            Ok(outcome) => outcome,
            Err(panic) => {
                let panic_message = panic_message(panic.as_ref());
                error!(
                    request_id = %ctx.request_id,
                    method = %ctx.input.method(),
                    path = %ctx.input.path(),
                    panic_message = %panic_message,
                    "Handler panicked - CRITICAL"
                );
                ctx.output = Output::default();
                ctx.output.json(
                    500,
                    &json!({
                        "error": "Internal Server Error",
                        "message": format!("Handler panicked: {panic_message}"),
                    }),
                );
                Outcome::Panicked
            }
        };

        info!(
            request_id = %ctx.request_id,
            method = %ctx.input.method(),
            path = %ctx.input.path(),
            status = ctx.output.status(),
            outcome = %outcome,
            latency_us = start.elapsed().as_micros() as u64,
            "Request dispatched"
        );
        outcome
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Router::new())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.load().route_count())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Whether `entry` takes part in matching this request: its conditions must
/// hold and, for auto routes, the requested action must exist.
fn gate(entry: &RouteEntry, params: &crate::router::ParamVec, ctx: &Context) -> Gate {
    if !entry.conditions_hold(ctx) {
        return Gate::Closed;
    }
    if let Action::Auto(binding) = &entry.action {
        let rest = params
            .iter()
            .rfind(|(k, _)| k.as_ref() == SPLAT)
            .map(|(_, v)| v.as_str());
        if binding.resolve_auto(ctx.input.method(), rest).is_none() {
            return Gate::Closed;
        }
    }
    Gate::Open
}

fn run_chain(router: &Router, ctx: &mut Context) -> Outcome {
    let method = ctx.input.method().clone();
    let path = ctx.input.path().to_string();

    let scoped = router.scope_filters(&path);
    if run_filters(&scoped, FilterPosition::BeforeRouter, ctx) {
        return Outcome::ShortCircuited(FilterPosition::BeforeRouter);
    }

    let lookup = {
        let view: &Context = ctx;
        router.route_with(&method, &path, &mut |entry, params| gate(entry, params, view))
    };

    match lookup {
        Lookup::Matched(m) => execute(m, &method, ctx),
        Lookup::MethodNotAllowed { allowed } => {
            method_not_allowed(ctx, &allowed);
            Outcome::MethodNotAllowed
        }
        Lookup::NotFound => {
            not_found(ctx);
            Outcome::NotFound
        }
    }
}

fn execute(m: RouteMatch, method: &Method, ctx: &mut Context) -> Outcome {
    let RouteMatch {
        entry,
        params,
        filters,
    } = m;
    ctx.input.replace_params(params);

    if run_filters(&filters, FilterPosition::BeforeExec, ctx) {
        return Outcome::ShortCircuited(FilterPosition::BeforeExec);
    }

    debug!(
        request_id = %ctx.request_id,
        route_pattern = %entry.pattern,
        action = entry.action.kind(),
        "Invoking action"
    );

    match &entry.action {
        Action::Handler(handler) => handler(ctx),
        Action::Mapping {
            controller,
            mapping,
        } => {
            let Some(action) = mapping
                .action_for(method)
                .and_then(|name| controller.action(name))
            else {
                // unreachable for validated mappings; answer like an unknown path
                warn!(
                    request_id = %ctx.request_id,
                    controller = controller.name(),
                    method = %method,
                    "Mapped action could not be resolved"
                );
                not_found(ctx);
                return Outcome::NotFound;
            };
            action.invoke(ctx);
        }
        Action::Auto(binding) => {
            let rest = ctx.param(SPLAT).map(str::to_string);
            let Some(target) = binding.resolve_auto(method, rest.as_deref()) else {
                warn!(
                    request_id = %ctx.request_id,
                    controller = binding.name(),
                    rest = ?rest,
                    "Auto-routed action could not be resolved"
                );
                not_found(ctx);
                return Outcome::NotFound;
            };
            for (i, value) in target.extra.iter().enumerate() {
                ctx.input.set_param(&format!("p{i}"), *value);
            }
            target.action.invoke(ctx);
        }
    }

    run_filters(&filters, FilterPosition::AfterExec, ctx);
    Outcome::Handled
}

fn not_found(ctx: &mut Context) {
    warn!(
        request_id = %ctx.request_id,
        method = %ctx.input.method(),
        path = %ctx.input.path(),
        "No route matched"
    );
    let body = json!({
        "error": "Not Found",
        "method": ctx.input.method().as_str(),
        "path": ctx.input.path(),
    });
    ctx.output.json(404, &body);
}

fn method_not_allowed(ctx: &mut Context, allowed: &[Method]) {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    warn!(
        request_id = %ctx.request_id,
        method = %ctx.input.method(),
        path = %ctx.input.path(),
        allowed = %allow,
        "Method not allowed"
    );
    let body = json!({
        "error": "Method Not Allowed",
        "method": ctx.input.method().as_str(),
        "path": ctx.input.path(),
        "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
    });
    ctx.output.json(405, &body);
    ctx.output.set_header("allow", allow);
}
