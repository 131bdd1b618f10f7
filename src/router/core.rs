//! Router core: the registry of compiled namespaces.

use http::Method;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::route::RouteEntry;
use super::tree::{Gate, Lookup, Tree};
use crate::error::ConfigError;
use crate::filter::FilterEntry;
use crate::namespace::Namespace;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage: names are shared with the route patterns, values are
/// per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

const SLOW_MATCH: Duration = Duration::from_millis(1);

/// One line of the routing table, as reported by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub methods: String,
    pub pattern: String,
    pub action: String,
    pub namespace: String,
    pub conditions: usize,
}

/// Registry of every route and filter added through namespaces.
///
/// A `Router` is mutated only during startup (`add_namespace`). Once handed
/// to a [`Dispatcher`](crate::dispatcher::Dispatcher) it is shared read-only.
#[derive(Debug, Default)]
pub struct Router {
    tree: Tree,
    namespaces: usize,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `ns` (with all nested namespaces) and register it.
    ///
    /// The whole namespace is validated before anything is inserted, so on
    /// error the router is left exactly as it was.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] recorded while building the namespace, or
    /// raised while parsing its patterns.
    pub fn add_namespace(&mut self, ns: Namespace) -> Result<(), ConfigError> {
        let compiled = match ns.compile() {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!(error = %err, "Namespace rejected");
                return Err(err);
            }
        };

        let routes: Vec<Arc<RouteEntry>> =
            compiled.routes.into_iter().map(Arc::new).collect();
        if let Err(err) = self.tree.check(&routes) {
            warn!(error = %err, "Namespace rejected");
            return Err(err);
        }

        let prefix = compiled.prefix.clone();
        let route_count = routes.len();
        let filter_count = compiled.filters.len();

        for (scope, filter) in compiled.filters {
            self.tree.attach_filter(&scope, Arc::new(filter));
        }
        let mut summary = Vec::with_capacity(route_count.min(10));
        for entry in routes {
            if summary.len() < 10 {
                summary.push(format!("{} {}", entry.methods, entry.pattern));
            }
            self.tree.insert(entry)?;
        }
        self.namespaces += 1;

        info!(
            namespace = %prefix,
            routes_count = route_count,
            filters_count = filter_count,
            routes_summary = ?summary,
            total_routes = self.tree.len(),
            "Namespace registered"
        );
        Ok(())
    }

    /// Register several namespaces, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`Router::add_namespace`]. Namespaces before the failing one stay
    /// registered.
    pub fn add_namespaces(
        &mut self,
        namespaces: impl IntoIterator<Item = Namespace>,
    ) -> Result<(), ConfigError> {
        for ns in namespaces {
            self.add_namespace(ns)?;
        }
        Ok(())
    }

    /// Number of registered route entries.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.tree.len()
    }

    /// Number of top-level namespaces registered.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces
    }

    /// Match a request ignoring conditions and action resolvability.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Lookup {
        self.route_with(method, path, &mut |_, _| Gate::Open)
    }

    /// Match a request, letting `gate` close candidate entries.
    pub fn route_with(
        &self,
        method: &Method,
        path: &str,
        gate: &mut dyn FnMut(&RouteEntry, &ParamVec) -> Gate,
    ) -> Lookup {
        debug!(method = %method, path = %path, "Route match attempt");

        let match_start = Instant::now();
        let lookup = self.tree.find_with(method, path, gate);
        let match_duration = match_start.elapsed();

        match &lookup {
            Lookup::Matched(m) => {
                if match_duration > SLOW_MATCH {
                    warn!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.entry.pattern,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        route_pattern = %m.entry.pattern,
                        action = m.entry.action.kind(),
                        path_params = ?m.params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            Lookup::MethodNotAllowed { allowed } => {
                debug!(
                    method = %method,
                    path = %path,
                    allowed = ?allowed,
                    duration_us = match_duration.as_micros(),
                    "Path matched but method not allowed"
                );
            }
            Lookup::NotFound => {
                debug!(
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
            }
        }
        lookup
    }

    /// Filters attached along the prefix of `path`, root first.
    #[must_use]
    pub fn scope_filters(&self, path: &str) -> Vec<Arc<FilterEntry>> {
        self.tree.scope_filters(path)
    }

    /// The routing table.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteSummary> {
        self.tree
            .entries()
            .iter()
            .map(|entry| RouteSummary {
                methods: entry.methods.to_string(),
                pattern: entry.pattern.to_string(),
                action: describe_action(entry),
                namespace: entry.namespace.to_string(),
                conditions: entry.conditions.len(),
            })
            .collect()
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) {
        let routes = self.routes();
        println!(
            "[routes] namespaces={} count={}",
            self.namespaces,
            routes.len()
        );
        for r in routes {
            let gated = if r.conditions > 0 { " (conditional)" } else { "" };
            println!("[route] {} {} -> {}{gated}", r.methods, r.pattern, r.action);
        }
    }
}

fn describe_action(entry: &RouteEntry) -> String {
    use super::route::Action;
    match &entry.action {
        Action::Handler(_) => "handler".to_string(),
        Action::Mapping {
            controller,
            mapping,
        } => format!("{} [{mapping}]", controller.name()),
        Action::Auto(controller) => format!("{} [auto]", controller.name()),
    }
}
