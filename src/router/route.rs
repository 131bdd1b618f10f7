//! Route entries stored at terminal tree nodes.

use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::pattern::RoutePattern;
use crate::context::Context;
use crate::controller::{ControllerBinding, MethodMapping};
use crate::filter::Condition;

/// Methods a [`MethodSet::Any`] route answers and reports in `Allow`.
pub static STANDARD_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
];

/// Plain handler function bound to a route.
pub type HandlerFn = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// The HTTP methods a route entry is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(SmallVec<[Method; 4]>),
}

impl MethodSet {
    #[must_use]
    pub fn single(method: Method) -> Self {
        let mut set = SmallVec::new();
        set.push(method);
        MethodSet::Only(set)
    }

    #[inline]
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods.contains(method),
        }
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => f.write_str("*"),
            MethodSet::Only(methods) => {
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(m.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// What a matched route invokes.
#[derive(Clone)]
pub enum Action {
    /// A plain function.
    Handler(HandlerFn),
    /// A controller whose action is picked from the request method.
    Mapping {
        controller: Arc<ControllerBinding>,
        mapping: MethodMapping,
    },
    /// A controller whose action is named by the first wildcard segment.
    Auto(Arc<ControllerBinding>),
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Handler(_) => "handler",
            Action::Mapping { .. } => "mapping",
            Action::Auto(_) => "auto",
        }
    }

    fn handles(&self, method: &Method) -> bool {
        match self {
            Action::Mapping { mapping, .. } => mapping.action_for(method).is_some(),
            Action::Handler(_) | Action::Auto(_) => true,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Handler(_) => f.write_str("Handler"),
            Action::Mapping {
                controller,
                mapping,
            } => write!(f, "Mapping({} {mapping})", controller.name()),
            Action::Auto(controller) => write!(f, "Auto({})", controller.name()),
        }
    }
}

/// One registered route: pattern, methods, action and the conditions of
/// every enclosing namespace (outermost first).
#[derive(Clone)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub methods: MethodSet,
    pub action: Action,
    pub conditions: Arc<[Condition]>,
    /// Full prefix of the namespace that registered this entry
    pub namespace: Arc<str>,
}

impl RouteEntry {
    /// Whether this entry answers `method`, ignoring conditions.
    #[inline]
    #[must_use]
    pub fn handles(&self, method: &Method) -> bool {
        self.methods.allows(method) && self.action.handles(method)
    }

    /// All conditions hold for `ctx`. Evaluation stops at the first false.
    #[must_use]
    pub fn conditions_hold(&self, ctx: &Context) -> bool {
        self.conditions.iter().all(|cond| cond(ctx))
    }

    /// Append the methods this entry answers to `out`, without duplicates.
    pub fn collect_allowed(&self, out: &mut Vec<Method>) {
        let mut push = |m: &Method| {
            if !out.contains(m) {
                out.push(m.clone());
            }
        };
        match (&self.methods, &self.action) {
            (_, Action::Mapping { mapping, .. }) => {
                for m in mapping.methods() {
                    if self.methods.allows(m) {
                        push(m);
                    }
                }
            }
            (MethodSet::Any, _) => STANDARD_METHODS.iter().for_each(push),
            (MethodSet::Only(methods), _) => methods.iter().for_each(push),
        }
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern.as_str())
            .field("methods", &self.methods.to_string())
            .field("action", &self.action)
            .field("conditions", &self.conditions.len())
            .field("namespace", &self.namespace)
            .finish()
    }
}
