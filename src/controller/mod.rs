//! # Controllers
//!
//! A controller is a type exposing named actions. Routes reach its actions
//! three ways:
//!
//! - a mapping string (`"*:List"`) picking the action from the request method
//!   ([`crate::namespace::ns_router`])
//! - auto-routing, where the first path segment after the controller's name
//!   is the action ([`crate::namespace::ns_auto_router`])
//! - a method reference on a fresh `Default` instance per request
//!   ([`crate::namespace::ns_router_get`] and friends)
//!
//! Actions are listed explicitly by [`Controller::actions`], usually generated
//! by the [`#[controller]`](crate::controller) attribute from the `pub fn`s of
//! an impl block. Methods that are not listed are not reachable.
//!
//! ```rust,ignore
//! use nsrouter::{controller, Context};
//!
//! #[derive(Default)]
//! pub struct TestController;
//!
//! #[controller]
//! impl TestController {
//!     pub fn list(&self, ctx: &mut Context) {
//!         ctx.write("i am list");
//!     }
//!     fn helper(&self, _ctx: &mut Context) {}
//! }
//! ```

mod mapping;

pub use mapping::MethodMapping;

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::ConfigError;

/// An action: a method taking the controller and the request context.
pub type ActionMethod<C> = fn(&C, &mut Context);

/// A type whose public actions can be routed to.
pub trait Controller: Send + Sync + 'static {
    /// Name used in logs and, lower-cased without a `Controller` suffix, as
    /// the auto-routing path segment.
    fn controller_name(&self) -> &'static str;

    /// Every reachable action with the name it is routed by.
    fn actions(&self) -> Vec<(&'static str, ActionMethod<Self>)>
    where
        Self: Sized;

    /// Action used by auto-routing when the request names none.
    fn default_action(&self) -> Option<&'static str> {
        None
    }

    /// Runs before every action. Writing a body skips the action.
    fn prepare(&self, _ctx: &mut Context) {}

    /// Runs after every action, and after a `prepare` that wrote a body.
    fn finish(&self, _ctx: &mut Context) {}
}

/// Normalize an action name for lookup: lower-case, underscores removed.
/// `GetUser`, `get_user` and `getuser` are the same action.
#[must_use]
pub fn normalize_action(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Auto-routing path segment for a controller name:
/// `TestController` → `test`, `Admin` → `admin`.
#[must_use]
pub fn route_segment(controller_name: &str) -> String {
    let base = controller_name
        .strip_suffix("Controller")
        .filter(|b| !b.is_empty())
        .unwrap_or(controller_name);
    base.to_lowercase()
}

pub(crate) fn run_lifecycle<C: Controller>(controller: &C, action: ActionMethod<C>, ctx: &mut Context) {
    controller.prepare(ctx);
    if !ctx.output.is_written() {
        action(controller, ctx);
    }
    controller.finish(ctx);
}

/// An action with its controller bound in.
#[derive(Clone)]
pub struct BoundAction {
    name: &'static str,
    invoke: Arc<dyn Fn(&mut Context) + Send + Sync>,
}

impl BoundAction {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run `prepare`, the action and `finish`.
    pub fn invoke(&self, ctx: &mut Context) {
        (self.invoke)(ctx);
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Outcome of auto-route resolution.
#[derive(Debug)]
pub struct AutoTarget<'a> {
    pub action: &'a BoundAction,
    /// Segments after the action name, bound as `p0`, `p1`, ...
    pub extra: Vec<&'a str>,
}

/// A controller instance shared by every request it serves, with its action
/// table indexed by normalized name.
pub struct ControllerBinding {
    name: &'static str,
    segment: String,
    default_action: Option<String>,
    actions: HashMap<String, BoundAction>,
}

impl ControllerBinding {
    /// Bind `controller` and index its actions.
    ///
    /// # Errors
    ///
    /// [`ConfigError::DuplicateAction`] if two actions normalize to the same
    /// name, [`ConfigError::UnknownAction`] if the default action is not one
    /// of them.
    pub fn new<C: Controller>(controller: C) -> Result<Self, ConfigError> {
        let name = controller.controller_name();
        let default_action = controller.default_action().map(normalize_action);
        let controller = Arc::new(controller);

        let mut actions = HashMap::new();
        for (action_name, method) in controller.actions() {
            let key = normalize_action(action_name);
            let bound_controller = Arc::clone(&controller);
            let bound = BoundAction {
                name: action_name,
                invoke: Arc::new(move |ctx: &mut Context| {
                    run_lifecycle(bound_controller.as_ref(), method, ctx)
                }),
            };
            if actions.insert(key.clone(), bound).is_some() {
                return Err(ConfigError::DuplicateAction {
                    controller: name.to_string(),
                    action: key,
                });
            }
        }

        if let Some(default) = &default_action {
            if !actions.contains_key(default) {
                return Err(ConfigError::UnknownAction {
                    controller: name.to_string(),
                    action: default.clone(),
                });
            }
        }

        Ok(Self {
            name,
            segment: route_segment(name),
            default_action,
            actions,
        })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Path segment auto-routing mounts this controller at.
    #[must_use]
    pub fn route_segment(&self) -> &str {
        &self.segment
    }

    /// Look up an action by name (normalized).
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&BoundAction> {
        self.actions.get(&normalize_action(name))
    }

    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.action(name).is_some()
    }

    /// Action names, sorted.
    #[must_use]
    pub fn action_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.actions.values().map(|a| a.name).collect();
        names.sort_unstable();
        names
    }

    /// Check every action a mapping names exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownAction`] for the first missing action.
    pub fn check_mapping(&self, mapping: &MethodMapping) -> Result<(), ConfigError> {
        match mapping.action_names().find(|a| !self.has_action(a)) {
            Some(missing) => Err(ConfigError::UnknownAction {
                controller: self.name.to_string(),
                action: missing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Resolve an auto-routed request.
    ///
    /// `rest` is what followed the controller segment (`list/1/2`), if
    /// anything. With no rest, the default action is used, falling back to
    /// the action named after the request method.
    #[must_use]
    pub fn resolve_auto<'a>(&'a self, method: &Method, rest: Option<&'a str>) -> Option<AutoTarget<'a>> {
        let mut segments = rest.unwrap_or_default().split('/').filter(|s| !s.is_empty());
        let action = match segments.next() {
            Some(name) => self.action(name)?,
            None => match &self.default_action {
                Some(default) => self.actions.get(default)?,
                None => self.action(method.as_str())?,
            },
        };
        Some(AutoTarget {
            action,
            extra: segments.collect(),
        })
    }
}

impl fmt::Debug for ControllerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerBinding")
            .field("name", &self.name)
            .field("segment", &self.segment)
            .field("actions", &self.action_names())
            .finish()
    }
}
