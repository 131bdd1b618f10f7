//! Filters and conditions.
//!
//! A filter runs at one of three points of the dispatch chain:
//!
//! | Position | Runs | Short-circuits on write |
//! |---|---|---|
//! | [`FilterPosition::BeforeRouter`] | before route matching | yes |
//! | [`FilterPosition::BeforeExec`] | after matching, before the action | yes |
//! | [`FilterPosition::AfterExec`] | after the action returned | no |
//!
//! Filters are attached to the node of their namespace prefix, so they only
//! see requests under that prefix.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::context::Context;
use crate::error::ConfigError;

/// Where in the dispatch chain a filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPosition {
    BeforeRouter,
    BeforeExec,
    AfterExec,
}

impl FilterPosition {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterPosition::BeforeRouter => "before_router",
            FilterPosition::BeforeExec => "before_exec",
            FilterPosition::AfterExec => "after_exec",
        }
    }
}

impl fmt::Display for FilterPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" | "before_router" | "beforerouter" => Ok(FilterPosition::BeforeRouter),
            "before_exec" | "beforeexec" => Ok(FilterPosition::BeforeExec),
            "after" | "after_exec" | "afterexec" => Ok(FilterPosition::AfterExec),
            _ => Err(ConfigError::UnknownFilterPosition {
                position: s.to_string(),
            }),
        }
    }
}

/// A request filter.
///
/// Implemented for every `Fn(&mut Context) + Send + Sync`, so closures and
/// plain functions can be passed directly.
pub trait Filter: Send + Sync {
    fn call(&self, ctx: &mut Context);
}

impl<F> Filter for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn call(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// A namespace condition. Every route under the namespace is only eligible
/// while it returns `true`.
pub type Condition = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// A filter registered under a namespace prefix.
#[derive(Clone)]
pub struct FilterEntry {
    position: FilterPosition,
    scope: Arc<str>,
    filter: Arc<dyn Filter>,
}

impl FilterEntry {
    #[must_use]
    pub fn new(position: FilterPosition, scope: &str, filter: Arc<dyn Filter>) -> Self {
        Self {
            position,
            scope: Arc::from(scope),
            filter,
        }
    }

    #[must_use]
    pub fn position(&self) -> FilterPosition {
        self.position
    }

    /// Namespace prefix the filter was attached to.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn run(&self, ctx: &mut Context) {
        self.filter.call(ctx);
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("position", &self.position)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Run the filters at `position` in order.
///
/// For the `before` positions, stops as soon as a filter has written a
/// response body and returns `true`. `AfterExec` filters always all run.
pub fn run_filters(
    filters: &[Arc<FilterEntry>],
    position: FilterPosition,
    ctx: &mut Context,
) -> bool {
    let stops = position != FilterPosition::AfterExec;
    for filter in filters.iter().filter(|f| f.position == position) {
        filter.run(ctx);
        if stops && ctx.output.is_written() {
            debug!(
                request_id = %ctx.request_id,
                position = %position,
                scope = %filter.scope,
                status = ctx.output.status(),
                "Filter short-circuited request"
            );
            return true;
        }
    }
    false
}
