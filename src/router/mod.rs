//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! - [`pattern`] parses route patterns (`/user/:id`, `/static/*`)
//! - [`Tree`] stores route entries by path segment and matches requests
//!   with literal > parameter > wildcard precedence and backtracking
//! - [`Router`] is the registry namespaces are compiled into
//!
//! ## Example
//!
//! ```rust,ignore
//! use nsrouter::{Namespace, Router};
//! use nsrouter::router::Lookup;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_namespace(Namespace::new("/v1").get("/user/:id", |ctx| {
//!     let id = ctx.param(":id").unwrap_or_default().to_string();
//!     ctx.write(id);
//! }))?;
//!
//! if let Lookup::Matched(m) = router.route(&Method::GET, "/v1/user/123") {
//!     assert_eq!(m.param("id"), Some("123"));
//! }
//! ```

mod core;
pub mod pattern;
mod route;
mod tree;

pub use core::{ParamVec, RouteSummary, Router, MAX_INLINE_PARAMS};
pub use pattern::{RoutePattern, Segment, SPLAT};
pub use route::{Action, HandlerFn, MethodSet, RouteEntry, STANDARD_METHODS};
pub use tree::{Gate, Lookup, RouteMatch, Tree};
