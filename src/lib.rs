//! # nsrouter
//!
//! **nsrouter** is a namespace-oriented HTTP request router served on the
//! `may` coroutine runtime.
//!
//! ## Overview
//!
//! Applications declare [`Namespace`]s: groups of routes under a common path
//! prefix, with filters that run around them and conditions that decide
//! whether they are active for a request. Namespaces nest. Registering one
//! with [`Router::add_namespace`] compiles it into a prefix tree; a
//! [`Dispatcher`] then runs each request through the chain
//!
//! ```text
//! BeforeRouter filters → route match (conditions gate entries)
//!     → BeforeExec filters → action → AfterExec filters
//! ```
//!
//! and always leaves a response on the [`Context`]: the action's, a
//! short-circuiting filter's, or a 404 / 405 / 500.
//!
//! ## Architecture
//!
//! - **[`router`]** - route patterns, the prefix tree and the [`Router`] registry
//! - **[`namespace`]** - the namespace builder and `ns_*` options
//! - **[`filter`]** - filter positions, filters and conditions
//! - **[`controller`]** - controllers, action tables and mapping strings
//! - **[`dispatcher`]** - the per-request chain
//! - **[`server`]** - `may_minihttp` adapter
//! - **[`logging`]**, **[`runtime_config`]**, **[`cli`]** - the binary's ambient setup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nsrouter::{controller, Context, Dispatcher, Namespace, Router};
//!
//! #[derive(Default)]
//! pub struct TestController;
//!
//! #[controller]
//! impl TestController {
//!     pub fn list(&self, ctx: &mut Context) {
//!         ctx.write("i am list");
//!     }
//! }
//!
//! let ns = Namespace::new("/v1")
//!     .cond(|ctx| ctx.domain() == "api.example.com")
//!     .get("/user/:id", |ctx| {
//!         let id = ctx.param("id").unwrap_or_default().to_string();
//!         ctx.write(id);
//!     })
//!     .router("/list", TestController, "*:List");
//!
//! let mut router = Router::new();
//! router.add_namespace(ns)?;
//! let dispatcher = Dispatcher::new(router);
//!
//! let mut ctx = Context::new(http::Method::GET, "/v1/list").with_host("api.example.com");
//! dispatcher.dispatch(&mut ctx);
//! assert_eq!(ctx.output.text(), "i am list");
//! ```
//!
//! ## Runtime Considerations
//!
//! The server runs one `may` coroutine per connection. Handlers execute on
//! those coroutines, so the stack size (`NSR_STACK_SIZE`) bounds how deep a
//! handler may recurse.

// lets #[controller] expand to `::nsrouter::...` inside this crate too
extern crate self as nsrouter;

pub mod cli;
pub mod context;
pub mod controller;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod filter;
pub mod ids;
pub mod logging;
pub mod namespace;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use context::{Context, Input, Output};
pub use controller::{ActionMethod, Controller, MethodMapping};
pub use dispatcher::{Dispatcher, Outcome};
pub use error::ConfigError;
pub use filter::{Condition, Filter, FilterPosition};
pub use ids::RequestId;
pub use namespace::{Namespace, NsOption};
pub use nsrouter_macros::controller;
pub use router::{Lookup, MethodSet, Router};
