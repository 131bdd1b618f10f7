//! # Dispatcher Module
//!
//! The dispatcher turns a request [`Context`](crate::Context) into a response
//! by running it through a [`Router`](crate::Router).
//!
//! ## Request Flow
//!
//! 1. `BeforeRouter` filters of every namespace prefix along the path run.
//!    A filter that writes a body ends the request.
//! 2. The router matches method and path. Entries whose namespace conditions
//!    fail, or auto routes naming an unknown action, are skipped.
//! 3. Path parameters are bound on the context.
//! 4. `BeforeExec` filters of the matched route's namespaces run; a write
//!    ends the request.
//! 5. The action runs: a handler, a mapped controller action, or an
//!    auto-routed controller action.
//! 6. `AfterExec` filters run and may rewrite the response.
//!
//! ## Error Handling
//!
//! Nothing escapes [`Dispatcher::dispatch`]:
//! - no matching path returns a 404 JSON body
//! - a path matched only for other methods returns 405 with an `Allow` header
//! - a panic in a filter or action is caught and returns a 500 JSON body;
//!   `AfterExec` filters do not run for that request
//!
//! ## Hot Swap
//!
//! The router sits behind an [`arc_swap::ArcSwap`]. [`Dispatcher::swap_router`]
//! replaces it atomically while requests keep being served.

mod core;

pub use core::{Dispatcher, Outcome};
