//! # CLI Module
//!
//! Command-line interface of the `nsrouter` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve the demo application (echo namespace and sample controller):
//!
//! ```bash
//! nsrouter serve --addr 127.0.0.1:8080
//! ```
//!
//! The address defaults to `NSR_ADDR`, then `0.0.0.0:8080`. Coroutine stack
//! size comes from `NSR_STACK_SIZE`; logging from the `NSR_LOG_*` variables
//! (see [`crate::logging`]).
//!
//! ### `routes`
//!
//! Print the demo application's routing table and exit:
//!
//! ```bash
//! nsrouter routes
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
