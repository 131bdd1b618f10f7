//! Transport adapter: serves a [`Dispatcher`](crate::Dispatcher) over HTTP/1.1
//! with `may_minihttp`, one coroutine per connection.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::{write_json_error, write_output};
pub use service::{health_endpoint, AppService};
