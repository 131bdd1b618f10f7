use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::warn;

use super::request::parse_request;
use super::response::{write_json_error, write_output};
use crate::dispatcher::Dispatcher;

/// `may_minihttp` service serving a [`Dispatcher`].
///
/// One clone runs per connection; they all share the dispatcher, and through
/// it the router.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
    health_path: Option<&'static str>,
}

impl AppService {
    /// Serve `dispatcher`, answering `GET /health` before routing.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            health_path: Some("/health"),
        }
    }

    /// Leave every path, `/health` included, to the router.
    #[must_use]
    pub fn without_health(mut self) -> Self {
        self.health_path = None;
        self
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    res.status_code(200, "OK");
    res.header("Content-Type: application/json");
    res.body_vec(json!({ "status": "ok" }).to_string().into_bytes());
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        if let Some(health) = self.health_path {
            if req.method() == "GET" && req.path() == health {
                return health_endpoint(res);
            }
        }

        let method = req.method().to_string();
        let mut ctx = match parse_request(req) {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(method = %method, error = %e, "Rejected request with invalid method");
                write_json_error(
                    res,
                    400,
                    &json!({ "error": "Bad Request", "method": method }),
                );
                return Ok(());
            }
        };

        self.dispatcher.dispatch(&mut ctx);
        write_output(res, &ctx.output);
        Ok(())
    }
}
