use http::Method;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{Context, HeaderVec};

/// Build a [`Context`] from a `may_minihttp::Request`.
///
/// Header names are lower-cased; the query string is split off the path and
/// parsed by [`Context::from_parts`]. The body is read in full.
///
/// # Errors
///
/// Returns the invalid method error if the request line carries a method
/// token that is not valid HTTP.
pub fn parse_request(req: Request) -> Result<Context, http::method::InvalidMethod> {
    let method = Method::from_bytes(req.method().as_bytes())?;
    let uri = req.path().to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    debug!(
        method = %method,
        uri = %uri,
        header_count = headers.len(),
        "Headers extracted"
    );

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(method = %method, uri = %uri, error = %e, "Request body read failed");
        body.clear();
    } else if !body.is_empty() {
        debug!(body_size_bytes = body.len(), "Request body read");
    }

    Ok(Context::from_parts(method, &uri, headers, body))
}
