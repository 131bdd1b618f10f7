use may_minihttp::Response;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::warn;

use crate::context::Output;

/// Header lines above this many distinct values are dropped instead of leaked.
const MAX_INTERNED_HEADERS: usize = 4096;

/// `may_minihttp` only takes `&'static str` header lines. Distinct lines are
/// leaked once and reused, up to a fixed number of them.
struct HeaderLines {
    lines: Mutex<HashSet<&'static str>>,
    cap: usize,
}

impl HeaderLines {
    fn new(cap: usize) -> Self {
        Self {
            lines: Mutex::new(HashSet::new()),
            cap,
        }
    }

    /// `None` once `cap` distinct lines exist and `line` is not one of them.
    fn intern(&self, line: String) -> Option<&'static str> {
        let mut lines = self.lines.lock().ok()?;
        if let Some(existing) = lines.get(line.as_str()) {
            return Some(*existing);
        }
        if lines.len() >= self.cap {
            return None;
        }
        let leaked: &'static str = Box::leak(line.into_boxed_str());
        lines.insert(leaked);
        Some(leaked)
    }
}

static HEADER_LINES: Lazy<HeaderLines> = Lazy::new(|| HeaderLines::new(MAX_INTERNED_HEADERS));

/// Canonical reason phrase for a status code.
pub(crate) fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Copy a dispatched [`Output`] onto the wire response.
pub fn write_output(res: &mut Response, output: &Output) {
    res.status_code(usize::from(output.status()), status_reason(output.status()));
    let mut has_content_type = false;
    for (name, value) in output.headers() {
        has_content_type |= name.eq_ignore_ascii_case("content-type");
        match HEADER_LINES.intern(format!("{name}: {value}")) {
            Some(line) => {
                res.header(line);
            }
            None => warn!(
                header = %name,
                limit = MAX_INTERNED_HEADERS,
                "Response header dropped: too many distinct header lines"
            ),
        }
    }
    if !has_content_type && !output.body().is_empty() {
        res.header("Content-Type: text/plain; charset=utf-8");
    }
    res.body_vec(output.body().to_vec());
}

/// Write a JSON error body directly, bypassing the dispatcher.
pub fn write_json_error(res: &mut Response, status: u16, body: &serde_json::Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
