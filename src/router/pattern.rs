//! Route pattern parsing.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! - `user` matches the literal segment `user`
//! - `:id` matches exactly one segment and binds it as `id`
//! - `*` or `*path` matches one or more trailing segments and binds them
//!   (joined with `/`) as `splat` or `path`
//!
//! Empty segments are ignored, so `/user/`, `user` and `//user` are the same
//! pattern, and `/` is the root.

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// Capture name used for an unnamed wildcard (`*`).
pub const SPLAT: &str = "splat";

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param(Arc<str>),
    Wildcard(Arc<str>),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(s) => f.write_str(s),
            Segment::Param(name) => write!(f, ":{name}"),
            Segment::Wildcard(name) if name.as_ref() == SPLAT => f.write_str("*"),
            Segment::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// A validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
    /// Capture names in path order (params, then the wildcard if any)
    captures: Vec<Arc<str>>,
    normalized: String,
}

fn valid_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl RoutePattern {
    /// Parse and validate a pattern.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MalformedPattern`] for a nameless or badly named parameter
    /// - [`ConfigError::WildcardNotLast`] if anything follows a wildcard
    /// - [`ConfigError::DuplicateParam`] if a capture name repeats
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let malformed = |reason| ConfigError::MalformedPattern {
            pattern: raw.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut captures: Vec<Arc<str>> = Vec::new();
        let mut seen_wildcard = false;

        for part in split_path(raw) {
            if seen_wildcard {
                return Err(ConfigError::WildcardNotLast {
                    pattern: raw.to_string(),
                });
            }
            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(malformed("parameter segment has no name"));
                }
                if !valid_name(name) {
                    return Err(malformed("parameter names may only use [A-Za-z0-9_-]"));
                }
                Segment::Param(Arc::from(name))
            } else if let Some(name) = part.strip_prefix('*') {
                if !valid_name(name) {
                    return Err(malformed("wildcard names may only use [A-Za-z0-9_-]"));
                }
                seen_wildcard = true;
                let name = if name.is_empty() { SPLAT } else { name };
                Segment::Wildcard(Arc::from(name))
            } else {
                Segment::Static(part.to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if captures.iter().any(|c| c == name) {
                    return Err(ConfigError::DuplicateParam {
                        pattern: raw.to_string(),
                        name: name.to_string(),
                    });
                }
                captures.push(Arc::clone(name));
            }
            segments.push(segment);
        }

        let normalized = if segments.is_empty() {
            "/".to_string()
        } else {
            segments.iter().fold(String::new(), |mut acc, s| {
                acc.push('/');
                acc.push_str(&s.to_string());
                acc
            })
        };

        Ok(Self {
            segments,
            captures,
            normalized,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Capture names in the order the tree binds them.
    #[must_use]
    pub fn capture_names(&self) -> &[Arc<str>] {
        &self.captures
    }

    /// Whether both patterns end at the same tree node: equal literals, and
    /// parameters and wildcards in the same places whatever their names.
    #[must_use]
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Static(a), Segment::Static(b)) => a == b,
                    (Segment::Param(_), Segment::Param(_))
                    | (Segment::Wildcard(_), Segment::Wildcard(_)) => true,
                    _ => false,
                })
    }

    /// Normalized textual form (`/v1/user/:id`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Split a request path or pattern into its non-empty segments.
#[must_use]
pub fn split_path(path: &str) -> SmallVec<[&str; 16]> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Concatenate a prefix and a pattern with exactly one `/` between them.
#[must_use]
pub fn join(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let pattern = pattern.trim_start_matches('/');
    if pattern.is_empty() {
        if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }
    } else {
        format!("{prefix}/{pattern}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_segments() {
        let p = RoutePattern::parse("/v1/user/:id/files/*").unwrap();
        assert_eq!(p.segments().len(), 5);
        assert_eq!(p.as_str(), "/v1/user/:id/files/*");
        let names: Vec<&str> = p.capture_names().iter().map(|n| n.as_ref()).collect();
        assert_eq!(names, vec!["id", "splat"]);
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let a = RoutePattern::parse("//v1///user/").unwrap();
        let b = RoutePattern::parse("/v1/user").unwrap();
        assert_eq!(a, b);
        assert_eq!(RoutePattern::parse("").unwrap().as_str(), "/");
        assert_eq!(RoutePattern::parse("/").unwrap().as_str(), "/");
    }

    #[test]
    fn test_named_wildcard() {
        let p = RoutePattern::parse("/static/*filepath").unwrap();
        assert_eq!(p.capture_names()[0].as_ref(), "filepath");
        assert_eq!(p.as_str(), "/static/*filepath");
    }

    #[test]
    fn test_wildcard_must_be_last() {
        let err = RoutePattern::parse("/files/*/meta").unwrap_err();
        assert!(matches!(err, ConfigError::WildcardNotLast { .. }));
    }

    #[test]
    fn test_nameless_param_rejected() {
        let err = RoutePattern::parse("/user/:").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPattern { .. }));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let err = RoutePattern::parse("/org/:id/user/:id").unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateParam {
                pattern: "/org/:id/user/:id".into(),
                name: "id".into(),
            }
        );
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/v1", "/user"), "/v1/user");
        assert_eq!(join("/v1/", "user"), "/v1/user");
        assert_eq!(join("/v1", ""), "/v1");
        assert_eq!(join("", "/"), "/");
        assert_eq!(join("", "/admin"), "/admin");
    }
}
