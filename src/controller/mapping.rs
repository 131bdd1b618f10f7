//! Method-to-action mapping strings.
//!
//! Grammar: `<methods>:<action>[;<methods>:<action>...]` where `<methods>` is
//! `*` or a comma-separated list of method names (case-insensitive), e.g.
//! `"*:List"`, `"get,post:Save;delete:Remove"`.

use http::Method;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::router::STANDARD_METHODS;

/// Methods a mapping may name. `TRACE` and `CONNECT` are accepted on top of
/// the standard set.
const KNOWN_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::TRACE,
    Method::CONNECT,
];

/// Parsed mapping from request method to controller action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMapping {
    by_method: Vec<(Method, String)>,
    fallback: Option<String>,
}

fn parse_method(token: &str) -> Result<Method, ConfigError> {
    let upper = token.to_ascii_uppercase();
    KNOWN_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownMethod {
            method: token.to_string(),
        })
}

impl MethodMapping {
    /// Parse a mapping string.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyMapping`] if there are no pairs
    /// - [`ConfigError::MalformedMapping`] for a pair without `:` or with an
    ///   empty side
    /// - [`ConfigError::UnknownMethod`] for a token that is not a method
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut mapping = MethodMapping {
            by_method: Vec::new(),
            fallback: None,
        };

        for pair in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let malformed = || ConfigError::MalformedMapping {
                pair: pair.to_string(),
            };
            let (methods, action) = pair.split_once(':').ok_or_else(malformed)?;
            let (methods, action) = (methods.trim(), action.trim());
            if methods.is_empty() || action.is_empty() {
                return Err(malformed());
            }
            for token in methods.split(',').map(str::trim) {
                if token == "*" {
                    mapping.fallback = Some(action.to_string());
                } else if token.is_empty() {
                    return Err(malformed());
                } else {
                    let method = parse_method(token)?;
                    mapping.by_method.retain(|(m, _)| *m != method);
                    mapping.by_method.push((method, action.to_string()));
                }
            }
        }

        if mapping.by_method.is_empty() && mapping.fallback.is_none() {
            return Err(ConfigError::EmptyMapping);
        }
        Ok(mapping)
    }

    /// REST convention: each standard method maps to the action of the same
    /// name, keeping only the ones `has_action` accepts.
    #[must_use]
    pub fn rest(has_action: impl Fn(&str) -> bool) -> Self {
        let by_method = STANDARD_METHODS
            .iter()
            .filter(|m| has_action(m.as_str()))
            .map(|m| (m.clone(), m.as_str().to_string()))
            .collect();
        MethodMapping {
            by_method,
            fallback: None,
        }
    }

    /// The action for `method`: an explicit entry wins over `*`.
    #[must_use]
    pub fn action_for(&self, method: &Method) -> Option<&str> {
        self.by_method
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, a)| a.as_str())
            .or(self.fallback.as_deref())
    }

    /// Methods this mapping answers. A `*` entry contributes the standard set.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        let wildcard: &[Method] = if self.fallback.is_some() {
            &STANDARD_METHODS
        } else {
            &STANDARD_METHODS[..0]
        };
        self.by_method.iter().map(|(m, _)| m).chain(wildcard.iter())
    }

    /// Every action name mentioned.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.by_method
            .iter()
            .map(|(_, a)| a.as_str())
            .chain(self.fallback.as_deref())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty() && self.fallback.is_none()
    }
}

impl FromStr for MethodMapping {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MethodMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (m, a) in &self.by_method {
            if !first {
                f.write_str(";")?;
            }
            first = false;
            write!(f, "{}:{a}", m.as_str().to_ascii_lowercase())?;
        }
        if let Some(a) = &self.fallback {
            if !first {
                f.write_str(";")?;
            }
            write!(f, "*:{a}")?;
        }
        Ok(())
    }
}
