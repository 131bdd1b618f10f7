use std::fmt;

/// Configuration error raised while building or registering namespaces.
///
/// Returned by [`Router::add_namespace`](crate::router::Router::add_namespace).
/// These are startup failures: a namespace that fails to compile is not
/// registered at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A route pattern segment could not be parsed (e.g. `:` with no name).
    MalformedPattern {
        /// The full pattern as declared
        pattern: String,
        /// Why it was rejected
        reason: &'static str,
    },
    /// The same parameter name appears twice in one pattern.
    DuplicateParam {
        /// The full pattern as declared
        pattern: String,
        /// The repeated name
        name: String,
    },
    /// A wildcard segment is followed by further segments.
    WildcardNotLast {
        /// The full pattern as declared
        pattern: String,
    },
    /// A route ends at the same tree position as an existing one but binds
    /// different capture names (`/users/:id` against `/users/:uid`).
    ConflictingRoute {
        /// The pattern being registered
        pattern: String,
        /// The pattern already holding that position
        existing: String,
    },
    /// A controller mapping string contains no `method:action` pairs.
    EmptyMapping,
    /// A `method:action` pair could not be parsed.
    MalformedMapping {
        /// The offending pair
        pair: String,
    },
    /// A method token in a mapping is not an HTTP method.
    UnknownMethod {
        /// The offending token
        method: String,
    },
    /// Two controller methods normalize to the same action name.
    DuplicateAction {
        /// Controller the actions belong to
        controller: String,
        /// Normalized action name
        action: String,
    },
    /// A mapping names an action the controller does not expose.
    UnknownAction {
        /// Controller the mapping targets
        controller: String,
        /// Action named in the mapping
        action: String,
    },
    /// A filter position string is not one of the known positions.
    UnknownFilterPosition {
        /// The offending string
        position: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MalformedPattern { pattern, reason } => {
                write!(f, "route pattern '{pattern}' is malformed: {reason}")
            }
            ConfigError::DuplicateParam { pattern, name } => {
                write!(
                    f,
                    "route pattern '{pattern}' binds parameter ':{name}' more than once"
                )
            }
            ConfigError::WildcardNotLast { pattern } => {
                write!(
                    f,
                    "route pattern '{pattern}' has a wildcard that is not the last segment"
                )
            }
            ConfigError::ConflictingRoute { pattern, existing } => {
                write!(
                    f,
                    "route pattern '{pattern}' conflicts with '{existing}': same position, different parameter names"
                )
            }
            ConfigError::EmptyMapping => {
                write!(f, "controller mapping contains no method:action pairs")
            }
            ConfigError::MalformedMapping { pair } => {
                write!(
                    f,
                    "controller mapping pair '{pair}' is malformed; expected <method>:<action>"
                )
            }
            ConfigError::UnknownMethod { method } => {
                write!(f, "'{method}' is not an HTTP method")
            }
            ConfigError::DuplicateAction { controller, action } => {
                write!(
                    f,
                    "controller '{controller}' exposes action '{action}' more than once"
                )
            }
            ConfigError::UnknownAction { controller, action } => {
                write!(
                    f,
                    "controller '{controller}' has no action '{action}'"
                )
            }
            ConfigError::UnknownFilterPosition { position } => {
                write!(
                    f,
                    "unknown filter position '{position}'; expected before, before_exec or after"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
