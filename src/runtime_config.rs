//! # Runtime Configuration
//!
//! Environment-based configuration for the coroutine runtime and server.
//!
//! ## `NSR_STACK_SIZE`
//!
//! Stack size for connection coroutines. Decimal (`16384`) or hexadecimal
//! (`0x4000`). Default `0x4000` (16 KB). Handlers run on these stacks, so
//! deep call chains need more.
//!
//! ## `NSR_ADDR`
//!
//! Listen address for `nsrouter serve`. Default `0.0.0.0:8080`.

use std::env;

/// Default coroutine stack size (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Listen address
    pub addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

/// Parse a stack size in decimal or `0x` hex.
#[must_use]
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables; unparsable values fall
    /// back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            stack_size: lookup("NSR_STACK_SIZE")
                .and_then(|v| parse_stack_size(&v))
                .unwrap_or(defaults.stack_size),
            addr: lookup("NSR_ADDR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.addr),
        }
    }

    /// Apply to the `may` runtime. Call before starting the server.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stack_size() {
        assert_eq!(parse_stack_size("0x8000"), Some(0x8000));
        assert_eq!(parse_stack_size("32768"), Some(32768));
        assert_eq!(parse_stack_size("lots"), None);
    }

    #[test]
    fn test_from_lookup_defaults_and_overrides() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config, RuntimeConfig::default());

        let config = RuntimeConfig::from_lookup(|name| match name {
            "NSR_STACK_SIZE" => Some("0x10000".to_string()),
            "NSR_ADDR" => Some("127.0.0.1:9000".to_string()),
            _ => None,
        });
        assert_eq!(config.stack_size, 0x10000);
        assert_eq!(config.addr, "127.0.0.1:9000");

        let config = RuntimeConfig::from_lookup(|_| Some("garbage".to_string()));
        assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
        assert_eq!(config.addr, "garbage");
    }
}
