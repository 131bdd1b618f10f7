//! Namespace compilation: prefix concatenation, condition accumulation and
//! pattern validation, ahead of any tree insertion.

use std::sync::Arc;

use super::Namespace;
use crate::error::ConfigError;
use crate::filter::{Condition, FilterEntry};
use crate::router::{pattern, RouteEntry, RoutePattern};

/// A fully validated namespace, ready to insert.
#[derive(Debug)]
pub(crate) struct CompiledNamespace {
    /// Normalized prefix of the top-level namespace
    pub(crate) prefix: String,
    pub(crate) routes: Vec<RouteEntry>,
    /// Filters with the scope node they attach to, enclosing before nested
    pub(crate) filters: Vec<(RoutePattern, FilterEntry)>,
}

pub(super) fn compile(ns: Namespace) -> Result<CompiledNamespace, ConfigError> {
    let prefix = RoutePattern::parse(&ns.prefix)?.to_string();
    let mut out = CompiledNamespace {
        prefix,
        routes: Vec::new(),
        filters: Vec::new(),
    };
    compile_into(ns, "", &[], &mut out)?;
    Ok(out)
}

fn compile_into(
    ns: Namespace,
    parent_prefix: &str,
    inherited: &[Condition],
    out: &mut CompiledNamespace,
) -> Result<(), ConfigError> {
    if let Some(err) = ns.errors.into_iter().next() {
        return Err(err);
    }

    let scope = RoutePattern::parse(&pattern::join(parent_prefix, &ns.prefix))?;
    let prefix = scope.as_str().to_string();

    let mut conditions: Vec<Condition> = inherited.to_vec();
    conditions.extend(ns.conditions);
    let shared: Arc<[Condition]> = Arc::from(conditions.clone());
    let namespace: Arc<str> = Arc::from(prefix.as_str());

    for (position, filter) in ns.filters {
        let entry = FilterEntry::new(position, &prefix, filter);
        out.filters.push((scope.clone(), entry));
    }

    for decl in ns.routes {
        let pattern = RoutePattern::parse(&pattern::join(&prefix, &decl.pattern))?;
        out.routes.push(RouteEntry {
            pattern,
            methods: decl.methods,
            action: decl.action,
            conditions: Arc::clone(&shared),
            namespace: Arc::clone(&namespace),
        });
    }

    for child in ns.children {
        compile_into(child, &prefix, &conditions, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::filter::FilterPosition;

    #[test]
    fn test_prefixes_and_conditions_compose() {
        let ns = Namespace::new("/v1")
            .cond(|_: &Context| true)
            .filter(FilterPosition::BeforeRouter, |_: &mut Context| {})
            .get("/user", |_: &mut Context| {})
            .namespace(
                Namespace::new("/admin/")
                    .cond(|_: &Context| true)
                    .filter(FilterPosition::AfterExec, |_: &mut Context| {})
                    .get("order", |_: &mut Context| {}),
            );

        let compiled = compile(ns).unwrap();
        assert_eq!(compiled.prefix, "/v1");

        let patterns: Vec<&str> = compiled.routes.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/v1/user", "/v1/admin/order"]);
        assert_eq!(compiled.routes[0].conditions.len(), 1);
        assert_eq!(compiled.routes[1].conditions.len(), 2);
        assert_eq!(compiled.routes[1].namespace.as_ref(), "/v1/admin");

        let scopes: Vec<&str> = compiled.filters.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(scopes, vec!["/v1", "/v1/admin"]);
    }

    #[test]
    fn test_first_recorded_error_wins() {
        let ns = Namespace::new("/v1")
            .filter_at("sometimes", |_: &mut Context| {})
            .get("/user/:", |_: &mut Context| {});
        assert!(matches!(
            compile(ns),
            Err(ConfigError::UnknownFilterPosition { .. })
        ));
    }

    #[test]
    fn test_bad_pattern_in_child_fails_whole_namespace() {
        let ns = Namespace::new("/v1")
            .get("/ok", |_: &mut Context| {})
            .namespace(Namespace::new("/shop").get("/*/x", |_: &mut Context| {}));
        assert!(matches!(
            compile(ns),
            Err(ConfigError::WildcardNotLast { .. })
        ));
    }
}
