//! Prefix tree for route matching
//!
//! The tree is built by splitting patterns into segments. Each node has:
//! - literal children, matched by exact string comparison
//! - at most one parameter child (`:name`), matching any single segment
//! - at most one wildcard child (`*`), matching all remaining segments
//!
//! Route entries are stored at terminal nodes in registration order. Filters
//! are stored at the node of the namespace prefix they were attached to.
//!
//! ## Matching
//!
//! At each node the search tries the literal child first, then the parameter
//! child, then the wildcard child, and backtracks to the next alternative when
//! a branch yields no usable entry. Parameter names are not stored in the
//! tree: each entry binds the captured values with its own pattern's names, so
//! `/users/:user_id/posts` and `/users/:id/comments` coexist.
//!
//! Entries ending at the same node must agree on their capture names, so
//! `/users/:id` and `/users/:uid` cannot both be registered. Inserting the
//! second one fails with [`ConfigError::ConflictingRoute`].
//!
//! A caller-supplied gate may close an entry (failed condition, unresolvable
//! action). Closed entries are skipped as if absent. Open entries that match
//! the path but not the method are remembered so the lookup can report
//! `MethodNotAllowed` with the allowed set instead of `NotFound`.

use http::Method;
use smallvec::{smallvec, SmallVec};
use std::sync::Arc;

use super::core::{ParamVec, MAX_INLINE_PARAMS};
use super::pattern::{split_path, RoutePattern, Segment};
use super::route::RouteEntry;
use crate::error::ConfigError;
use crate::filter::FilterEntry;

/// Verdict of a gate on one candidate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Open,
    Closed,
}

/// A successful match.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<RouteEntry>,
    /// Captured values bound with the entry's parameter names
    pub params: ParamVec,
    /// Filters from the root down to the matched entry's node
    pub filters: Vec<Arc<FilterEntry>>,
}

impl RouteMatch {
    /// Get a bound parameter by name (last write wins).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of a tree lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Matched(RouteMatch),
    /// The path matched open entries, none of which answer the method.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

impl Lookup {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Lookup::Matched(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Capture<'p> {
    One(&'p str),
    Rest(&'p [&'p str]),
}

impl Capture<'_> {
    fn value(&self) -> String {
        match self {
            Capture::One(s) => (*s).to_string(),
            Capture::Rest(segs) => segs.join("/"),
        }
    }
}

struct Search<'p, 'g> {
    method: &'p Method,
    gate: &'g mut dyn FnMut(&RouteEntry, &ParamVec) -> Gate,
    captures: SmallVec<[Capture<'p>; MAX_INLINE_PARAMS]>,
    allowed: Vec<Method>,
    saw_open: bool,
}

struct Found<'t> {
    entry: Arc<RouteEntry>,
    params: ParamVec,
    /// Nodes on the matched path, leaf first
    nodes: SmallVec<[&'t Node; 16]>,
}

#[derive(Debug, Default)]
struct Node {
    segment: String,
    children: Vec<Node>,
    param_child: Option<Box<Node>>,
    wildcard_child: Option<Box<Node>>,
    routes: Vec<Arc<RouteEntry>>,
    filters: Vec<Arc<FilterEntry>>,
}

impl Node {
    fn with_segment(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Self::default()
        }
    }

    /// Walk (creating as needed) to the node for `segments`.
    fn descend_mut(&mut self, segments: &[Segment]) -> &mut Node {
        let Some((head, rest)) = segments.split_first() else {
            return self;
        };
        let next = match head {
            Segment::Static(s) => {
                let idx = match self.children.iter().position(|c| &c.segment == s) {
                    Some(idx) => idx,
                    None => {
                        self.children.push(Node::with_segment(s));
                        self.children.len() - 1
                    }
                };
                &mut self.children[idx]
            }
            Segment::Param(_) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::with_segment(":"))),
            Segment::Wildcard(_) => self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::with_segment("*"))),
        };
        next.descend_mut(rest)
    }

    /// Existing node for `segments`, if any.
    fn descend(&self, segments: &[Segment]) -> Option<&Node> {
        let Some((head, rest)) = segments.split_first() else {
            return Some(self);
        };
        let next = match head {
            Segment::Static(s) => self.children.iter().find(|c| &c.segment == s)?,
            Segment::Param(_) => self.param_child.as_deref()?,
            Segment::Wildcard(_) => self.wildcard_child.as_deref()?,
        };
        next.descend(rest)
    }

    /// Filters of every node whose prefix matches the start of `segs`,
    /// depth first with literal before parameter before wildcard.
    fn collect_scope(&self, segs: &[&str], out: &mut Vec<Arc<FilterEntry>>) {
        push_unique(out, &self.filters);
        let Some((head, rest)) = segs.split_first() else {
            return;
        };
        if let Some(child) = self.children.iter().find(|c| c.segment == *head) {
            child.collect_scope(rest, out);
        }
        if let Some(param) = &self.param_child {
            param.collect_scope(rest, out);
        }
        if let Some(wild) = &self.wildcard_child {
            push_unique(out, &wild.filters);
        }
    }

    fn visit_entries(&self, s: &mut Search<'_, '_>) -> Option<(Arc<RouteEntry>, ParamVec)> {
        for entry in &self.routes {
            let params: ParamVec = entry
                .pattern
                .capture_names()
                .iter()
                .zip(s.captures.iter())
                .map(|(name, cap)| (Arc::clone(name), cap.value()))
                .collect();
            if (s.gate)(&**entry, &params) == Gate::Closed {
                continue;
            }
            if entry.handles(s.method) {
                return Some((Arc::clone(entry), params));
            }
            s.saw_open = true;
            entry.collect_allowed(&mut s.allowed);
        }
        None
    }

    fn search<'t, 'p>(&'t self, segs: &'p [&'p str], s: &mut Search<'p, '_>) -> Option<Found<'t>> {
        let Some((head, rest)) = segs.split_first() else {
            let (entry, params) = self.visit_entries(s)?;
            return Some(Found {
                entry,
                params,
                nodes: smallvec![self],
            });
        };

        if let Some(child) = self.children.iter().find(|c| c.segment == *head) {
            if let Some(mut found) = child.search(rest, s) {
                found.nodes.push(self);
                return Some(found);
            }
        }

        if let Some(param) = &self.param_child {
            s.captures.push(Capture::One(*head));
            let found = param.search(rest, s);
            s.captures.pop();
            if let Some(mut found) = found {
                found.nodes.push(self);
                return Some(found);
            }
        }

        if let Some(wild) = &self.wildcard_child {
            s.captures.push(Capture::Rest(segs));
            let found = wild.visit_entries(s);
            s.captures.pop();
            if let Some((entry, params)) = found {
                return Some(Found {
                    entry,
                    params,
                    nodes: smallvec![wild.as_ref(), self],
                });
            }
        }

        None
    }

    fn collect_routes(&self, out: &mut Vec<Arc<RouteEntry>>) {
        out.extend(self.routes.iter().cloned());
        for child in &self.children {
            child.collect_routes(out);
        }
        if let Some(param) = &self.param_child {
            param.collect_routes(out);
        }
        if let Some(wild) = &self.wildcard_child {
            wild.collect_routes(out);
        }
    }
}

fn push_unique(out: &mut Vec<Arc<FilterEntry>>, filters: &[Arc<FilterEntry>]) {
    for f in filters {
        if !out.iter().any(|seen| Arc::ptr_eq(seen, f)) {
            out.push(Arc::clone(f));
        }
    }
}

fn conflict(entry: &RouteEntry, existing: &RouteEntry) -> Option<ConfigError> {
    (entry.pattern.capture_names() != existing.pattern.capture_names()).then(|| {
        ConfigError::ConflictingRoute {
            pattern: entry.pattern.to_string(),
            existing: existing.pattern.to_string(),
        }
    })
}

/// Prefix tree of route entries and scoped filters.
#[derive(Debug, Default)]
pub struct Tree {
    root: Node,
    len: usize,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of route entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an entry at the node for its pattern. Entries sharing a pattern
    /// are tried in insertion order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ConflictingRoute`] if entries already stored at that
    /// node bind different capture names. The tree is unchanged on error.
    pub fn insert(&mut self, entry: Arc<RouteEntry>) -> Result<(), ConfigError> {
        self.check(std::slice::from_ref(&entry))?;
        let node = self.root.descend_mut(entry.pattern.segments());
        node.routes.push(entry);
        self.len += 1;
        Ok(())
    }

    /// Check that `entries` could all be inserted, against the tree and
    /// against each other, without changing anything.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError::ConflictingRoute`] found.
    pub fn check(&self, entries: &[Arc<RouteEntry>]) -> Result<(), ConfigError> {
        for (i, entry) in entries.iter().enumerate() {
            let segments = entry.pattern.segments();
            if let Some(first) = self
                .root
                .descend(segments)
                .and_then(|node| node.routes.first())
            {
                if let Some(err) = conflict(entry, first) {
                    return Err(err);
                }
            }
            for earlier in &entries[..i] {
                if earlier.pattern.same_shape(&entry.pattern) {
                    if let Some(err) = conflict(entry, earlier) {
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Attach a filter at the node for `scope`.
    pub fn attach_filter(&mut self, scope: &RoutePattern, filter: Arc<FilterEntry>) {
        self.root.descend_mut(scope.segments()).filters.push(filter);
    }

    /// Match without a gate: every entry is open.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Lookup {
        self.find_with(method, path, &mut |_, _| Gate::Open)
    }

    /// Match with `gate` deciding, per candidate entry, whether it takes part.
    pub fn find_with(
        &self,
        method: &Method,
        path: &str,
        gate: &mut dyn FnMut(&RouteEntry, &ParamVec) -> Gate,
    ) -> Lookup {
        let segs = split_path(path);
        let mut search = Search {
            method,
            gate,
            captures: SmallVec::new(),
            allowed: Vec::new(),
            saw_open: false,
        };
        match self.root.search(&segs, &mut search) {
            Some(found) => {
                let filters = found
                    .nodes
                    .iter()
                    .rev()
                    .flat_map(|n| n.filters.iter().cloned())
                    .collect();
                Lookup::Matched(RouteMatch {
                    entry: found.entry,
                    params: found.params,
                    filters,
                })
            }
            None if search.saw_open => Lookup::MethodNotAllowed {
                allowed: search.allowed,
            },
            None => Lookup::NotFound,
        }
    }

    /// Filters of every node whose prefix matches the start of `path`, root
    /// first.
    ///
    /// Used before a route is chosen, so every structural branch is
    /// followed: a namespace's filters apply to any request its prefix
    /// matches, whichever route ends up answering it.
    #[must_use]
    pub fn scope_filters(&self, path: &str) -> Vec<Arc<FilterEntry>> {
        let segs = split_path(path);
        let mut out = Vec::new();
        self.root.collect_scope(&segs, &mut out);
        out
    }

    /// All entries, depth first (literal children before parameter and
    /// wildcard children).
    #[must_use]
    pub fn entries(&self) -> Vec<Arc<RouteEntry>> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect_routes(&mut out);
        out
    }
}
