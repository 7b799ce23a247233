//! Route table: ordered path patterns resolved to handlers.
//!
//! Resolution is a pure function of the registered table and the input
//! path. First registered match wins, so literal routes must be
//! registered before any parameterized pattern that could also match
//! them. There is no catch-all: a path matching nothing resolves to
//! `None`, which callers render as their 404-equivalent view.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

/// Invalid capture constraint supplied at registration time.
#[derive(Debug, Error)]
#[error("invalid route pattern: {0}")]
pub struct PatternError(#[from] regex::Error);

/// A single segment of a parameterized pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Matches this text exactly.
    Literal(String),
    /// Named capture with an anchored constraint, optionally behind a
    /// static prefix (the `@` of profile handles). The captured value is
    /// the text after the prefix, verbatim.
    Param {
        /// Static prefix the segment must start with.
        prefix: String,
        /// Capture name.
        name: String,
        /// Anchored constraint on the captured value.
        constraint: Regex,
    },
}

impl Segment {
    /// A segment matching `text` exactly.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        Self::Literal(text.to_owned())
    }

    /// A named capture constrained by `pattern` (anchored automatically).
    ///
    /// # Errors
    ///
    /// Returns `PatternError` if `pattern` is not a valid regex.
    pub fn param(name: &str, pattern: &str) -> Result<Self, PatternError> {
        Self::prefixed_param("", name, pattern)
    }

    /// A named capture behind a static prefix, e.g. the `@` of
    /// `/@handle`.
    ///
    /// # Errors
    ///
    /// Returns `PatternError` if `pattern` is not a valid regex.
    pub fn prefixed_param(prefix: &str, name: &str, pattern: &str) -> Result<Self, PatternError> {
        let constraint = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self::Param {
            prefix: prefix.to_owned(),
            name: name.to_owned(),
            constraint,
        })
    }
}

/// A registered path pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches the whole path exactly.
    Literal(String),
    /// Matches segment by segment.
    Segments(Vec<Segment>),
}

impl Pattern {
    /// An exact-path pattern.
    #[must_use]
    pub fn literal(path: &str) -> Self {
        Self::Literal(path.to_owned())
    }

    /// A segment-by-segment pattern.
    #[must_use]
    pub const fn segments(segments: Vec<Segment>) -> Self {
        Self::Segments(segments)
    }
}

/// Parameters captured during resolution.
///
/// Values are extracted verbatim, never type-coerced; constraints are the
/// pattern's job, not the handler's. Query parameters ride along once the
/// navigation layer splits them off the target.
#[derive(Debug, Clone, Default)]
pub struct Params {
    path: String,
    named: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl Params {
    /// The path that matched.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A named capture from the pattern.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// A query-string parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub(crate) fn set_query(&mut self, query: HashMap<String, String>) {
        self.query = query;
    }
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct RouteMatch<H> {
    /// The registered handler.
    pub handler: H,
    /// Captured parameters.
    pub params: Params,
}

/// An ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<(Pattern, H)>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H: Clone> RouteTable<H> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern. Matching order is registration order.
    pub fn register(&mut self, pattern: Pattern, handler: H) {
        self.routes.push((pattern, handler));
    }

    /// Resolve a path. `None` is the NotFound result.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<H>> {
        self.routes.iter().find_map(|(pattern, handler)| {
            match_pattern(pattern, path).map(|named| RouteMatch {
                handler: handler.clone(),
                params: Params {
                    path: path.to_owned(),
                    named,
                    query: HashMap::new(),
                },
            })
        })
    }
}

fn match_pattern(pattern: &Pattern, path: &str) -> Option<HashMap<String, String>> {
    match pattern {
        Pattern::Literal(expected) => (expected == path).then(HashMap::new),
        Pattern::Segments(segments) => {
            let rest = path.strip_prefix('/')?;
            let parts: Vec<&str> = rest.split('/').collect();
            if parts.len() != segments.len() {
                return None;
            }

            let mut named = HashMap::new();
            for (segment, part) in segments.iter().zip(&parts) {
                match segment {
                    Segment::Literal(text) => {
                        if text != part {
                            return None;
                        }
                    }
                    Segment::Param {
                        prefix,
                        name,
                        constraint,
                    } => {
                        let value = part.strip_prefix(prefix.as_str())?;
                        if !constraint.is_match(value) {
                            return None;
                        }
                        named.insert(name.clone(), value.to_owned());
                    }
                }
            }
            Some(named)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_table() -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        table.register(Pattern::literal("/"), "home");
        table.register(Pattern::literal("/login"), "login");
        table.register(
            Pattern::segments(vec![
                Segment::prefixed_param("@", "username", "[A-Za-z0-9_]{3,20}").unwrap(),
            ]),
            "profile",
        );
        table.register(
            Pattern::segments(vec![
                Segment::prefixed_param("@", "username", "[A-Za-z0-9_]{3,20}").unwrap(),
                Segment::param("slug", "[a-z0-9-]{1,50}").unwrap(),
            ]),
            "site",
        );
        table
    }

    #[test]
    fn test_literal_match() {
        let table = sample_table();
        assert_eq!(table.resolve("/").unwrap().handler, "home");
        assert_eq!(table.resolve("/login").unwrap().handler, "login");
    }

    #[test]
    fn test_param_extraction_verbatim() {
        let table = sample_table();

        let matched = table.resolve("/@alice").unwrap();
        assert_eq!(matched.handler, "profile");
        assert_eq!(matched.params.get("username"), Some("alice"));

        let matched = table.resolve("/@Alice_99/my-site").unwrap();
        assert_eq!(matched.handler, "site");
        // Extracted exactly as written, no coercion or lowercasing.
        assert_eq!(matched.params.get("username"), Some("Alice_99"));
        assert_eq!(matched.params.get("slug"), Some("my-site"));
        assert_eq!(matched.params.path(), "/@Alice_99/my-site");
    }

    #[test]
    fn test_constraints_enforced_by_pattern() {
        let table = sample_table();
        // Too short for the handle constraint.
        assert!(table.resolve("/@ab").is_none());
        // Uppercase slug violates the slug constraint.
        assert!(table.resolve("/@alice/My-Site").is_none());
        // Missing @ prefix.
        assert!(table.resolve("/alice").is_none());
    }

    #[test]
    fn test_no_catch_all() {
        let table = sample_table();
        assert!(table.resolve("/nowhere/at/all").is_none());
        assert!(table.resolve("").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut table = RouteTable::new();
        table.register(
            Pattern::segments(vec![Segment::param("anything", "[a-z]+").unwrap()]),
            "loose",
        );
        // Registered after a pattern that also matches it, so it is
        // shadowed.
        table.register(Pattern::literal("/studio"), "studio");

        assert_eq!(table.resolve("/studio").unwrap().handler, "loose");
    }

    #[test]
    fn test_invalid_constraint_rejected() {
        assert!(Segment::param("broken", "[unclosed").is_err());
    }
}
