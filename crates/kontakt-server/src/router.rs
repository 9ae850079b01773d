//! Path routing.
//!
//! Path templates are split on `/` into literal segments, `{name}` segments
//! and at most one trailing `{name?}` segment that may be absent. Matched
//! parameter values are percent-decoded before they reach the pipeline.
//!
//! ```rust
//! use http::Method;
//! use kontakt_core::{HandlerResult, Reply, RouteSpec};
//! use kontakt_server::{RouteLookup, Router};
//!
//! let greet = RouteSpec::new(Method::GET, "/hello/{name?}", "greet", |_ctx, _req| async move {
//!     HandlerResult::Ok(Reply::text("hi"))
//! });
//! let router = Router::new(vec![greet]).unwrap();
//!
//! match router.lookup(&Method::GET, "/hello/J%C3%B3zef") {
//!     RouteLookup::Matched { params, .. } => assert_eq!(params["name"], "Józef"),
//!     _ => unreachable!(),
//! }
//! assert!(matches!(router.lookup(&Method::GET, "/hello"), RouteLookup::Matched { .. }));
//! assert!(matches!(router.lookup(&Method::POST, "/hello"), RouteLookup::MethodNotAllowed { .. }));
//! assert!(matches!(router.lookup(&Method::GET, "/nope"), RouteLookup::NotFound));
//! ```

use http::Method;
use kontakt_core::RouteSpec;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::error::ServerError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    OptionalParam(String),
}

impl Segment {
    fn shape(&self) -> &str {
        match self {
            Self::Literal(literal) => literal,
            Self::Param(_) => "{}",
            Self::OptionalParam(_) => "{?}",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    segments: Vec<Segment>,
    route: RouteSpec,
}

impl Entry {
    fn parse(route: RouteSpec) -> Result<Self, ServerError> {
        let invalid = |reason: &str| ServerError::InvalidRoute {
            method: route.method().to_string(),
            path: route.path().to_string(),
            reason: reason.to_string(),
        };

        let raw: Vec<&str> = route.path().split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (index, part) in raw.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                None => Segment::Literal((*part).to_string()),
                Some(inner) => {
                    let (name, optional) = match inner.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (inner, false),
                    };
                    if name.is_empty() {
                        return Err(invalid("parameter name is empty"));
                    }
                    if optional && index + 1 != raw.len() {
                        return Err(invalid("optional parameter must be the last segment"));
                    }
                    let taken = segments.iter().any(|s| {
                        matches!(s, Segment::Param(n) | Segment::OptionalParam(n) if n == name)
                    });
                    if taken {
                        return Err(invalid("parameter name is used twice"));
                    }
                    if optional {
                        Segment::OptionalParam(name.to_string())
                    } else {
                        Segment::Param(name.to_string())
                    }
                }
            };
            segments.push(segment);
        }

        Ok(Self { segments, route })
    }

    fn shape(&self) -> Vec<&str> {
        self.segments.iter().map(Segment::shape).collect()
    }

    fn match_path(&self, parts: &[&str]) -> Option<Map<String, Value>> {
        let max = self.segments.len();
        let min = match self.segments.last() {
            Some(Segment::OptionalParam(_)) => max - 1,
            _ => max,
        };
        if parts.len() < min || parts.len() > max {
            return None;
        }

        let mut params = Map::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) | Segment::OptionalParam(name) => {
                    let decoded = percent_decode_str(part).decode_utf8_lossy().into_owned();
                    params.insert(name.clone(), Value::String(decoded));
                }
            }
        }
        Some(params)
    }
}

/// Result of a route lookup.
#[derive(Debug)]
pub enum RouteLookup<'a> {
    /// A route matched method and path.
    Matched {
        /// The matched route.
        route: &'a RouteSpec,
        /// Decoded path parameters; an absent optional segment is omitted.
        params: Map<String, Value>,
    },
    /// The path exists but not for this method.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// Nothing matched the path.
    NotFound,
}

/// Method and path router over a fixed route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    entries: Vec<Entry>,
}

impl Router {
    /// Builds a router, rejecting malformed templates and duplicate routes.
    pub fn new(routes: Vec<RouteSpec>) -> Result<Self, ServerError> {
        let mut entries: Vec<Entry> = Vec::with_capacity(routes.len());
        for route in routes {
            let entry = Entry::parse(route)?;
            let duplicate = entries
                .iter()
                .any(|e| e.route.method() == entry.route.method() && e.shape() == entry.shape());
            if duplicate {
                return Err(ServerError::InvalidRoute {
                    method: entry.route.method().to_string(),
                    path: entry.route.path().to_string(),
                    reason: "another route already handles this method and path".to_string(),
                });
            }
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Returns the routes in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteSpec> {
        self.entries.iter().map(|e| &e.route)
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.entries.len()
    }

    /// Finds the route for a request. First match in declaration order wins.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup<'_> {
        let Some(parts) = split_path(path) else {
            return RouteLookup::NotFound;
        };
        let mut allowed = Vec::new();

        for entry in &self.entries {
            if let Some(params) = entry.match_path(&parts) {
                if entry.route.method() == method {
                    return RouteLookup::Matched {
                        route: &entry.route,
                        params,
                    };
                }
                if !allowed.contains(entry.route.method()) {
                    allowed.push(entry.route.method().clone());
                }
            }
        }

        if allowed.is_empty() {
            RouteLookup::NotFound
        } else {
            RouteLookup::MethodNotAllowed { allowed }
        }
    }
}

/// Splits a request path into segments. One trailing slash is tolerated;
/// any other empty segment makes the path unroutable.
fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let parts: Vec<&str> = rest.split('/').collect();
    if parts.iter().any(|s| s.is_empty()) {
        None
    } else {
        Some(parts)
    }
}
