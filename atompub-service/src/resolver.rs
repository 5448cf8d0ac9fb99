//! Target resolution against the fixed route templates
//!
//! Routes are matched in a fixed priority order so a more specific
//! template (categories, media) is never shadowed by a more general one
//! (entry, collection). Resolution is a pure function of the request
//! path: no side effects, identical output for identical input, and no
//! failure mode — an unmatched path resolves to [`Target::not_found`].

use regex::Regex;
use std::collections::HashMap;

use crate::target::{Target, TargetField, TargetType};

/// A compiled route template
#[derive(Debug, Clone)]
struct RouteTemplate {
    /// Target type produced on a match
    kind: TargetType,

    /// Compiled regex for path matching
    regex: Regex,

    /// Named fields captured by the regex, in capture order
    fields: &'static [TargetField],
}

impl RouteTemplate {
    fn new(kind: TargetType, pattern: &str, fields: &'static [TargetField]) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("route template regex is valid"),
            fields,
        }
    }
}

/// Resolves request paths to typed targets
///
/// Template priority, first match wins:
/// 1. `/{workspace}/{collection}/categories`
/// 2. `/{workspace}/{collection}/{entry}/media`
/// 3. `/{workspace}/{collection}/{entry}`
/// 4. `/{workspace}/{collection}`
/// 5. `/{workspace}`
#[derive(Debug, Clone)]
pub struct TargetResolver {
    routes: Vec<RouteTemplate>,
}

impl TargetResolver {
    /// Build the resolver with the default route set
    pub fn new() -> Self {
        let routes = vec![
            RouteTemplate::new(
                TargetType::Categories,
                r"^/([^/]+)/([^/]+)/categories$",
                &[TargetField::Workspace, TargetField::Collection],
            ),
            RouteTemplate::new(
                TargetType::Media,
                r"^/([^/]+)/([^/]+)/([^/]+)/media$",
                &[
                    TargetField::Workspace,
                    TargetField::Collection,
                    TargetField::Entry,
                ],
            ),
            RouteTemplate::new(
                TargetType::Entry,
                r"^/([^/]+)/([^/]+)/([^/]+)$",
                &[
                    TargetField::Workspace,
                    TargetField::Collection,
                    TargetField::Entry,
                ],
            ),
            RouteTemplate::new(
                TargetType::Collection,
                r"^/([^/]+)/([^/]+)$",
                &[TargetField::Workspace, TargetField::Collection],
            ),
            RouteTemplate::new(
                TargetType::Service,
                r"^/([^/]+)$",
                &[TargetField::Workspace],
            ),
        ];

        Self { routes }
    }

    /// Resolve a request path to a target
    ///
    /// The query string is ignored and a single trailing slash is
    /// tolerated. Never fails: unmatched paths yield a `NotFound` target.
    pub fn resolve(&self, path: &str) -> Target {
        let normalized = Self::normalize(path);

        for route in &self.routes {
            if let Some(captures) = route.regex.captures(normalized) {
                let mut parameters = HashMap::with_capacity(route.fields.len());

                for (index, field) in route.fields.iter().enumerate() {
                    if let Some(value) = captures.get(index + 1) {
                        parameters.insert(field.key().to_string(), value.as_str().to_string());
                    }
                }

                return Target::new(route.kind, parameters);
            }
        }

        Target::not_found()
    }

    /// Strip the query string and a single trailing slash
    fn normalize(path: &str) -> &str {
        let path = path.split('?').next().unwrap_or(path);

        if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        }
    }
}

impl Default for TargetResolver {
    fn default() -> Self {
        Self::new()
    }
}
