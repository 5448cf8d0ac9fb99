//! Resolved request targets
//!
//! A [`Target`] is the outcome of matching a request path against the
//! route templates: which kind of resource was addressed, plus the named
//! identifiers pulled out of the path. Targets are created once per
//! request by the resolver and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

/// Kind of resource a request resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// Service discovery document for a workspace
    Service,
    /// Category listing for a collection
    Categories,
    /// A collection of entries (list / create)
    Collection,
    /// An individual entry (get / update / delete)
    Entry,
    /// The media resource behind an entry
    Media,
    /// No route matched
    NotFound,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Categories => write!(f, "categories"),
            Self::Collection => write!(f, "collection"),
            Self::Entry => write!(f, "entry"),
            Self::Media => write!(f, "media"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Named path parameters a route template can capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    /// Workspace name, present on every resolvable target
    Workspace,
    /// Collection name
    Collection,
    /// Entry identifier
    Entry,
}

impl TargetField {
    /// Stable parameter key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Collection => "collection",
            Self::Entry => "entry",
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The resolved intent of a request
///
/// Immutable once resolved. `NotFound` targets carry no parameters; all
/// other kinds carry at minimum the workspace name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    kind: TargetType,
    parameters: HashMap<String, String>,
}

impl Target {
    /// Create a target with the given kind and parameters
    pub fn new(kind: TargetType, parameters: HashMap<String, String>) -> Self {
        Self { kind, parameters }
    }

    /// The target for an unroutable request
    pub fn not_found() -> Self {
        Self {
            kind: TargetType::NotFound,
            parameters: HashMap::new(),
        }
    }

    /// Kind of resource this target addresses
    pub fn kind(&self) -> TargetType {
        self.kind
    }

    /// Look up a named parameter
    pub fn parameter(&self, field: TargetField) -> Option<&str> {
        self.parameters.get(field.key()).map(String::as_str)
    }

    /// Workspace name, when the target is resolvable
    pub fn workspace(&self) -> Option<&str> {
        self.parameter(TargetField::Workspace)
    }

    /// Collection name, for collection-scoped targets
    pub fn collection(&self) -> Option<&str> {
        self.parameter(TargetField::Collection)
    }

    /// Entry identifier, for entry and media targets
    pub fn entry(&self) -> Option<&str> {
        self.parameter(TargetField::Entry)
    }

    /// All captured parameters
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_target() -> Target {
        let mut params = HashMap::new();
        params.insert("workspace".to_string(), "workspace1".to_string());
        params.insert("collection".to_string(), "feedA".to_string());
        params.insert("entry".to_string(), "entry42".to_string());
        Target::new(TargetType::Entry, params)
    }

    #[test]
    fn test_parameter_accessors() {
        let target = entry_target();
        assert_eq!(target.kind(), TargetType::Entry);
        assert_eq!(target.workspace(), Some("workspace1"));
        assert_eq!(target.collection(), Some("feedA"));
        assert_eq!(target.entry(), Some("entry42"));
    }

    #[test]
    fn test_not_found_has_no_parameters() {
        let target = Target::not_found();
        assert_eq!(target.kind(), TargetType::NotFound);
        assert!(target.parameters().is_empty());
        assert_eq!(target.workspace(), None);
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(TargetField::Workspace.key(), "workspace");
        assert_eq!(TargetField::Collection.key(), "collection");
        assert_eq!(TargetField::Entry.key(), "entry");
    }
}
