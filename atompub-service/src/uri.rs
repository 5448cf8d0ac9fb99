//! URL generation from route templates
//!
//! The route templates of the resolver, run in reverse: given a template
//! key and a [`TemplateParameters`] bundle, produce an absolute URL.
//! Host-level variables (scheme, domain) come from configuration and the
//! remaining identifiers from the caller or the current request target —
//! see [`WorkspaceManager::url_for`](crate::workspace::WorkspaceManager::url_for).

use std::fmt;

use crate::error::{Error, Result};

/// Logical routes a URL can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriTemplate {
    /// `{scheme}://{domain}/{workspace}`
    Service,
    /// `{scheme}://{domain}/{workspace}/{collection}`
    Collection,
    /// `{scheme}://{domain}/{workspace}/{collection}/categories`
    Categories,
    /// `{scheme}://{domain}/{workspace}/{collection}/{entry}`
    Entry,
    /// `{scheme}://{domain}/{workspace}/{collection}/{entry}/media`
    Media,
}

impl UriTemplate {
    /// The template pattern for this route
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Service => "{scheme}://{domain}/{workspace}",
            Self::Collection => "{scheme}://{domain}/{workspace}/{collection}",
            Self::Categories => "{scheme}://{domain}/{workspace}/{collection}/categories",
            Self::Entry => "{scheme}://{domain}/{workspace}/{collection}/{entry}",
            Self::Media => "{scheme}://{domain}/{workspace}/{collection}/{entry}/media",
        }
    }

    /// Expand this template with the given parameters
    ///
    /// Every template variable must be fillable; an absent value fails
    /// with [`Error::InvalidTemplateParameters`].
    pub fn expand(&self, parameters: &TemplateParameters) -> Result<String> {
        let pattern = self.pattern();
        let mut url = String::with_capacity(pattern.len());
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                url.push(c);
                continue;
            }

            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }

            match parameters.value_of(&name) {
                Some(value) => url.push_str(value),
                None => {
                    return Err(Error::InvalidTemplateParameters(format!(
                        "template variable '{}' has no value for {}",
                        name, self
                    )))
                }
            }
        }

        Ok(url)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Collection => write!(f, "collection"),
            Self::Categories => write!(f, "categories"),
            Self::Entry => write!(f, "entry"),
            Self::Media => write!(f, "media"),
        }
    }
}

/// Named parameters for URL generation
///
/// A typed bundle: only the variables the templates know about can be
/// supplied, so misuse surfaces at compile time rather than as a runtime
/// map-shape check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParameters {
    pub(crate) scheme: Option<String>,
    pub(crate) domain: Option<String>,
    pub(crate) workspace: Option<String>,
    pub(crate) collection: Option<String>,
    pub(crate) entry: Option<String>,
}

impl TemplateParameters {
    /// Create an empty parameter bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the host domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the workspace name
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Set the collection name
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set the entry identifier
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    fn value_of(&self, name: &str) -> Option<&str> {
        let value = match name {
            "scheme" => &self.scheme,
            "domain" => &self.domain,
            "workspace" => &self.workspace,
            "collection" => &self.collection,
            "entry" => &self.entry,
            _ => &None,
        };

        value.as_deref()
    }
}
