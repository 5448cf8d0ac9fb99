//! Workspace and collection registry
//!
//! [`WorkspaceManager`] holds the long-lived mapping from workspace and
//! collection names to their registered adapters. Reads take a lock-free
//! snapshot; administrative writes clone the table, apply the change,
//! and swap the whole snapshot in, so a reader never observes a
//! partially-updated registry. Writes happen at startup or during
//! reconfiguration, never on the request path.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::CollectionAdapter;
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::request::RequestContext;
use crate::uri::{TemplateParameters, UriTemplate};

/// Descriptive metadata for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Collection name (the path segment)
    pub name: String,

    /// Human-readable title
    pub title: String,
}

/// Descriptive metadata for one workspace, used by service discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    /// Workspace name (the path segment)
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Collections registered under this workspace, in name order
    pub collections: Vec<CollectionInfo>,
}

#[derive(Clone)]
struct Collection {
    title: String,
    adapter: Arc<dyn CollectionAdapter>,
}

#[derive(Clone)]
struct Workspace {
    title: String,
    collections: HashMap<String, Collection>,
}

/// Adapter stood in for workspace-level (service discovery) requests
///
/// The service processor only enumerates the registry; the adapter slot
/// exists so service requests flow through the same dispatch steps as
/// collection-scoped ones.
struct ServiceAdapter;

impl CollectionAdapter for ServiceAdapter {}

/// Registry of workspaces and their collection adapters
pub struct WorkspaceManager {
    host: HostConfig,
    workspaces: ArcSwap<HashMap<String, Workspace>>,
    service_adapter: Arc<dyn CollectionAdapter>,
}

impl WorkspaceManager {
    /// Create an empty registry with the given host configuration
    pub fn new(host: HostConfig) -> Self {
        Self {
            host,
            workspaces: ArcSwap::from_pointee(HashMap::new()),
            service_adapter: Arc::new(ServiceAdapter),
        }
    }

    /// Register a workspace
    ///
    /// Re-registering an existing name replaces its title and keeps its
    /// collections.
    pub fn register_workspace(&self, name: impl Into<String>, title: impl Into<String>) {
        let name = name.into();
        let title = title.into();

        self.workspaces.rcu(|current| {
            let mut map = (**current).clone();
            map.entry(name.clone())
                .and_modify(|ws| ws.title = title.clone())
                .or_insert_with(|| Workspace {
                    title: title.clone(),
                    collections: HashMap::new(),
                });
            map
        });

        tracing::info!(workspace = %name, "Registered workspace");
    }

    /// Register a collection adapter under a workspace
    ///
    /// The workspace must already be registered.
    pub fn register_collection(
        &self,
        workspace: &str,
        name: impl Into<String>,
        title: impl Into<String>,
        adapter: Arc<dyn CollectionAdapter>,
    ) -> Result<()> {
        let name = name.into();
        let title = title.into();

        if !self.workspaces.load().contains_key(workspace) {
            return Err(Error::NotFound(format!(
                "workspace '{}' is not registered",
                workspace
            )));
        }

        self.workspaces.rcu(|current| {
            let mut map = (**current).clone();
            if let Some(ws) = map.get_mut(workspace) {
                ws.collections.insert(
                    name.clone(),
                    Collection {
                        title: title.clone(),
                        adapter: adapter.clone(),
                    },
                );
            }
            map
        });

        tracing::info!(workspace = %workspace, collection = %name, "Registered collection");
        Ok(())
    }

    /// Remove a workspace and all its collections
    pub fn remove_workspace(&self, name: &str) {
        self.workspaces.rcu(|current| {
            let mut map = (**current).clone();
            map.remove(name);
            map
        });
    }

    /// Remove one collection from a workspace
    pub fn remove_collection(&self, workspace: &str, name: &str) {
        self.workspaces.rcu(|current| {
            let mut map = (**current).clone();
            if let Some(ws) = map.get_mut(workspace) {
                ws.collections.remove(name);
            }
            map
        });
    }

    /// Find the adapter responsible for the request's target
    ///
    /// Resolution uses the target's workspace and collection parameters.
    /// Workspace-level targets (service discovery) resolve to a stand-in
    /// adapter as long as the workspace exists. Absence is `None`, never
    /// an error — the dispatcher answers 404.
    pub fn collection_adapter(
        &self,
        request: &RequestContext,
    ) -> Option<Arc<dyn CollectionAdapter>> {
        let target = request.target()?;
        let workspace_name = target.workspace()?;

        let snapshot = self.workspaces.load();
        let workspace = snapshot.get(workspace_name)?;

        match target.collection() {
            Some(collection) => workspace
                .collections
                .get(collection)
                .map(|c| c.adapter.clone()),
            None => Some(self.service_adapter.clone()),
        }
    }

    /// Enumerate the registered workspaces, in name order
    pub fn workspaces(&self, _request: &RequestContext) -> Vec<WorkspaceInfo> {
        let snapshot = self.workspaces.load();

        let mut infos: Vec<WorkspaceInfo> = snapshot
            .iter()
            .map(|(name, workspace)| {
                let mut collections: Vec<CollectionInfo> = workspace
                    .collections
                    .iter()
                    .map(|(name, collection)| CollectionInfo {
                        name: name.clone(),
                        title: collection.title.clone(),
                    })
                    .collect();
                collections.sort_by(|a, b| a.name.cmp(&b.name));

                WorkspaceInfo {
                    name: name.clone(),
                    title: workspace.title.clone(),
                    collections,
                }
            })
            .collect();

        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Build an absolute URL for a logical route
    ///
    /// Host-level variables (scheme, domain) are injected from
    /// configuration first; identifiers the caller left unset are then
    /// filled from the request's current target, so a handler can link a
    /// sibling entry without restating the workspace or collection.
    pub fn url_for(
        &self,
        request: &RequestContext,
        template: UriTemplate,
        parameters: Option<TemplateParameters>,
    ) -> Result<String> {
        let mut params = parameters.unwrap_or_default();

        if params.scheme.is_none() {
            params.scheme = Some(self.host.scheme.clone());
        }
        if params.domain.is_none() {
            params.domain = Some(self.host.domain.clone());
        }

        if let Some(target) = request.target() {
            if params.workspace.is_none() {
                params.workspace = target.workspace().map(str::to_string);
            }
            if params.collection.is_none() {
                params.collection = target.collection().map(str::to_string);
            }
            if params.entry.is_none() {
                params.entry = target.entry().map(str::to_string);
            }
        }

        template.expand(&params)
    }

    /// Host configuration used for URL generation
    pub fn host(&self) -> &HostConfig {
        &self.host
    }
}
