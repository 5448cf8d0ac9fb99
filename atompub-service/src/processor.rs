//! Per-target-type processor strategies
//!
//! A [`RequestProcessor`] turns a request plus its resolved adapter into
//! a response for one target type. The [`ProcessorTable`] maps target
//! types to processors and is read on every dispatch; like the workspace
//! registry it swaps whole snapshots on write, so lookups never lock and
//! never observe a half-applied replacement.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::request::RequestContext;
use crate::response::ResponseContext;
use crate::target::TargetType;
use crate::workspace::WorkspaceManager;

/// Strategy for one target type
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    /// Produce a response for the request, or decline it
    ///
    /// `Ok(None)` means the processor does not claim this request (for
    /// example an unexpected method); the dispatcher then falls back to
    /// the adapter's extension hook.
    async fn process(
        &self,
        request: &RequestContext,
        manager: &WorkspaceManager,
        adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>>;
}

/// Mapping from target type to processor
///
/// An unregistered target type is a dispatch miss (404), never a panic.
pub struct ProcessorTable {
    table: ArcSwap<HashMap<TargetType, Arc<dyn RequestProcessor>>>,
}

impl ProcessorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Create a table holding the default processors
    pub fn with_defaults() -> Self {
        let table = Self::new();
        table.merge(crate::processors::defaults());
        table
    }

    /// Replace the whole table
    pub fn set(&self, processors: HashMap<TargetType, Arc<dyn RequestProcessor>>) {
        self.table.store(Arc::new(processors));
    }

    /// Merge processors into the table, overwriting collisions
    pub fn merge(&self, processors: HashMap<TargetType, Arc<dyn RequestProcessor>>) {
        self.table.rcu(|current| {
            let mut map = (**current).clone();
            map.extend(processors.clone());
            map
        });
    }

    /// Look up the processor for a target type
    pub fn get(&self, kind: TargetType) -> Option<Arc<dyn RequestProcessor>> {
        self.table.load().get(&kind).cloned()
    }

    /// Read-only snapshot of the current table
    pub fn snapshot(&self) -> Arc<HashMap<TargetType, Arc<dyn RequestProcessor>>> {
        self.table.load_full()
    }
}

impl Default for ProcessorTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
