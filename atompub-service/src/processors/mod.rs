//! Default request processors
//!
//! One processor per resolvable target type, mapping HTTP methods onto
//! the adapter's operations. Each processor claims only the methods it
//! understands and returns `Ok(None)` for everything else, leaving the
//! request to the adapter's extension hook.

mod categories;
mod collection;
mod entry;
mod media;
mod service;

pub use categories::CategoriesRequestProcessor;
pub use collection::CollectionRequestProcessor;
pub use entry::EntryRequestProcessor;
pub use media::MediaRequestProcessor;
pub use service::ServiceRequestProcessor;

use std::collections::HashMap;
use std::sync::Arc;

use crate::processor::RequestProcessor;
use crate::target::TargetType;

/// The default processor for every resolvable target type
pub fn defaults() -> HashMap<TargetType, Arc<dyn RequestProcessor>> {
    let mut processors: HashMap<TargetType, Arc<dyn RequestProcessor>> = HashMap::new();

    processors.insert(TargetType::Service, Arc::new(ServiceRequestProcessor));
    processors.insert(TargetType::Categories, Arc::new(CategoriesRequestProcessor));
    processors.insert(TargetType::Collection, Arc::new(CollectionRequestProcessor));
    processors.insert(TargetType::Entry, Arc::new(EntryRequestProcessor));
    processors.insert(TargetType::Media, Arc::new(MediaRequestProcessor));

    processors
}
