//! Service discovery processor

use async_trait::async_trait;
use http::Method;

use crate::adapter::CollectionAdapter;
use crate::error::Result;
use crate::processor::RequestProcessor;
use crate::request::RequestContext;
use crate::response::{self, xml_escape, Document, ResponseContext};
use crate::uri::{TemplateParameters, UriTemplate};
use crate::workspace::{WorkspaceInfo, WorkspaceManager};

/// Answers service-document requests with the registered workspaces
///
/// The listing is generated here rather than by an adapter: discovery
/// reflects the registry itself, and the stand-in adapter resolved for
/// workspace-level targets has nothing to contribute.
pub struct ServiceRequestProcessor;

#[async_trait]
impl RequestProcessor for ServiceRequestProcessor {
    async fn process(
        &self,
        request: &RequestContext,
        manager: &WorkspaceManager,
        _adapter: &dyn CollectionAdapter,
    ) -> Result<Option<ResponseContext>> {
        match *request.method() {
            Method::GET | Method::HEAD => {}
            _ => return Ok(None),
        }

        let workspaces = manager.workspaces(request);
        let document = service_document(request, manager, &workspaces)?;

        Ok(Some(response::ok(document, response::ATOM_SERVICE)))
    }
}

/// Minimal Atom service document for the registered workspaces
fn service_document(
    request: &RequestContext,
    manager: &WorkspaceManager,
    workspaces: &[WorkspaceInfo],
) -> Result<Document> {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <service xmlns=\"http://www.w3.org/2007/app\" \
         xmlns:atom=\"http://www.w3.org/2005/Atom\">\n",
    );

    for workspace in workspaces {
        xml.push_str("  <workspace>\n");
        xml.push_str(&format!(
            "    <atom:title>{}</atom:title>\n",
            xml_escape(&workspace.title)
        ));

        for collection in &workspace.collections {
            let href = manager.url_for(
                request,
                UriTemplate::Collection,
                Some(
                    TemplateParameters::new()
                        .with_workspace(workspace.name.clone())
                        .with_collection(collection.name.clone()),
                ),
            )?;

            xml.push_str(&format!(
                "    <collection href=\"{}\">\n      <atom:title>{}</atom:title>\n    </collection>\n",
                xml_escape(&href),
                xml_escape(&collection.title)
            ));
        }

        xml.push_str("  </workspace>\n");
    }

    xml.push_str("</service>\n");

    Ok(Document::new(xml))
}
