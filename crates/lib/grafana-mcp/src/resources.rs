//! MCP resources.

use grafana_core::datasources::list_datasources;
use rmcp::model::{
    AnnotateAble,
    ErrorCode,
    RawResource,
    ReadResourceResult,
    Resource,
    ResourceContents,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer};

use crate::GrafanaMcp;
use crate::helpers;

pub const DATASOURCES_URI: &str = "grafana://datasources";
const DATASOURCES_NAME: &str = "grafana_datasources";
const JSON_MIME: &str = "application/json";
const DATASOURCES_DESCRIPTION: &str = "Available Grafana datasources: UIDs, names, and types \
for datasource-specific tools such as query_loki_logs. Use this resource to find valid \
datasourceUid values.";

pub fn catalog() -> Vec<Resource> {
    let mut datasources = RawResource::new(DATASOURCES_URI, DATASOURCES_NAME);
    datasources.description = Some(DATASOURCES_DESCRIPTION.to_string());
    datasources.mime_type = Some(JSON_MIME.to_string());
    vec![datasources.no_annotation()]
}

pub async fn read(
    server: &GrafanaMcp,
    uri: &str,
    context: &RequestContext<RoleServer>,
) -> Result<ReadResourceResult, ErrorData> {
    if uri != DATASOURCES_URI {
        return Err(helpers::mcp_err(
            ErrorCode::RESOURCE_NOT_FOUND,
            format!("unknown resource: {uri}"),
        ));
    }

    let datasources = helpers::until_cancelled(&context.ct, async {
        let client = server.client()?;
        list_datasources(&client).await
    })
    .await
    .map_err(|err| {
        helpers::mcp_err(
            ErrorCode::INTERNAL_ERROR,
            format!("fetching datasources: {err}"),
        )
    })?;

    let text = helpers::to_pretty_json(&datasources)?;
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: DATASOURCES_URI.to_string(),
            mime_type: Some(JSON_MIME.to_string()),
            text,
            meta: None,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_datasources_resource() {
        let resources = catalog();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, DATASOURCES_URI);
        assert_eq!(resources[0].name, DATASOURCES_NAME);
        assert_eq!(resources[0].mime_type.as_deref(), Some(JSON_MIME));
    }
}
