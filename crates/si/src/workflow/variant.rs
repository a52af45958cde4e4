//! Replace a schema's default variant with new code and metadata.

use serde::Serialize;
use serde_json::Value;
use si_client::{ClientError, SiClient, Transport};
use si_ids::{SchemaId, SchemaVariantId};
use si_protocol::UpdateSchemaVariantRequest;
use std::path::PathBuf;

use crate::metadata::SchemaMetadata;
use crate::workflow::upload::{SchemaConventions, UploadError};

#[derive(Debug, Clone)]
pub struct VariantUpdate {
    pub schema_id: SchemaId,
    pub source_path: PathBuf,
    pub metadata_path: PathBuf,
    pub category: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantUpdateReport {
    pub schema_id: SchemaId,
    pub variant_id: SchemaVariantId,
    pub response: Value,
}

/// Full replace of the default variant. Category and color fall back to the
/// metadata, then to what the variant already has, then to the conventions.
pub fn update_default_variant<T: Transport>(
    client: &SiClient<T>,
    update: &VariantUpdate,
    conventions: &SchemaConventions,
) -> Result<VariantUpdateReport, UploadError> {
    let code = std::fs::read_to_string(&update.source_path).map_err(|source| {
        UploadError::Source {
            path: update.source_path.clone(),
            source,
        }
    })?;
    let metadata = SchemaMetadata::load(&update.metadata_path)?;

    let current = client.get_schema_variant_default(&update.schema_id)?;
    let variant_id = current.variant_id.clone().ok_or(ClientError::Decode {
        operation: "get schema variant default",
        message: "response has no variantId".to_string(),
    })?;

    let request = UpdateSchemaVariantRequest {
        name: metadata.name,
        description: metadata.description,
        link: metadata.link,
        category: update
            .category
            .clone()
            .or(metadata.category)
            .or(current.category)
            .unwrap_or_else(|| conventions.default_category.clone()),
        color: update
            .color
            .clone()
            .or(metadata.color)
            .or(current.color)
            .unwrap_or_else(|| conventions.default_color.clone()),
        code,
    };
    let response = client.update_schema_variant(&update.schema_id, &variant_id, &request)?;
    tracing::info!(schema = %update.schema_id, variant = %variant_id, "Updated default variant");

    Ok(VariantUpdateReport {
        schema_id: update.schema_id.clone(),
        variant_id,
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use si_client::mock::MockTransport;
    use si_client::Method;
    use si_ids::ChangeSetId;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_update_uses_default_variant_and_keeps_existing_color() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("droplet.js");
        let metadata = dir.path().join("droplet.json");
        fs::write(&source, "function main() {}").unwrap();
        fs::write(
            &metadata,
            r#"{"name":"Droplet","description":"d","link":"https://example.test"}"#,
        )
        .unwrap();

        let mock = MockTransport::authenticated("ws-1");
        let mut client = SiClient::with_transport(mock.clone()).unwrap();
        client.use_change_set(ChangeSetId::parse("cs-1").unwrap());

        mock.queue_json(200, json!({"variantId": "v-3", "color": "#123456"}));
        mock.queue_json(200, json!({"success": true}));

        let report = update_default_variant(
            &client,
            &VariantUpdate {
                schema_id: SchemaId::parse("s-1").unwrap(),
                source_path: source,
                metadata_path: metadata,
                category: Some("DigitalOcean".to_string()),
                color: None,
            },
            &SchemaConventions::default(),
        )
        .unwrap();
        assert_eq!(report.variant_id.as_str(), "v-3");

        let put = &mock.requests_to(Method::Put, "/schemas/s-1/variant/v-3")[0];
        let body = put.body.as_ref().unwrap();
        assert_eq!(body["category"], "DigitalOcean");
        assert_eq!(body["color"], "#123456");
        assert_eq!(body["code"], "function main() {}");
    }

    #[test]
    fn test_missing_source_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let mock = MockTransport::authenticated("ws-1");
        let client = SiClient::with_transport(mock.clone()).unwrap();

        let err = update_default_variant(
            &client,
            &VariantUpdate {
                schema_id: SchemaId::parse("s-1").unwrap(),
                source_path: dir.path().join("absent.js"),
                metadata_path: dir.path().join("absent.json"),
                category: None,
                color: None,
            },
            &SchemaConventions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::Source { .. }));
        assert_eq!(mock.request_count(), 1);
    }
}
