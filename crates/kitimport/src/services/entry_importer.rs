//! Single-entry import

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kitimport_types::{
    DocumentFactory, DocumentId, DocumentMetadata, DocumentPayload, EntryId, EntryOutcome,
    EntrySettings, ImportError, ImportResult, PayloadStore,
};
use tracing::debug;

/// Imports one manifest entry through the document factory
pub struct EntryImporter {
    documents: Arc<dyn DocumentFactory>,
    payloads: Arc<dyn PayloadStore>,
    publish_status: String,
}

impl EntryImporter {
    pub fn new(
        documents: Arc<dyn DocumentFactory>,
        payloads: Arc<dyn PayloadStore>,
        publish_status: impl Into<String>,
    ) -> Self {
        Self {
            documents,
            payloads,
            publish_status: publish_status.into(),
        }
    }

    /// Location of an entry's persisted payload: `<base>/<content_type>/<id>.json`
    pub fn payload_path(base_path: &Path, content_type: &str, id: &EntryId) -> PathBuf {
        base_path.join(content_type).join(format!("{}.json", id))
    }

    /// Import a single entry
    ///
    /// Every failure is captured in the returned outcome.
    pub async fn import_entry(
        &self,
        id: &EntryId,
        content_type: &str,
        base_path: &Path,
        settings: &EntrySettings,
    ) -> EntryOutcome {
        match self.try_import(id, content_type, base_path, settings).await {
            Ok(document) => EntryOutcome::Imported(document),
            Err(e) => {
                debug!("Entry {}/{} failed: {}", content_type, id, e);
                EntryOutcome::Failed(e.into())
            }
        }
    }

    async fn try_import(
        &self,
        id: &EntryId,
        content_type: &str,
        base_path: &Path,
        settings: &EntrySettings,
    ) -> ImportResult<DocumentId> {
        let metadata = DocumentMetadata {
            title: settings.title.clone(),
            status: self.publish_status.clone(),
            content_type: content_type.to_string(),
        };
        let mut document = self.documents.create(&settings.doc_type, metadata).await?;

        let path = Self::payload_path(base_path, content_type, id);
        let raw = self.payloads.read_json(&path).await?;
        let mut payload = DocumentPayload::from_value(raw)?;

        // Entry settings take precedence over the exported body
        if settings.has_data() {
            payload.discard_content();
        }
        payload.import_settings = Some(settings.clone());

        document.import(payload).await?;

        document
            .main_id()
            .filter(|document_id| document_id.0 != 0)
            .ok_or(ImportError::MissingDocumentId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryDocumentFactory, InMemoryPayloadStore};
    use serde_json::json;

    const BASE: &str = "/pkg/content";

    fn importer(
        factory: &Arc<InMemoryDocumentFactory>,
        store: &Arc<InMemoryPayloadStore>,
    ) -> EntryImporter {
        EntryImporter::new(factory.clone(), store.clone(), "publish")
    }

    fn store_with(id: &str, payload: serde_json::Value) -> Arc<InMemoryPayloadStore> {
        let store = Arc::new(InMemoryPayloadStore::new());
        store.insert(
            EntryImporter::payload_path(Path::new(BASE), "page", &EntryId::new(id)),
            payload,
        );
        store
    }

    #[test]
    fn test_payload_path_layout() {
        let path = EntryImporter::payload_path(Path::new(BASE), "wp-page", &EntryId::new("12"));

        assert_eq!(path, PathBuf::from("/pkg/content/wp-page/12.json"));
    }

    #[tokio::test]
    async fn test_import_returns_document_id() {
        // Arrange
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(42));
        let store = store_with("1", json!({"content": [{"elType": "section"}]}));
        let settings = EntrySettings::new("page", "Home");

        // Act
        let outcome = importer(&factory, &store)
            .import_entry(&EntryId::new("1"), "page", Path::new(BASE), &settings)
            .await;

        // Assert
        assert_eq!(outcome, EntryOutcome::Imported(DocumentId(42)));
        let created = factory.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].doc_type, "page");
        assert_eq!(created[0].metadata.title, "Home");
        assert_eq!(created[0].metadata.status, "publish");
        assert_eq!(created[0].metadata.content_type, "page");
        let payload = created[0].payload.as_ref().unwrap();
        assert_eq!(payload.content, json!([{"elType": "section"}]));
        assert_eq!(payload.import_settings.as_ref(), Some(&settings));
    }

    #[tokio::test]
    async fn test_entry_data_discards_content_body() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1));
        let store = store_with(
            "1",
            json!({"content": [{"elType": "section"}], "page_settings": {"a": 1}}),
        );
        let settings =
            EntrySettings::new("page", "Home").with_data(json!({"page_settings": {"a": 2}}));

        let outcome = importer(&factory, &store)
            .import_entry(&EntryId::new("1"), "page", Path::new(BASE), &settings)
            .await;

        assert!(outcome.is_imported());
        let payload = factory.created()[0].payload.clone().unwrap();
        assert_eq!(payload.content, json!([]));
        assert_eq!(payload.extra["page_settings"], json!({"a": 1}));
        assert_eq!(
            payload.import_settings.unwrap().data,
            Some(json!({"page_settings": {"a": 2}}))
        );
    }

    #[tokio::test]
    async fn test_blank_entry_data_keeps_content_body() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1));
        let store = store_with("1", json!({"content": [1]}));
        let settings = EntrySettings::new("page", "Home").with_data(json!({}));

        importer(&factory, &store)
            .import_entry(&EntryId::new("1"), "page", Path::new(BASE), &settings)
            .await;

        assert_eq!(factory.created()[0].payload.clone().unwrap().content, json!([1]));
    }

    #[tokio::test]
    async fn test_create_failure_is_captured() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1).reject_doc_type("bogus"));
        let store = store_with("1", json!({"content": []}));

        let outcome = importer(&factory, &store)
            .import_entry(
                &EntryId::new("1"),
                "page",
                Path::new(BASE),
                &EntrySettings::new("bogus", "Home"),
            )
            .await;

        match outcome {
            EntryOutcome::Failed(failure) => assert!(failure.reason.contains("bogus")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_payload_is_captured() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1));
        let store = Arc::new(InMemoryPayloadStore::new());

        let outcome = importer(&factory, &store)
            .import_entry(
                &EntryId::new("9"),
                "page",
                Path::new(BASE),
                &EntrySettings::new("page", "Home"),
            )
            .await;

        assert!(!outcome.is_imported());
        // the document was already created; imports are not transactional
        assert_eq!(factory.created().len(), 1);
    }

    #[tokio::test]
    async fn test_import_error_is_captured() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1).fail_import_for("Broken"));
        let store = store_with("1", json!({"content": []}));

        let outcome = importer(&factory, &store)
            .import_entry(
                &EntryId::new("1"),
                "page",
                Path::new(BASE),
                &EntrySettings::new("page", "Broken"),
            )
            .await;

        assert!(!outcome.is_imported());
    }

    #[tokio::test]
    async fn test_missing_document_id_is_failure() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1).withhold_id_for("Ghost"));
        let store = store_with("1", json!({"content": []}));

        let outcome = importer(&factory, &store)
            .import_entry(
                &EntryId::new("1"),
                "page",
                Path::new(BASE),
                &EntrySettings::new("page", "Ghost"),
            )
            .await;

        assert_eq!(
            outcome,
            EntryOutcome::Failed(ImportError::MissingDocumentId.into())
        );
    }

    #[tokio::test]
    async fn test_non_object_payload_is_failure() {
        let factory = Arc::new(InMemoryDocumentFactory::starting_at(1));
        let store = store_with("1", json!("just a string"));

        let outcome = importer(&factory, &store)
            .import_entry(
                &EntryId::new("1"),
                "page",
                Path::new(BASE),
                &EntrySettings::new("page", "Home"),
            )
            .await;

        assert!(!outcome.is_imported());
    }
}
