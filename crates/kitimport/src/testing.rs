//! In-memory host collaborators
//!
//! Used by the test suites and handy for dry runs: every collaborator keeps
//! its state in memory and records the calls it receives.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use kitimport_types::{
    AssetUploader, BackupStore, ContentTypeRegistry, Document, DocumentFactory, DocumentId,
    DocumentMetadata, DocumentPayload, EntrySettings, GlobalSettingsManager, ImportError,
    ImportResult, Kit, KitId, LogoRef, PageSettingsApplier, PayloadStore, PostMetadataUpdater,
    ProgressSink, SettingsPayload, ACTIVE_OPTION_KEY,
};
use serde_json::Value;

use crate::progress::ProgressEvent;
use crate::services::ImportServices;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct KitState {
    kits: BTreeMap<u64, Kit>,
    active: Option<KitId>,
    options: HashMap<String, String>,
    next_id: u64,
}

/// Kit manager backed by a map
#[derive(Debug)]
pub struct InMemoryKitManager {
    state: Mutex<KitState>,
    fail_create: bool,
}

impl Default for InMemoryKitManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryKitManager {
    /// A site without any kit
    pub fn new() -> Self {
        Self {
            state: Mutex::new(KitState {
                next_id: 1,
                ..Default::default()
            }),
            fail_create: false,
        }
    }

    /// A site whose active kit has `settings`
    pub fn with_active_kit(id: u64, settings: SettingsPayload) -> Self {
        let manager = Self::new();
        {
            let mut state = lock(&manager.state);
            state.kits.insert(
                id,
                Kit {
                    id: KitId(id),
                    title: "Default Kit".to_string(),
                    settings,
                },
            );
            state.active = Some(KitId(id));
            state.next_id = id + 1;
        }
        manager
    }

    /// Make every kit creation fail
    pub fn failing_creation(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn active(&self) -> Option<KitId> {
        lock(&self.state).active
    }

    pub fn kit(&self, id: KitId) -> Option<Kit> {
        lock(&self.state).kits.get(&id.0).cloned()
    }

    pub fn kit_count(&self) -> usize {
        lock(&self.state).kits.len()
    }

    /// Value persisted under [`ACTIVE_OPTION_KEY`]
    pub fn active_option(&self) -> Option<String> {
        lock(&self.state).options.get(ACTIVE_OPTION_KEY).cloned()
    }

    /// Rename a stored kit, as the host's post updater would
    pub fn rename(&self, id: KitId, title: &str) -> bool {
        match lock(&self.state).kits.get_mut(&id.0) {
            Some(kit) => {
                kit.title = title.to_string();
                true
            }
            None => false,
        }
    }

    fn insert(&self, title: &str, settings: SettingsPayload, activate: bool) -> ImportResult<KitId> {
        if self.fail_create {
            return Err(ImportError::Kit("kit storage is read-only".to_string()));
        }
        let mut state = lock(&self.state);
        let id = KitId(state.next_id);
        state.next_id += 1;
        state.kits.insert(
            id.0,
            Kit {
                id,
                title: title.to_string(),
                settings,
            },
        );
        if activate {
            state.active = Some(id);
        }
        Ok(id)
    }
}

#[async_trait]
impl GlobalSettingsManager for InMemoryKitManager {
    async fn active_id(&self) -> ImportResult<Option<KitId>> {
        Ok(self.active())
    }

    async fn get_instance(&self, id: KitId) -> ImportResult<Option<Kit>> {
        Ok(self.kit(id))
    }

    async fn create_instance(
        &self,
        name: &str,
        settings: SettingsPayload,
        activate: bool,
    ) -> ImportResult<KitId> {
        self.insert(name, settings, activate)
    }

    async fn create_default_instance(&self) -> ImportResult<KitId> {
        self.insert("Default Kit", SettingsPayload::default(), false)
    }

    async fn persist_active(&self, id: KitId) -> ImportResult<()> {
        let mut state = lock(&self.state);
        if !state.kits.contains_key(&id.0) {
            return Err(ImportError::KitNotFound(id.to_string()));
        }
        state.active = Some(id);
        state
            .options
            .insert(ACTIVE_OPTION_KEY.to_string(), id.to_string());
        Ok(())
    }
}

/// A document created through [`InMemoryDocumentFactory`]
#[derive(Debug, Clone)]
pub struct CreatedDocument {
    pub doc_type: String,
    pub metadata: DocumentMetadata,
    pub id: DocumentId,
    /// Set once the payload was accepted
    pub payload: Option<DocumentPayload>,
}

#[derive(Debug, Default)]
struct FactoryRules {
    rejected_doc_types: HashSet<String>,
    failing_create_titles: HashSet<String>,
    failing_import_titles: HashSet<String>,
    withheld_id_titles: HashSet<String>,
}

/// Document factory handing out sequential ids
#[derive(Debug)]
pub struct InMemoryDocumentFactory {
    next_id: AtomicU64,
    rules: FactoryRules,
    created: Arc<Mutex<Vec<CreatedDocument>>>,
}

impl InMemoryDocumentFactory {
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
            rules: FactoryRules::default(),
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Refuse to create documents of `doc_type`
    pub fn reject_doc_type(mut self, doc_type: &str) -> Self {
        self.rules.rejected_doc_types.insert(doc_type.to_string());
        self
    }

    /// Refuse to create documents titled `title`
    pub fn fail_create_for(mut self, title: &str) -> Self {
        self.rules.failing_create_titles.insert(title.to_string());
        self
    }

    /// Reject the payload of documents titled `title`
    pub fn fail_import_for(mut self, title: &str) -> Self {
        self.rules.failing_import_titles.insert(title.to_string());
        self
    }

    /// Documents titled `title` report no id after import
    pub fn withhold_id_for(mut self, title: &str) -> Self {
        self.rules.withheld_id_titles.insert(title.to_string());
        self
    }

    pub fn created(&self) -> Vec<CreatedDocument> {
        lock(&self.created).clone()
    }
}

#[async_trait]
impl DocumentFactory for InMemoryDocumentFactory {
    async fn create(
        &self,
        doc_type: &str,
        metadata: DocumentMetadata,
    ) -> ImportResult<Box<dyn Document>> {
        if self.rules.rejected_doc_types.contains(doc_type) {
            return Err(ImportError::DocumentCreation(format!(
                "unknown document type '{}'",
                doc_type
            )));
        }
        if self.rules.failing_create_titles.contains(&metadata.title) {
            return Err(ImportError::DocumentCreation(format!(
                "storage rejected '{}'",
                metadata.title
            )));
        }

        let id = DocumentId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let fail_import = self.rules.failing_import_titles.contains(&metadata.title);
        let withhold_id = self.rules.withheld_id_titles.contains(&metadata.title);

        let mut created = lock(&self.created);
        created.push(CreatedDocument {
            doc_type: doc_type.to_string(),
            metadata,
            id,
            payload: None,
        });

        Ok(Box::new(InMemoryDocument {
            index: created.len() - 1,
            id,
            fail_import,
            withhold_id,
            imported: false,
            created: self.created.clone(),
        }))
    }
}

struct InMemoryDocument {
    index: usize,
    id: DocumentId,
    fail_import: bool,
    withhold_id: bool,
    imported: bool,
    created: Arc<Mutex<Vec<CreatedDocument>>>,
}

#[async_trait]
impl Document for InMemoryDocument {
    async fn import(&mut self, payload: DocumentPayload) -> ImportResult<()> {
        if self.fail_import {
            return Err(ImportError::DocumentImport(format!(
                "document {} rejected its payload",
                self.id
            )));
        }
        if let Some(doc) = lock(&self.created).get_mut(self.index) {
            doc.payload = Some(payload);
        }
        self.imported = true;
        Ok(())
    }

    fn main_id(&self) -> Option<DocumentId> {
        (self.imported && !self.withhold_id).then_some(self.id)
    }
}

/// Registry accepting a fixed set of content types
#[derive(Debug, Default, Clone)]
pub struct StaticContentTypeRegistry {
    known: HashSet<String>,
}

impl StaticContentTypeRegistry {
    pub fn allowing<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl ContentTypeRegistry for StaticContentTypeRegistry {
    fn exists(&self, content_type: &str) -> bool {
        self.known.contains(content_type)
    }
}

/// Payload store backed by a path-keyed map
#[derive(Debug, Default)]
pub struct InMemoryPayloadStore {
    payloads: Mutex<HashMap<PathBuf, Value>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl InMemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, payload: Value) {
        lock(&self.payloads).insert(path.into(), payload);
    }

    /// Paths requested so far, in order
    pub fn reads(&self) -> Vec<PathBuf> {
        lock(&self.reads).clone()
    }
}

#[async_trait]
impl PayloadStore for InMemoryPayloadStore {
    async fn read_json(&self, path: &Path) -> ImportResult<Value> {
        lock(&self.reads).push(path.to_path_buf());
        lock(&self.payloads)
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::PayloadRead {
                path: path.to_path_buf(),
                reason: "no such payload".to_string(),
            })
    }
}

/// Uploader returning a canned response
#[derive(Debug, Default)]
pub struct RecordingUploader {
    response: Option<LogoRef>,
    calls: AtomicUsize,
}

impl RecordingUploader {
    /// Every upload yields `response`
    pub fn returning(response: LogoRef) -> Self {
        Self {
            response: Some(response),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every upload fails
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetUploader for RecordingUploader {
    async fn upload_logo(&self, _logo: &LogoRef) -> ImportResult<LogoRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| ImportError::Upload("upload rejected".to_string()))
    }
}

/// Progress sink keeping every event
#[derive(Debug, Default)]
pub struct RecordingProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgressSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        lock(&self.events).clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        lock(&self.events).iter().map(|e| e.percent).collect()
    }
}

impl ProgressSink for RecordingProgressSink {
    fn emit(&self, percent: u8, message: Option<&str>, channel: &str) {
        lock(&self.events).push(ProgressEvent {
            percent,
            message: message.map(str::to_string),
            channel: channel.to_string(),
        });
    }
}

/// Backup store backed by a map
#[derive(Debug, Default)]
pub struct InMemoryBackupStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryBackupStore {
    pub fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }
}

#[async_trait]
impl BackupStore for InMemoryBackupStore {
    async fn has_backup_of(&self, key: &str) -> ImportResult<bool> {
        Ok(lock(&self.values).contains_key(key))
    }

    async fn set_backup(&self, key: &str, value: &str) -> ImportResult<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Title updater that renames kits held by an [`InMemoryKitManager`]
#[derive(Debug)]
pub struct KitTitleUpdater {
    kits: Arc<InMemoryKitManager>,
    updates: Mutex<Vec<(DocumentId, String)>>,
}

impl KitTitleUpdater {
    pub fn new(kits: Arc<InMemoryKitManager>) -> Self {
        Self {
            kits,
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<(DocumentId, String)> {
        lock(&self.updates).clone()
    }
}

#[async_trait]
impl PostMetadataUpdater for KitTitleUpdater {
    async fn update_title(&self, id: DocumentId, title: &str) -> ImportResult<()> {
        lock(&self.updates).push((id, title.to_string()));
        if self.kits.rename(KitId(id.0), title) {
            Ok(())
        } else {
            Err(ImportError::KitNotFound(id.to_string()))
        }
    }
}

/// Page settings applier recording which documents it touched
#[derive(Debug, Default)]
pub struct RecordingPageSettings {
    applied: Mutex<Vec<(DocumentId, EntrySettings)>>,
    fail: bool,
}

impl RecordingPageSettings {
    /// Every application fails after being recorded
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn applied(&self) -> Vec<(DocumentId, EntrySettings)> {
        lock(&self.applied).clone()
    }
}

#[async_trait]
impl PageSettingsApplier for RecordingPageSettings {
    async fn apply_page_settings(
        &self,
        document: DocumentId,
        settings: &EntrySettings,
    ) -> ImportResult<()> {
        lock(&self.applied).push((document, settings.clone()));
        if self.fail {
            return Err(ImportError::DocumentImport(format!(
                "page settings rejected for {}",
                document
            )));
        }
        Ok(())
    }
}

/// A complete in-memory host
pub struct TestHost {
    pub kits: Arc<InMemoryKitManager>,
    pub documents: Arc<InMemoryDocumentFactory>,
    pub content_types: Arc<StaticContentTypeRegistry>,
    pub payloads: Arc<InMemoryPayloadStore>,
    pub uploader: Arc<RecordingUploader>,
    pub progress: Arc<RecordingProgressSink>,
    pub backups: Arc<InMemoryBackupStore>,
    pub metadata: Arc<KitTitleUpdater>,
    pub page_settings: Arc<RecordingPageSettings>,
}

impl TestHost {
    /// Host knowing `content_types` whose kits live in `kits`
    pub fn new<I, S>(content_types: I, kits: InMemoryKitManager) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let kits = Arc::new(kits);
        Self {
            metadata: Arc::new(KitTitleUpdater::new(kits.clone())),
            kits,
            documents: Arc::new(InMemoryDocumentFactory::starting_at(100)),
            content_types: Arc::new(StaticContentTypeRegistry::allowing(content_types)),
            payloads: Arc::new(InMemoryPayloadStore::new()),
            uploader: Arc::new(RecordingUploader::failing()),
            progress: Arc::new(RecordingProgressSink::default()),
            backups: Arc::new(InMemoryBackupStore::default()),
            page_settings: Arc::new(RecordingPageSettings::default()),
        }
    }

    pub fn with_documents(mut self, documents: InMemoryDocumentFactory) -> Self {
        self.documents = Arc::new(documents);
        self
    }

    pub fn with_uploader(mut self, uploader: RecordingUploader) -> Self {
        self.uploader = Arc::new(uploader);
        self
    }

    pub fn with_page_settings(mut self, page_settings: RecordingPageSettings) -> Self {
        self.page_settings = Arc::new(page_settings);
        self
    }

    pub fn services(&self) -> ImportServices {
        ImportServices {
            kits: self.kits.clone(),
            documents: self.documents.clone(),
            content_types: self.content_types.clone(),
            payloads: self.payloads.clone(),
            uploader: self.uploader.clone(),
            progress: self.progress.clone(),
            backups: self.backups.clone(),
            metadata: self.metadata.clone(),
            page_settings: self.page_settings.clone(),
        }
    }
}
