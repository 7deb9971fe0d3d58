use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::gist::{Document, DocumentFile, DocumentStore};

/// In-process document store with the same whole-document read/replace
/// contract as the remote one. Used by tests and by embedders that want the
/// queue semantics without a network backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Document>>> {
        self.documents
            .lock()
            .map_err(|_| QueueError::Storage("memory store lock poisoned".to_string()))
    }

    /// Raw file bytes as currently stored; handy for asserting on exactly
    /// what a writer persisted.
    pub fn raw_content(&self, id: &str, filename: &str) -> Result<Option<String>> {
        let documents = self.lock()?;
        Ok(documents
            .get(id)
            .and_then(|document| document.files.get(filename))
            .and_then(|file| file.content.clone()))
    }
}

impl DocumentStore for MemoryStore {
    fn list_documents(&self) -> Result<Vec<Document>> {
        let documents = self.lock()?;
        let mut listed = documents.values().cloned().collect::<Vec<_>>();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let documents = self.lock()?;
        Ok(documents.get(id).cloned())
    }

    fn create_document(
        &self,
        description: &str,
        filename: &str,
        content: &str,
        _public: bool,
    ) -> Result<Document> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let document = Document {
            id: id.clone(),
            description: Some(description.to_string()),
            url: format!("memory://gists/{id}"),
            created_at: now,
            updated_at: now,
            files: HashMap::from([(
                filename.to_string(),
                DocumentFile {
                    content: Some(content.to_string()),
                    raw_url: None,
                    size: content.len() as u64,
                },
            )]),
        };

        let mut documents = self.lock()?;
        documents.insert(id, document.clone());
        Ok(document)
    }

    fn update_document(&self, id: &str, filename: &str, content: &str) -> Result<Document> {
        let mut documents = self.lock()?;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| QueueError::NotFound(format!("document {id} not found")))?;
        document.files.insert(
            filename.to_string(),
            DocumentFile {
                content: Some(content.to_string()),
                raw_url: None,
                size: content.len() as u64,
            },
        );
        document.updated_at = Utc::now();
        Ok(document.clone())
    }

    fn file_content(&self, document: &Document, filename: &str) -> Result<Option<String>> {
        // Always consult current state rather than the caller's snapshot, so
        // a read after a concurrent write observes that write.
        let documents = self.lock()?;
        Ok(documents
            .get(&document.id)
            .and_then(|current| current.files.get(filename))
            .and_then(|file| file.content.clone()))
    }
}
