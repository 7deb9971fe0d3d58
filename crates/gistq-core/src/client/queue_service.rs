use std::time::Instant;

use crate::catalog;
use crate::error::{QueueError, Result};
use crate::gist::{Document, DocumentStore};
use crate::models::{Message, QueueInfo, QueueRef};
use crate::occ;

use super::GistQueue;

impl GistQueue {
    /// Create a queue, seeding it with an empty message array. Creation is
    /// idempotent: an existing queue with the same name is returned as-is.
    pub fn create_queue(&self, name: Option<&str>, public: bool) -> Result<Document> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let name = name
            .unwrap_or(&self.config.queue.default_queue)
            .to_string();

        let result = (|| -> Result<Document> {
            if let Some(existing) = self.get_queue(&name)? {
                return Ok(existing);
            }
            let description =
                catalog::queue_description(&self.config.queue.description_prefix, &name);
            let filename = catalog::queue_filename(&name, &self.config.queue.file_extension);
            self.store
                .create_document(&description, &filename, "[]", public)
        })();

        match &result {
            Ok(document) => self.log_request_status(
                request_id,
                "queue.create",
                "ok",
                started,
                Some(name),
                Some(serde_json::json!({"id": document.id, "public": public})),
            ),
            Err(err) => {
                self.log_request_error(request_id, "queue.create", started, Some(name), err, None);
            }
        }
        result
    }

    /// Lookup by name via the description tag; absent queues are `Ok(None)`.
    pub fn get_queue(&self, name: &str) -> Result<Option<Document>> {
        let description = catalog::queue_description(&self.config.queue.description_prefix, name);
        let documents = self.store.list_documents()?;
        Ok(documents
            .into_iter()
            .find(|document| document.description.as_deref() == Some(description.as_str())))
    }

    pub fn get_queue_by_id(&self, id: &str) -> Result<Option<Document>> {
        self.store.get_document(id)
    }

    /// All queues owned by the account, recovered from the description tag.
    pub fn list_queues(&self) -> Result<Vec<QueueInfo>> {
        let prefix = &self.config.queue.description_prefix;
        let documents = self.store.list_documents()?;
        Ok(documents
            .into_iter()
            .filter_map(|document| {
                let description = document.description.clone()?;
                let name = catalog::queue_name_from_description(prefix, &description)?;
                Some(QueueInfo {
                    id: document.id,
                    name,
                    description,
                    url: document.url,
                    created_at: document.created_at.to_rfc3339(),
                    updated_at: document.updated_at.to_rfc3339(),
                })
            })
            .collect())
    }

    /// Parsed content of a queue document.
    pub fn queue_content(&self, queue: &QueueRef) -> Result<Vec<Message>> {
        let (document, filename) = self.resolve_queue(queue)?;
        self.read_queue_file(&document, &filename)
    }

    /// Resolve any queue reference to a concrete document plus the filename
    /// of its message array. Done once at the entry of each operation.
    pub(super) fn resolve_queue(&self, queue: &QueueRef) -> Result<(Document, String)> {
        let extension = &self.config.queue.file_extension;
        match queue {
            QueueRef::Name(name) => {
                let document = self.get_queue(name)?.ok_or_else(|| {
                    QueueError::NotFound(format!("queue '{name}' not found"))
                })?;
                Ok((document, catalog::queue_filename(name, extension)))
            }
            QueueRef::Id(id) => {
                let document = self.get_queue_by_id(id)?.ok_or_else(|| {
                    QueueError::NotFound(format!("queue document '{id}' not found"))
                })?;
                let filename = catalog::find_queue_file(&document, extension).ok_or_else(|| {
                    QueueError::NotFound(format!("document '{id}' holds no queue file"))
                })?;
                Ok((document, filename))
            }
            QueueRef::Handle(document) => {
                let filename = catalog::find_queue_file(document, extension).ok_or_else(|| {
                    QueueError::NotFound(format!(
                        "document '{}' holds no queue file",
                        document.id
                    ))
                })?;
                Ok((document.clone(), filename))
            }
        }
    }

    pub(super) fn read_queue_file(
        &self,
        document: &Document,
        filename: &str,
    ) -> Result<Vec<Message>> {
        let raw = self
            .store
            .file_content(document, filename)?
            .ok_or_else(|| QueueError::NotFound(format!("queue file '{filename}' not found")))?;
        occ::parse_queue(&raw)
    }
}
