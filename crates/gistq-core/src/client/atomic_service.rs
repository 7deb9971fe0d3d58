use std::thread;
use std::time::Instant;

use crate::error::{QueueError, Result};
use crate::gist::DocumentStore;
use crate::models::{Message, MessageStatus, QueueRef, now_timestamp};
use crate::occ;

use super::GistQueue;
use super::message_service::apply_message_update;

impl GistQueue {
    /// One optimistic read-modify-write round against a queue document.
    ///
    /// The store cannot reject a stale write, so the round is: read and parse
    /// the current array, apply `update`, write the canonical serialization,
    /// then re-read and compare content fingerprints. A mismatch means a
    /// concurrent writer interleaved and the round's outcome is
    /// `QueueError::Conflict`: the lost update is detected after the fact,
    /// once per call. `update` must be pure; it is re-applied to fresh
    /// content on retry.
    pub fn atomic_update<F>(&self, queue: &QueueRef, update: F) -> Result<Vec<Message>>
    where
        F: Fn(Vec<Message>) -> Result<Vec<Message>>,
    {
        let (document, filename) = self.resolve_queue(queue)?;
        let current = self.read_queue_file(&document, &filename)?;

        let updated = update(current)?;
        let serialized = occ::serialize_queue(&updated)?;
        let expected = occ::fingerprint(&serialized);

        self.store
            .update_document(&document.id, &filename, &serialized)?;

        let fresh = self.store.get_document(&document.id)?.ok_or_else(|| {
            QueueError::Storage(format!("document '{}' vanished during verify", document.id))
        })?;
        let verify_raw = self
            .store
            .file_content(&fresh, &filename)?
            .ok_or_else(|| {
                QueueError::Conflict(format!("queue file '{filename}' missing after write"))
            })?;

        if occ::fingerprint(&verify_raw) != expected {
            return Err(QueueError::Conflict(
                "queue was modified by another process during update".to_string(),
            ));
        }
        Ok(updated)
    }

    /// Run `operation` with conflict retry: exponential backoff plus jitter
    /// between attempts, bounded by the configured maximum. Non-retryable
    /// errors (lookup and validation failures) propagate immediately.
    pub fn with_retry<T>(&self, mut operation: impl FnMut() -> Result<T>) -> Result<T> {
        let max_retries = self.config.concurrency.max_retries.max(1);
        let mut last_err: Option<QueueError> = None;

        for attempt in 0..max_retries {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    last_err = Some(err);
                    if attempt + 1 < max_retries {
                        thread::sleep(occ::retry_delay(attempt, &self.config.concurrency));
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let detail = last_err
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(QueueError::Conflict(format!(
            "operation failed after {max_retries} attempts: {detail}"
        )))
    }

    /// Claim the next pending message, safe under concurrent claimers.
    ///
    /// An initial read short-circuits when nothing is pending, avoiding a
    /// wasted write round. After a verified update the claimed record is the
    /// one now in progress under this worker's id; a concurrent claimer that
    /// won the same generation leaves this worker with `Ok(None)`.
    pub fn next_message(&self, queue: &QueueRef) -> Result<Option<Message>> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = (|| -> Result<Option<Message>> {
            let current = self.queue_content(queue)?;
            if !current
                .iter()
                .any(|message| message.status == MessageStatus::Pending)
            {
                return Ok(None);
            }

            let worker_id = self.worker_id.clone();
            let updated = self.with_retry(|| {
                self.atomic_update(queue, |mut messages| {
                    if let Some(message) = messages
                        .iter_mut()
                        .find(|message| message.status == MessageStatus::Pending)
                    {
                        message.status = MessageStatus::InProgress;
                        message.status_datetime = now_timestamp();
                        message.process = Some(worker_id.clone());
                    }
                    Ok(messages)
                })
            })?;

            Ok(updated.into_iter().find(|message| {
                message.status == MessageStatus::InProgress
                    && message.process.as_deref() == Some(self.worker_id.as_str())
            }))
        })();

        match &result {
            Ok(message) => self.log_request_status(
                request_id,
                "message.claim",
                "ok",
                started,
                Some(queue.label()),
                Some(serde_json::json!({
                    "claimed": message.as_ref().map(|m| m.id.clone()),
                })),
            ),
            Err(err) => self.log_request_error(
                request_id,
                "message.claim",
                started,
                Some(queue.label()),
                err,
                None,
            ),
        }
        result
    }

    /// Update a message by id, safe under concurrent writers. A missing id is
    /// `QueueError::NotFound` and is not retried.
    pub fn update_message(
        &self,
        queue: &QueueRef,
        message_id: &str,
        content: Option<serde_json::Value>,
        status: Option<MessageStatus>,
    ) -> Result<Message> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = (|| -> Result<Message> {
            let updated = self.with_retry(|| {
                self.atomic_update(queue, |mut messages| {
                    let message = messages
                        .iter_mut()
                        .find(|message| message.id == message_id)
                        .ok_or_else(|| {
                            QueueError::NotFound(format!("message '{message_id}' not found"))
                        })?;
                    apply_message_update(message, content.clone(), status)?;
                    Ok(messages)
                })
            })?;

            updated
                .into_iter()
                .find(|message| message.id == message_id)
                .ok_or_else(|| QueueError::NotFound(format!("message '{message_id}' not found")))
        })();

        match &result {
            Ok(message) => self.log_request_status(
                request_id,
                "message.update",
                "ok",
                started,
                Some(queue.label()),
                Some(serde_json::json!({
                    "id": message.id,
                    "status": message.status.as_str(),
                })),
            ),
            Err(err) => self.log_request_error(
                request_id,
                "message.update",
                started,
                Some(queue.label()),
                err,
                None,
            ),
        }
        result
    }
}
