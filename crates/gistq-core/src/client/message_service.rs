use std::time::Instant;

use crate::error::{QueueError, Result};
use crate::gist::DocumentStore;
use crate::models::{Message, MessageStatus, QueueRef, now_timestamp, timestamp_days_ago};
use crate::occ;

use super::GistQueue;

impl GistQueue {
    /// Append a new `pending` message to the queue.
    pub fn create_message(&self, queue: &QueueRef, content: serde_json::Value) -> Result<Message> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = (|| -> Result<Message> {
            let (document, filename) = self.resolve_queue(queue)?;
            let mut messages = self.read_queue_file(&document, &filename)?;
            let message = Message {
                id: uuid::Uuid::new_v4().to_string(),
                content,
                status: MessageStatus::Pending,
                status_datetime: now_timestamp(),
                process: None,
            };
            messages.push(message.clone());
            let serialized = occ::serialize_queue(&messages)?;
            self.store
                .update_document(&document.id, &filename, &serialized)?;
            Ok(message)
        })();

        match &result {
            Ok(message) => self.log_request_status(
                request_id,
                "message.create",
                "ok",
                started,
                Some(queue.label()),
                Some(serde_json::json!({"id": message.id})),
            ),
            Err(err) => self.log_request_error(
                request_id,
                "message.create",
                started,
                Some(queue.label()),
                err,
                None,
            ),
        }
        result
    }

    /// Messages in the queue, optionally narrowed to one status.
    pub fn list_messages(
        &self,
        queue: &QueueRef,
        status: Option<MessageStatus>,
    ) -> Result<Vec<Message>> {
        let messages = self.queue_content(queue)?;
        Ok(match status {
            Some(wanted) => messages
                .into_iter()
                .filter(|message| message.status == wanted)
                .collect(),
            None => messages,
        })
    }

    /// Claim the first pending message without conflict verification.
    ///
    /// This is plain read-mutate-write: under concurrent claimers two workers
    /// can walk away with the same message. Only use it when a single writer
    /// owns the queue; [`GistQueue::next_message`] is the checked path.
    pub fn claim_next_unchecked(&self, queue: &QueueRef) -> Result<Option<Message>> {
        let (document, filename) = self.resolve_queue(queue)?;
        let mut messages = self.read_queue_file(&document, &filename)?;

        let Some(message) = messages
            .iter_mut()
            .find(|message| message.status == MessageStatus::Pending)
        else {
            return Ok(None);
        };
        message.status = MessageStatus::InProgress;
        message.status_datetime = now_timestamp();
        message.process = Some(self.worker_id.clone());
        let claimed = message.clone();

        let serialized = occ::serialize_queue(&messages)?;
        self.store
            .update_document(&document.id, &filename, &serialized)?;
        Ok(Some(claimed))
    }

    /// Update a message in place without conflict verification. Single-writer
    /// convenience; the checked path is [`GistQueue::update_message`].
    pub fn update_message_unchecked(
        &self,
        queue: &QueueRef,
        message_id: &str,
        content: Option<serde_json::Value>,
        status: Option<MessageStatus>,
    ) -> Result<Message> {
        let (document, filename) = self.resolve_queue(queue)?;
        let mut messages = self.read_queue_file(&document, &filename)?;

        let message = messages
            .iter_mut()
            .find(|message| message.id == message_id)
            .ok_or_else(|| QueueError::NotFound(format!("message '{message_id}' not found")))?;
        apply_message_update(message, content, status)?;
        let updated = message.clone();

        let serialized = occ::serialize_queue(&messages)?;
        self.store
            .update_document(&document.id, &filename, &serialized)?;
        Ok(updated)
    }

    /// Permanently remove `complete` messages whose last status change is
    /// older than `threshold_days`. Failed messages are never collected.
    pub fn purge_completed(&self, queue: &QueueRef, threshold_days: i64) -> Result<usize> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = (|| -> Result<usize> {
            let (document, filename) = self.resolve_queue(queue)?;
            let messages = self.read_queue_file(&document, &filename)?;
            let cutoff = timestamp_days_ago(threshold_days);

            let original = messages.len();
            let retained = messages
                .into_iter()
                .filter(|message| {
                    !(message.status == MessageStatus::Complete
                        && message.status_datetime < cutoff)
                })
                .collect::<Vec<_>>();
            let removed = original - retained.len();

            if removed > 0 {
                let serialized = occ::serialize_queue(&retained)?;
                self.store
                    .update_document(&document.id, &filename, &serialized)?;
            }
            Ok(removed)
        })();

        match &result {
            Ok(removed) => self.log_request_status(
                request_id,
                "message.purge",
                "ok",
                started,
                Some(queue.label()),
                Some(serde_json::json!({
                    "threshold_days": threshold_days,
                    "removed": removed,
                })),
            ),
            Err(err) => self.log_request_error(
                request_id,
                "message.purge",
                started,
                Some(queue.label()),
                err,
                None,
            ),
        }
        result
    }
}

/// Apply a partial update. A terminal message never returns to an active
/// status; the status timestamp moves only on a status change.
pub(super) fn apply_message_update(
    message: &mut Message,
    content: Option<serde_json::Value>,
    status: Option<MessageStatus>,
) -> Result<()> {
    if let Some(value) = content {
        message.content = value;
    }
    if let Some(next) = status {
        if message.status.is_terminal() && !next.is_terminal() {
            return Err(QueueError::Validation(format!(
                "message '{}' is {} and cannot return to {next}",
                message.id, message.status
            )));
        }
        message.status = next;
        message.status_datetime = now_timestamp();
    }
    Ok(())
}
