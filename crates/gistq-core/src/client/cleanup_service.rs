use std::time::Instant;

use crate::error::Result;
use crate::models::{CleanupReport, QueueCleanup, QueueRef};

use super::GistQueue;

impl GistQueue {
    /// Purge one queue using the configured retention threshold.
    pub fn cleanup_queue(&self, name: &str) -> Result<usize> {
        self.purge_completed(
            &QueueRef::name(name),
            self.config.cleanup.threshold_days,
        )
    }

    /// One retention pass over every queue. A queue that fails to clean is
    /// recorded with `deleted: None` and does not abort the rest of the pass.
    pub fn cleanup_all_queues(&self) -> Result<CleanupReport> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = (|| -> Result<CleanupReport> {
            let queues = self.list_queues()?;
            let mut report = CleanupReport::default();
            for queue in queues {
                let deleted = self
                    .cleanup_queue(&queue.name)
                    .ok()
                    .map(|removed| removed as u64);
                report.queues.push(QueueCleanup {
                    name: queue.name,
                    deleted,
                });
            }
            Ok(report)
        })();

        match &result {
            Ok(report) => self.log_request_status(
                request_id,
                "cleanup.all",
                "ok",
                started,
                None,
                Some(serde_json::json!({
                    "queues": report.queues.len(),
                    "deleted": report.total_deleted(),
                    "failed": report.failed_queues(),
                })),
            ),
            Err(err) => {
                self.log_request_error(request_id, "cleanup.all", started, None, err, None);
            }
        }
        result
    }
}
