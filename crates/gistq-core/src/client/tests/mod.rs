use std::sync::Arc;

use super::GistQueue;
use crate::config::{AppConfig, ConcurrencyConfig};
use crate::memory::MemoryStore;
use crate::models::QueueRef;

mod message_lifecycle;

/// Config with near-zero retry delays so conflict tests stay fast.
fn fast_config() -> AppConfig {
    AppConfig {
        concurrency: ConcurrencyConfig {
            max_retries: 3,
            retry_delay_base: 0.0,
            retry_delay_max: 0.1,
            jitter_factor: 0.0,
        },
        ..AppConfig::default()
    }
}

fn memory_queue() -> (GistQueue, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let queue = GistQueue::new(store.clone(), fast_config());
    (queue, store)
}

/// Rewrite one message's status timestamp, bypassing the normal transitions,
/// to simulate records that aged past a retention cutoff.
fn set_status_datetime(
    queue: &GistQueue,
    queue_ref: &QueueRef,
    message_id: &str,
    timestamp: &str,
) {
    let updated = queue
        .queue_content(queue_ref)
        .expect("content")
        .into_iter()
        .map(|mut message| {
            if message.id == message_id {
                message.status_datetime = timestamp.to_string();
            }
            message
        })
        .collect::<Vec<_>>();
    queue
        .atomic_update(queue_ref, move |_| Ok(updated.clone()))
        .expect("backdate");
}
