use std::time::Duration;

use rand::Rng;

use crate::config::ConcurrencyConfig;
use crate::error::{QueueError, Result};
use crate::models::Message;

/// Minimum backoff between conflict retries.
const MIN_RETRY_DELAY: f64 = 0.1;

/// Content fingerprint over the exact serialized bytes. The store offers no
/// compare-and-swap, so a write is verified by re-reading and comparing this
/// hash against the hash of what was written.
pub(crate) fn fingerprint(content: &str) -> blake3::Hash {
    blake3::hash(content.as_bytes())
}

/// Canonical serialization of a queue document: 2-space indentation, stable
/// field order. The verify step derives its expected fingerprint from these
/// bytes, so every writer must produce them identically.
pub(crate) fn serialize_queue(messages: &[Message]) -> Result<String> {
    serde_json::to_string_pretty(messages).map_err(QueueError::from)
}

pub(crate) fn parse_queue(raw: &str) -> Result<Vec<Message>> {
    serde_json::from_str(raw).map_err(|err| QueueError::Parse(err.to_string()))
}

/// Exponential backoff with uniform jitter for conflict retries.
/// `attempt` is 0-based; the delay doubles per attempt, is capped at
/// `retry_delay_max`, widened by +/- `jitter_factor`, and floored at 100ms.
pub(crate) fn retry_delay(attempt: u32, config: &ConcurrencyConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let capped = (config.retry_delay_base * 2f64.powi(exponent)).min(config.retry_delay_max);
    let jitter = if config.jitter_factor > 0.0 {
        rand::thread_rng().gen_range(-config.jitter_factor..=config.jitter_factor) * capped
    } else {
        0.0
    };
    Duration::from_secs_f64((capped + jitter).max(MIN_RETRY_DELAY))
}
