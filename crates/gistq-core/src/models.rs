use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::gist::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Terminal statuses never transition back to an active one.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = QueueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            other => Err(QueueError::Parse(format!("unknown message status: {other}"))),
        }
    }
}

/// One record in a queue document. `status_datetime` is kept as the serialized
/// fixed-width UTC string so that lexicographic comparison is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: serde_json::Value,
    pub status: MessageStatus,
    pub status_datetime: String,
    #[serde(default)]
    pub process: Option<String>,
}

/// How a caller addresses a queue: by human name, by raw document id, or by an
/// already-resolved document handle.
#[derive(Debug, Clone)]
pub enum QueueRef {
    Name(String),
    Id(String),
    Handle(Document),
}

impl QueueRef {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn label(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Id(id) => id.clone(),
            Self::Handle(document) => document.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueCleanup {
    pub name: String,
    /// Messages removed, or `None` when cleanup of this queue failed.
    pub deleted: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub queues: Vec<QueueCleanup>,
}

impl CleanupReport {
    pub fn total_deleted(&self) -> u64 {
        self.queues.iter().filter_map(|entry| entry.deleted).sum()
    }

    pub fn failed_queues(&self) -> usize {
        self.queues
            .iter()
            .filter(|entry| entry.deleted.is_none())
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub request_id: String,
    pub operation: String,
    pub status: String,
    pub latency_ms: u128,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Current UTC time in the fixed-width format stored in queue documents.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Retention cutoff: `days` before now, in the same fixed-width format, so
/// plain string comparison against stored timestamps is chronological.
pub(crate) fn timestamp_days_ago(days: i64) -> String {
    (Utc::now() - chrono::Duration::days(days)).to_rfc3339_opts(SecondsFormat::Micros, true)
}
