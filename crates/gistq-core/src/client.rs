use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::gist::{DocumentStore, GistClient};

mod atomic_service;
mod cleanup_service;
mod message_service;
mod queue_service;
mod request_log_service;

#[cfg(test)]
mod tests;

/// Facade over a document store: queue directory, message operations, the
/// optimistic-concurrency update engine, and retention cleanup.
#[derive(Clone)]
pub struct GistQueue {
    store: Arc<dyn DocumentStore>,
    config: AppConfig,
    worker_id: String,
}

impl std::fmt::Debug for GistQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistQueue")
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}

impl GistQueue {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        Self {
            store,
            config,
            worker_id: process_identifier(),
        }
    }

    /// Environment-configured instance over the GitHub Gists backend.
    pub fn from_env() -> Result<Self> {
        let config = AppConfig::from_env();
        let client = GistClient::from_env(&config.api)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Identifier recorded in the `process` field of claimed messages.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }
}

fn process_identifier() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string());
    format!("{host}:{}", std::process::id())
}
