use std::path::PathBuf;
use std::time::Duration;

mod env;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Naming convention for queue documents.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub description_prefix: String,
    pub default_queue: String,
    pub file_extension: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            description_prefix: "Queue:".to_string(),
            default_queue: "default".to_string(),
            file_extension: "json".to_string(),
        }
    }
}

impl QueueConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            description_prefix: env::read_non_empty_env("GIST_DESCRIPTION_PREFIX")
                .unwrap_or(defaults.description_prefix),
            default_queue: env::read_non_empty_env("DEFAULT_QUEUE_NAME")
                .unwrap_or(defaults.default_queue),
            file_extension: env::read_non_empty_env("DEFAULT_FILE_EXTENSION")
                .unwrap_or(defaults.file_extension),
        }
    }
}

/// Transport-level settings for the document store client. Retries here cover
/// network failures and rate limiting, not update conflicts.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub retry_count: u32,
    pub retry_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::read_non_empty_env("GIST_API_URL").unwrap_or(defaults.base_url),
            retry_count: env::read_env_u32("API_RETRY_COUNT").unwrap_or(defaults.retry_count),
            retry_delay: env::read_env_u64("API_RETRY_DELAY")
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub threshold_days: i64,
    pub interval: Duration,
    pub auto_start: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            threshold_days: 1,
            interval: Duration::from_secs(3600),
            auto_start: false,
        }
    }
}

impl CleanupConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            threshold_days: env::read_env_i64("CLEANUP_THRESHOLD_DAYS")
                .unwrap_or(defaults.threshold_days),
            interval: env::read_env_u64("CLEANUP_INTERVAL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            auto_start: env::parse_enabled_default_false(
                std::env::var("CLEANUP_AUTO_START").ok().as_deref(),
            ),
        }
    }
}

/// Conflict-retry tuning for the optimistic update loop. Delays are in
/// seconds; the computed delay never drops below 100ms.
#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    pub max_retries: u32,
    pub retry_delay_base: f64,
    pub retry_delay_max: f64,
    pub jitter_factor: f64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_base: 1.0,
            retry_delay_max: 5.0,
            jitter_factor: 0.1,
        }
    }
}

impl ConcurrencyConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env::read_env_u32("CONCURRENCY_MAX_RETRIES")
                .unwrap_or(defaults.max_retries),
            retry_delay_base: env::read_env_f64("CONCURRENCY_RETRY_DELAY_BASE")
                .unwrap_or(defaults.retry_delay_base),
            retry_delay_max: env::read_env_f64("CONCURRENCY_RETRY_DELAY_MAX")
                .unwrap_or(defaults.retry_delay_max),
            jitter_factor: env::read_env_f64("CONCURRENCY_JITTER_FACTOR")
                .unwrap_or(defaults.jitter_factor),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub queue: QueueConfig,
    pub api: ApiConfig,
    pub cleanup: CleanupConfig,
    pub concurrency: ConcurrencyConfig,
    /// JSONL request log destination; absent disables request logging.
    pub request_log: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            queue: QueueConfig::from_env(),
            api: ApiConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
            concurrency: ConcurrencyConfig::from_env(),
            request_log: env::read_non_empty_env("GISTQUEUE_REQUEST_LOG").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.queue.description_prefix, "Queue:");
        assert_eq!(config.queue.default_queue, "default");
        assert_eq!(config.queue.file_extension, "json");
        assert_eq!(config.api.retry_count, 3);
        assert_eq!(config.api.retry_delay, Duration::from_secs(1));
        assert_eq!(config.cleanup.threshold_days, 1);
        assert_eq!(config.cleanup.interval, Duration::from_secs(3600));
        assert!(!config.cleanup.auto_start);
        assert_eq!(config.concurrency.max_retries, 3);
        assert_eq!(config.concurrency.retry_delay_base, 1.0);
        assert_eq!(config.concurrency.retry_delay_max, 5.0);
        assert_eq!(config.concurrency.jitter_factor, 0.1);
        assert!(config.request_log.is_none());
    }
}
