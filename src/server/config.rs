/*!
 * Server Configuration
 *
 * Runtime configuration for dispatch mode and lock/worker tunables
 */

use crate::core::errors::{ServerError, ServerResult};
use crate::core::limits::{
    CONSUMER_IDLE_BACKOFF, DEFAULT_MAX_READERS, ENV_IDLE_BACKOFF_US, ENV_MAX_READERS,
};
use std::time::Duration;
use tracing::warn;

/// Dispatch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decode and apply requests on the calling thread
    Sequential,
    /// One producer thread feeding `consumers` worker threads
    Parallel { consumers: usize },
}

impl Mode {
    /// Non-positive counts select sequential mode
    pub fn from_worker_count(count: i64) -> Self {
        match usize::try_from(count) {
            Ok(consumers) if consumers > 0 => Mode::Parallel { consumers },
            _ => Mode::Sequential,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: Mode,
    /// Reader cap of the timeline's lock
    pub max_readers: usize,
    /// Sleep between polls of an empty queue
    pub idle_backoff: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

impl ServerConfig {
    pub const fn sequential() -> Self {
        Self {
            mode: Mode::Sequential,
            max_readers: DEFAULT_MAX_READERS,
            idle_backoff: CONSUMER_IDLE_BACKOFF,
        }
    }

    pub fn parallel(consumers: usize) -> Self {
        let mode = if consumers > 0 {
            Mode::Parallel { consumers }
        } else {
            Mode::Sequential
        };
        Self {
            mode,
            ..Self::sequential()
        }
    }

    /// Build from process arguments (program name excluded)
    ///
    /// Only the first argument is read: absent or `<= 0` selects sequential
    /// mode, a positive integer the number of consumers.
    pub fn from_args<I>(args: I) -> ServerResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mode = match args.into_iter().next() {
            None => Mode::Sequential,
            Some(arg) => {
                let count = arg
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ServerError::InvalidWorkerCount(arg.clone()))?;
                Mode::from_worker_count(count)
            }
        };

        Ok(Self {
            mode,
            ..Self::sequential()
        })
    }

    /// Apply `FEED_MAX_READERS` and `FEED_IDLE_BACKOFF_US` if set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_MAX_READERS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.max_readers = n,
                Err(e) => warn!(var = ENV_MAX_READERS, value = %raw, error = %e, "ignoring invalid override"),
            }
        }

        if let Some(raw) = lookup(ENV_IDLE_BACKOFF_US) {
            match raw.trim().parse::<u64>() {
                Ok(us) => self.idle_backoff = Duration::from_micros(us),
                Err(e) => warn!(var = ENV_IDLE_BACKOFF_US, value = %raw, error = %e, "ignoring invalid override"),
            }
        }

        self
    }

    pub fn with_max_readers(mut self, max_readers: usize) -> Self {
        self.max_readers = max_readers;
        self
    }

    pub fn with_idle_backoff(mut self, idle_backoff: Duration) -> Self {
        self.idle_backoff = idle_backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mode_from_args() {
        assert_eq!(ServerConfig::from_args(args(&[])).unwrap().mode, Mode::Sequential);
        assert_eq!(ServerConfig::from_args(args(&["0"])).unwrap().mode, Mode::Sequential);
        assert_eq!(ServerConfig::from_args(args(&["-2"])).unwrap().mode, Mode::Sequential);
        assert_eq!(
            ServerConfig::from_args(args(&["4", "ignored"])).unwrap().mode,
            Mode::Parallel { consumers: 4 }
        );
    }

    #[test]
    fn test_invalid_worker_count() {
        let err = ServerConfig::from_args(args(&["four"])).unwrap_err();
        assert!(matches!(err, ServerError::InvalidWorkerCount(ref s) if s == "four"));
    }

    #[test]
    fn test_parallel_zero_is_sequential() {
        assert_eq!(ServerConfig::parallel(0).mode, Mode::Sequential);
        assert_eq!(ServerConfig::parallel(3).mode, Mode::Parallel { consumers: 3 });
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::default().with_overrides_from(|key| match key {
            ENV_MAX_READERS => Some("8".into()),
            ENV_IDLE_BACKOFF_US => Some("250".into()),
            _ => None,
        });
        assert_eq!(config.max_readers, 8);
        assert_eq!(config.idle_backoff, Duration::from_micros(250));
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let config = ServerConfig::default().with_overrides_from(|_| Some("lots".into()));
        assert_eq!(config.max_readers, DEFAULT_MAX_READERS);
        assert_eq!(config.idle_backoff, CONSUMER_IDLE_BACKOFF);
    }
}
