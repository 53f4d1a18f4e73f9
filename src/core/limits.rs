/*!
 * Server Limits and Constants
 *
 * Centralized location for tunables shared by the lock, the queue
 * consumers and the dispatcher.
 */

use std::time::Duration;

// =============================================================================
// SYNCHRONIZATION LIMITS
// =============================================================================

/// Default cap on concurrent readers holding a `BoundedRwLock`
pub const DEFAULT_MAX_READERS: usize = 32;

/// Smallest reader cap a lock accepts; a cap of 0 would deadlock every reader
pub const MIN_MAX_READERS: usize = 1;

// =============================================================================
// WORKER POOL
// =============================================================================

/// Sleep between polls when a consumer finds the queue empty
/// [PERF] Keeps idle workers off the CPU while preserving polling latency
pub const CONSUMER_IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Requests slower than this are logged at warn level
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(10);

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Overrides `DEFAULT_MAX_READERS`
pub const ENV_MAX_READERS: &str = "FEED_MAX_READERS";

/// Overrides `CONSUMER_IDLE_BACKOFF`, in microseconds
pub const ENV_IDLE_BACKOFF_US: &str = "FEED_IDLE_BACKOFF_US";

/// Enables JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "FEED_TRACE_JSON";
