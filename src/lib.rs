/*!
 * Feed Server Library
 * Concurrent timeline server: lock-free task queue, bounded reader/writer
 * lock and a polling worker pool
 */

pub mod core;
pub mod feed;
pub mod monitoring;
pub mod server;

// Re-exports
pub use crate::core::errors::{ServerError, ServerResult};
pub use crate::core::sync::{BoundedRwLock, LockState, MsQueue};
pub use feed::{Feed, FeedItem, Timeline};
pub use monitoring::init_tracing;
pub use server::{
    Command, JsonLineSink, MemorySink, Mode, Request, Response, ResponseSink, RunSummary, Server,
    ServerConfig,
};
