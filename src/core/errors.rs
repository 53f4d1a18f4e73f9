/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the server
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the server shell around the core
///
/// The core itself (queue, lock, timeline) never fails; everything here
/// comes from I/O, process arguments or thread management.
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    #[error("Invalid number of consumers: {0}")]
    #[diagnostic(
        code(server::invalid_worker_count),
        help("Pass a single integer. Values <= 0 select sequential mode.")
    )]
    InvalidWorkerCount(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(server::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    #[diagnostic(code(server::encode))]
    Encode(#[from] serde_json::Error),

    #[error("Failed to spawn thread {name}: {source}")]
    #[diagnostic(
        code(server::thread_spawn),
        help("The system may be out of threads. Try fewer consumers.")
    )]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Thread {0} panicked")]
    #[diagnostic(code(server::worker_panicked))]
    WorkerPanicked(String),
}
