/*!
 * Server Module
 * Request decoding, dispatch modes and the worker pool
 */

pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod protocol;
pub mod sink;
pub mod worker;

// Re-export public API
pub use config::{Mode, ServerConfig};
pub use dispatcher::{run_parallel, run_sequential, RunSummary, Server};
pub use handlers::{handle, Outcome};
pub use protocol::{Command, Request, RequestReader, Response, Task};
pub use sink::{JsonLineSink, MemorySink, ResponseSink};
pub use worker::{Worker, WorkerState};
