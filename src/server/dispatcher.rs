/*!
 * Dispatcher
 *
 * Sequential mode applies requests in-line on the calling thread. Parallel
 * mode runs one producer thread that decodes requests onto the lock-free
 * queue and a fixed pool of workers that drain it.
 *
 * # Shutdown
 *
 * DONE travels through the queue like any other task. The worker that
 * dequeues it raises the termination flag and stops; the others keep
 * draining until they observe the flag and an empty queue. `run` returns
 * only after every worker and the producer have been joined, so all tasks
 * enqueued ahead of DONE have been applied by then.
 */

use super::config::{Mode, ServerConfig};
use super::handlers::{handle, respond, Outcome};
use super::protocol::{Command, RequestReader, Task};
use super::sink::ResponseSink;
use super::worker::Worker;
use crate::core::errors::{ServerError, ServerResult};
use crate::core::sync::MsQueue;
use crate::feed::{Feed, Timeline};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Totals reported once a run has fully shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Requests decoded (and, in parallel mode, enqueued), DONE included
    pub received: usize,
    /// Requests applied to the feed
    pub processed: usize,
    /// Consumer threads used; 0 in sequential mode
    pub workers: usize,
}

/// A feed server owning its timeline
pub struct Server {
    config: ServerConfig,
    timeline: Timeline,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let timeline = Timeline::with_max_readers(config.max_readers);
        Self { config, timeline }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Serve requests from `input` until DONE or end of input
    pub fn run<R, S>(&self, input: R, sink: &S) -> ServerResult<RunSummary>
    where
        R: BufRead + Send,
        S: ResponseSink + ?Sized,
    {
        let summary = match self.config.mode {
            Mode::Parallel { consumers } if consumers > 0 => run_parallel(
                input,
                &self.timeline,
                sink,
                consumers,
                self.config.idle_backoff,
            )?,
            _ => run_sequential(input, &self.timeline, sink),
        };

        info!(
            received = summary.received,
            processed = summary.processed,
            workers = summary.workers,
            "server shut down"
        );
        Ok(summary)
    }
}

/// Decode and apply requests one at a time on the calling thread
pub fn run_sequential<R, F, S>(input: R, feed: &F, sink: &S) -> RunSummary
where
    R: BufRead,
    F: Feed + ?Sized,
    S: ResponseSink + ?Sized,
{
    let mut summary = RunSummary::default();

    for request in RequestReader::new(input) {
        summary.received += 1;
        match handle(feed, request) {
            Outcome::Respond(response) => {
                respond(sink, &response);
                summary.processed += 1;
            }
            Outcome::Shutdown => {
                debug!("received DONE");
                return summary;
            }
            Outcome::Ignored => debug!("ignoring unknown command"),
        }
    }

    info!("input ended without DONE");
    summary
}

/// Run one producer and `consumers` workers until every worker has stopped
pub fn run_parallel<R, F, S>(
    input: R,
    feed: &F,
    sink: &S,
    consumers: usize,
    idle_backoff: Duration,
) -> ServerResult<RunSummary>
where
    R: BufRead + Send,
    F: Feed + ?Sized,
    S: ResponseSink + ?Sized,
{
    let queue = MsQueue::new();
    let terminate = AtomicBool::new(false);
    let queue = &queue;
    let terminate = &terminate;

    info!(consumers, "starting worker pool");

    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(consumers);
        for id in 0..consumers {
            let worker = Worker::new(id, queue, feed, sink, terminate, idle_backoff);
            let name = format!("feed-worker-{}", id);
            match thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(scope, move || worker.run())
            {
                Ok(handle) => workers.push((name, handle)),
                Err(source) => {
                    // Let the workers already running drain and exit
                    terminate.store(true, Ordering::Release);
                    return Err(ServerError::ThreadSpawn { name, source });
                }
            }
        }

        let producer = match thread::Builder::new()
            .name("feed-producer".into())
            .spawn_scoped(scope, move || produce(input, queue, terminate))
        {
            Ok(handle) => handle,
            Err(source) => {
                terminate.store(true, Ordering::Release);
                return Err(ServerError::ThreadSpawn {
                    name: "feed-producer".into(),
                    source,
                });
            }
        };

        let mut summary = RunSummary {
            workers: consumers,
            ..RunSummary::default()
        };
        let mut panicked = None;

        for (name, handle) in workers {
            match handle.join() {
                Ok(processed) => summary.processed += processed,
                Err(_) => {
                    error!(worker = %name, "worker panicked");
                    if panicked.is_none() {
                        panicked = Some(name);
                    }
                }
            }
        }

        summary.received = producer
            .join()
            .map_err(|_| ServerError::WorkerPanicked("feed-producer".into()))?;

        match panicked {
            Some(name) => Err(ServerError::WorkerPanicked(name)),
            None => Ok(summary),
        }
    })
}

/// Decode requests onto the queue; returns how many were enqueued
///
/// Stops after enqueueing DONE. If input ends first, raises the termination
/// flag itself so the workers drain the queue and exit.
fn produce<R: BufRead>(input: R, queue: &MsQueue<Task>, terminate: &AtomicBool) -> usize {
    let mut enqueued = 0;

    for request in RequestReader::new(input) {
        let done = request.command == Command::Done;
        queue.enqueue(request);
        enqueued += 1;

        if done {
            debug!(enqueued, "producer enqueued DONE");
            return enqueued;
        }
    }

    info!(enqueued, "input ended without DONE; signalling workers");
    terminate.store(true, Ordering::Release);
    enqueued
}
