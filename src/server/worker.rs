/*!
 * Queue Consumer
 *
 * Each worker polls the shared queue, applies tasks to the feed and stops
 * either on DONE or once the termination flag is set and the queue is empty.
 */

use super::handlers::{handle, respond, Outcome};
use super::protocol::Task;
use super::sink::ResponseSink;
use crate::core::sync::MsQueue;
use crate::feed::Feed;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Worker lifecycle. `Stopped` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopped,
}

/// A single consumer bound to the shared queue, feed, sink and flag
pub struct Worker<'a, F: ?Sized, S: ?Sized> {
    id: usize,
    queue: &'a MsQueue<Task>,
    feed: &'a F,
    sink: &'a S,
    terminate: &'a AtomicBool,
    idle_backoff: Duration,
    state: WorkerState,
    processed: usize,
}

impl<'a, F, S> Worker<'a, F, S>
where
    F: Feed + ?Sized,
    S: ResponseSink + ?Sized,
{
    pub fn new(
        id: usize,
        queue: &'a MsQueue<Task>,
        feed: &'a F,
        sink: &'a S,
        terminate: &'a AtomicBool,
        idle_backoff: Duration,
    ) -> Self {
        Self {
            id,
            queue,
            feed,
            sink,
            terminate,
            idle_backoff,
            state: WorkerState::Running,
            processed: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Tasks applied so far (DONE and ignored commands excluded)
    #[inline]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// One poll of the queue
    pub fn step(&mut self) -> WorkerState {
        if self.state == WorkerState::Stopped {
            return WorkerState::Stopped;
        }

        // Read the flag before polling: once it is observed set, an empty
        // dequeue means every task enqueued before the flag was raised is gone
        let terminating = self.terminate.load(Ordering::Acquire);

        match self.queue.dequeue() {
            Some(task) => match handle(self.feed, task) {
                Outcome::Respond(response) => {
                    respond(self.sink, &response);
                    self.processed += 1;
                }
                Outcome::Shutdown => {
                    debug!(worker = self.id, "received DONE");
                    self.terminate.store(true, Ordering::Release);
                    self.state = WorkerState::Stopped;
                }
                Outcome::Ignored => {
                    debug!(worker = self.id, "ignoring unknown command");
                }
            },
            None if terminating => {
                self.state = WorkerState::Stopped;
            }
            None => thread::sleep(self.idle_backoff),
        }

        self.state
    }

    /// Poll until stopped; returns the number of tasks applied
    pub fn run(mut self) -> usize {
        debug!(worker = self.id, "worker started");
        while self.step() == WorkerState::Running {}
        debug!(worker = self.id, processed = self.processed, "worker stopped");
        self.processed
    }
}
