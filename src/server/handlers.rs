/*!
 * Request Handlers
 * Map a decoded request onto a feed operation
 */

use super::protocol::{Command, Request, Response};
use super::sink::ResponseSink;
use crate::feed::Feed;
use crate::monitoring::span_request;
use tracing::error;

/// What the dispatcher should do after applying a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Operation applied; write this response
    Respond(Response),
    /// DONE was received
    Shutdown,
    /// Unrecognized command; nothing applied, nothing written
    Ignored,
}

/// Apply one request to the feed
pub fn handle<F>(feed: &F, request: Request) -> Outcome
where
    F: Feed + ?Sized,
{
    let Request {
        command,
        id,
        body,
        timestamp,
    } = request;

    let response = match command {
        Command::Done => return Outcome::Shutdown,
        Command::Unknown => return Outcome::Ignored,
        command => {
            let span = span_request(command, id);
            let _entered = span.enter();
            let response = match command {
                Command::Add => {
                    feed.add(body, timestamp);
                    Response::new(id, true)
                }
                Command::Remove => Response::new(id, feed.remove(timestamp)),
                Command::Contains => Response::new(id, feed.contains(timestamp)),
                _ => Response::with_feed(id, feed.feed_data()),
            };
            span.record_success(response.success);
            response
        }
    };

    Outcome::Respond(response)
}

/// Write a response; failures are logged and otherwise ignored
pub fn respond<S>(sink: &S, response: &Response)
where
    S: ResponseSink + ?Sized,
{
    if let Err(e) = sink.send(response) {
        error!(id = response.id, error = %e, "failed to send response");
    }
}
