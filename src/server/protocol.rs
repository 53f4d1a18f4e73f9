/*!
 * Wire Protocol
 * Line-delimited JSON requests in, line-delimited JSON responses out
 */

use crate::feed::FeedItem;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{error, warn};

/// Request command
///
/// Any string other than the five known commands decodes as `Unknown` and
/// is ignored by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Add,
    Remove,
    Contains,
    Feed,
    Done,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A decoded request. Fields a command doesn't use are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub command: Command,
    pub id: i64,
    pub body: String,
    pub timestamp: f64,
}

/// Unit of work carried by the queue
pub type Task = Request;

impl Request {
    pub fn add(id: i64, body: impl Into<String>, timestamp: f64) -> Self {
        Self {
            command: Command::Add,
            id,
            body: body.into(),
            timestamp,
        }
    }

    pub fn remove(id: i64, timestamp: f64) -> Self {
        Self {
            command: Command::Remove,
            id,
            timestamp,
            ..Default::default()
        }
    }

    pub fn contains(id: i64, timestamp: f64) -> Self {
        Self {
            command: Command::Contains,
            id,
            timestamp,
            ..Default::default()
        }
    }

    pub fn feed(id: i64) -> Self {
        Self {
            command: Command::Feed,
            id,
            ..Default::default()
        }
    }

    pub fn done(id: i64) -> Self {
        Self {
            command: Command::Done,
            id,
            ..Default::default()
        }
    }

    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Response written for every applied request except DONE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "feed", default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<Vec<FeedItem>>,
}

impl Response {
    pub fn new(id: i64, success: bool) -> Self {
        Self {
            success,
            id,
            feed: None,
        }
    }

    pub fn with_feed(id: i64, feed: Vec<FeedItem>) -> Self {
        Self {
            success: true,
            id,
            feed: Some(feed),
        }
    }
}

/// Iterator over the requests in a line-delimited stream
///
/// Blank lines are skipped silently, malformed lines are skipped with a
/// warning. Iteration ends at end of input or on a read error.
pub struct RequestReader<R> {
    input: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead> RequestReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RequestReader<R> {
    type Item = Request;

    fn next(&mut self) -> Option<Request> {
        loop {
            self.line.clear();
            match self.input.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "failed to read request stream");
                    return None;
                }
            }
            self.line_no += 1;

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            match Request::decode(line) {
                Ok(request) => return Some(request),
                Err(e) => {
                    warn!(line = self.line_no, error = %e, "skipping malformed request");
                }
            }
        }
    }
}
