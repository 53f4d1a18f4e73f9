/*!
 * Response Sinks
 */

use super::protocol::Response;
use crate::core::errors::ServerResult;
use parking_lot::Mutex;
use std::io::Write;

/// Destination for responses, shared by every worker
pub trait ResponseSink: Send + Sync {
    fn send(&self, response: &Response) -> ServerResult<()>;
}

/// Writes each response as one JSON line and flushes it
///
/// Writes are serialized so lines from different workers never interleave.
pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> ResponseSink for JsonLineSink<W> {
    fn send(&self, response: &Response) -> ServerResult<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, response)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Collects responses in memory
#[derive(Default)]
pub struct MemorySink {
    responses: Mutex<Vec<Response>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.responses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.lock().is_empty()
    }

    pub fn take(&self) -> Vec<Response> {
        std::mem::take(&mut *self.responses.lock())
    }
}

impl ResponseSink for MemorySink {
    fn send(&self, response: &Response) -> ServerResult<()> {
        self.responses.lock().push(response.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_sink_writes_lines() {
        let sink = JsonLineSink::new(Vec::new());
        sink.send(&Response::new(1, true)).unwrap();
        sink.send(&Response::new(2, false)).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"Success\":true,\"ID\":1}\n{\"Success\":false,\"ID\":2}\n"
        );
    }

    #[test]
    fn test_memory_sink_take() {
        let sink = MemorySink::new();
        sink.send(&Response::new(1, true)).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.take(), vec![Response::new(1, true)]);
        assert!(sink.is_empty());
    }
}
