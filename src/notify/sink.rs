//! # Subscriber transport seam and the SSE framing adapter.
//!
//! [`EventSink`] is what the notification bus writes into: named events with
//! a serialized payload, plus raw comment lines (connected marker). Writes
//! must flush incrementally so partial output reaches the remote party before
//! the stream ends.
//!
//! [`SseWriter`] is the shipped implementation: Server-Sent-Events framing
//! over any `AsyncWrite`.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Transport endpoint for one subscriber.
///
/// Implementations may be slow; the bus isolates them behind a per-subscriber
/// queue, so a stalled sink never affects other subscribers. A write error
/// ends the owning subscription only.
#[async_trait]
pub trait EventSink: Send + 'static {
    /// Writes one named event with its serialized payload and flushes.
    async fn send_event(&mut self, event: &str, data: &str) -> io::Result<()>;

    /// Writes a raw comment line (ignored by SSE clients) and flushes.
    async fn send_comment(&mut self, text: &str) -> io::Result<()>;
}

/// SSE framing over an `AsyncWrite`.
///
/// Each event becomes:
/// ```text
/// event: <name>
/// data: <payload>
///
/// ```
/// and each comment a `:`-prefixed line. Every message is flushed
/// immediately so the remote side sees incremental progress.
pub struct SseWriter<W> {
    out: W,
}

impl<W> SseWriter<W> {
    /// Wraps the given writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W> EventSink for SseWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send_event(&mut self, event: &str, data: &str) -> io::Result<()> {
        let frame = format!("event: {event}\ndata: {data}\n\n");
        self.out.write_all(frame.as_bytes()).await?;
        self.out.flush().await
    }

    async fn send_comment(&mut self, text: &str) -> io::Result<()> {
        let frame = format!(":{text}\n\n");
        self.out.write_all(frame.as_bytes()).await?;
        self.out.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sse_framing() {
        let mut sink = SseWriter::new(Vec::new());
        sink.send_comment("connected 2026-01-01T00:00:00Z")
            .await
            .expect("vec write succeeds");
        sink.send_event("availability-update", "{\"count\":0}")
            .await
            .expect("vec write succeeds");

        let out = String::from_utf8(sink.into_inner()).expect("utf8 output");
        assert_eq!(
            out,
            ":connected 2026-01-01T00:00:00Z\n\nevent: availability-update\ndata: {\"count\":0}\n\n"
        );
    }
}
