//! Byte-stream transport for one connection.
//!
//! # Responsibilities
//! - Read fixed-size chunks into an accumulation buffer
//! - Cut one complete message (header block + declared body) off the front
//! - Keep pipelined spillover bytes for the next call
//! - Write whole responses and close the stream once
//!
//! # Design Decisions
//! - Generic over the stream, so plaintext and TLS connections share code
//! - Carriage returns are stripped from the header block only; body bytes
//!   are delivered untouched
//! - Any I/O error is terminal: callers close instead of retrying

use std::io;
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::LimitsConfig;
use crate::http::framing::{declared_content_length, find_header_end, raw_offset, strip_cr};

/// Error type for transport operations. All of them end the connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport I/O: {0}")]
    Io(#[from] io::Error),
    #[error("header block exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
    #[error("declared body of {declared} bytes exceeds {limit}")]
    BodyTooLarge { declared: usize, limit: usize },
    #[error("read timed out")]
    TimedOut,
}

/// Tunables for a [`Transport`].
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    pub read_chunk_size: usize,
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for TransportOptions {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            read_chunk_size: limits.read_chunk_size.max(1),
            max_head_bytes: limits.max_head_bytes,
            max_body_bytes: limits.max_body_bytes,
            read_timeout: (limits.read_timeout_secs > 0)
                .then(|| Duration::from_secs(limits.read_timeout_secs)),
        }
    }
}

/// One framed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Request line and header lines, carriage returns removed, without the
    /// terminating blank line.
    pub head: Bytes,
    /// Exactly `Content-Length` bytes, or empty.
    pub body: Bytes,
}

/// A connection's stream plus its read buffer.
#[derive(Debug)]
pub struct Transport<S> {
    stream: S,
    buffer: BytesMut,
    chunk: Vec<u8>,
    options: TransportOptions,
    closed: bool,
}

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a freshly accepted (and, for TLS, handshaken) stream.
    pub fn new(stream: S, options: TransportOptions) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(options.read_chunk_size),
            chunk: vec![0; options.read_chunk_size.max(1)],
            options,
            closed: false,
        }
    }

    /// Wait for the next complete message.
    ///
    /// `Ok(None)` means the peer closed the stream; a partially received
    /// message is discarded.
    pub async fn accept_request(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            if let Some(frame) = self.next_frame()? {
                return Ok(Some(frame));
            }
            if self.closed || self.read_chunk().await? == 0 {
                if !self.buffer.is_empty() {
                    tracing::trace!(discarded = self.buffer.len(), "Peer closed mid-message");
                }
                return Ok(None);
            }
        }
    }

    /// Write all of `data`.
    pub async fn send_data(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Shut the stream down. Later calls do nothing.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(error = %e, "Shutdown after close failed");
        }
    }

    /// Whether [`Transport::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    async fn read_chunk(&mut self) -> Result<usize, TransportError> {
        let read = self.stream.read(&mut self.chunk);
        let read = match self.options.read_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| TransportError::TimedOut)??,
            None => read.await?,
        };
        self.buffer.extend_from_slice(&self.chunk[..read]);
        Ok(read)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        // Blank lines between messages are ignored.
        let leading = self
            .buffer
            .iter()
            .take_while(|&&b| b == b'\r' || b == b'\n')
            .count();
        self.buffer.advance(leading);
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let limit = self.options.max_head_bytes;
        // A head within the limit can be at most doubled by carriage returns.
        let window = self.buffer.len().min(limit.saturating_mul(2).saturating_add(4));
        let stripped = strip_cr(&self.buffer[..window]);

        let Some(head_end) = find_header_end(&stripped) else {
            // Raw length matters too: carriage returns never reach `stripped`.
            if stripped.len() > limit || self.buffer.len() > window {
                return Err(TransportError::HeadTooLarge { limit });
            }
            return Ok(None);
        };
        if head_end > limit {
            return Err(TransportError::HeadTooLarge { limit });
        }

        let head = &stripped[..head_end];
        // Conflicting lengths leave the body unframed; the parser rejects the head.
        let body_len = declared_content_length(head).ok().flatten().unwrap_or(0);
        if body_len > self.options.max_body_bytes {
            return Err(TransportError::BodyTooLarge {
                declared: body_len,
                limit: self.options.max_body_bytes,
            });
        }

        let head_len = raw_offset(&self.buffer, head_end + 2);
        if self.buffer.len() < head_len + body_len {
            return Ok(None);
        }

        let head = Bytes::copy_from_slice(head);
        self.buffer.advance(head_len);
        let body = self.buffer.split_to(body_len).freeze();
        Ok(Some(Frame { head, body }))
    }
}
