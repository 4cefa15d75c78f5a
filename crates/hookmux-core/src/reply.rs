//! Output sink for handler replies.

use bytes::{Bytes, BytesMut};
use std::{fmt, io};

/// Default initial reply capacity.
const DEFAULT_REPLY_CAPACITY: usize = 512;

/// Bytes a handler sends back to the platform.
///
/// An empty reply is meaningful: it tells the platform there is no answer.
#[derive(Debug, Default, Clone)]
pub struct Reply {
    buf: BytesMut,
}

impl Reply {
    /// Create an empty reply.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLY_CAPACITY)
    }

    /// Create an empty reply with a specific capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, data: impl AsRef<[u8]>) {
        self.buf.extend_from_slice(data.as_ref());
    }

    /// Append a string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s);
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the reply, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl io::Write for Reply {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Reply {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
