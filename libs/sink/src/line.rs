//! Newline-delimited JSON sink over any append-capable writer.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use smexport_events::EventRecord;
use tracing::debug;

use crate::error::SinkError;

/// Append-only destination for records.
///
/// Implementations serialize concurrent writers so lines never interleave.
pub trait Sink: Send + Sync {
    /// Appends one record and makes it visible to readers before returning.
    ///
    /// A failed write leaves the sink open for the next record.
    fn write(&self, record: &EventRecord) -> Result<(), SinkError>;

    /// Releases the destination. Calling it more than once is a no-op.
    fn close(&self);
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write(&self, record: &EventRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn write(&self, record: &EventRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn close(&self) {
        (**self).close()
    }
}

/// How far each write is pushed before `write` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Flush userspace buffers so readers tailing the destination see the line.
    #[default]
    Flush,
    /// Flush and then sync file data to stable storage.
    Data,
}

impl std::str::FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flush" => Ok(SyncPolicy::Flush),
            "data" => Ok(SyncPolicy::Data),
            other => Err(format!("unknown sync policy: {other}")),
        }
    }
}

/// A writer that records can be appended to.
pub trait AppendTarget: Write + Send {
    /// Pushes written data to stable storage. Writers without such a notion
    /// keep the default no-op.
    fn sync_data(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AppendTarget for std::fs::File {
    fn sync_data(&mut self) -> io::Result<()> {
        std::fs::File::sync_data(self)
    }
}

impl AppendTarget for io::Stderr {}

impl AppendTarget for Vec<u8> {}

/// Writes each record as one JSON line through a mutex-guarded writer.
pub struct LineSink<W> {
    destination: String,
    sync: SyncPolicy,
    state: Mutex<Option<OpenWriter<W>>>,
}

struct OpenWriter<W> {
    writer: W,
    /// A failed write left part of a line without its newline.
    torn: bool,
}

/// Like `write_all`, but counts the bytes accepted before an error.
fn write_counted<W: Write>(writer: &mut W, buf: &[u8], written: &mut usize) -> io::Result<()> {
    while *written < buf.len() {
        match writer.write(&buf[*written..]) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => *written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

impl<W: AppendTarget> LineSink<W> {
    /// Wraps an already-open writer. `destination` labels errors and logs.
    pub fn new(destination: impl Into<String>, writer: W, sync: SyncPolicy) -> Self {
        Self {
            destination: destination.into(),
            sync,
            state: Mutex::new(Some(OpenWriter {
                writer,
                torn: false,
            })),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Appends a pre-encoded line. The caller supplies the trailing newline.
    ///
    /// If an earlier write stopped partway through a line, that fragment is
    /// terminated first so this line starts on its own.
    pub fn write_line(&self, line: &[u8]) -> Result<(), SinkError> {
        let mut guard = self.lock();
        let open = guard.as_mut().ok_or_else(|| SinkError::Closed {
            destination: self.destination.clone(),
        })?;

        let resynced: Vec<u8>;
        let buf = if open.torn {
            resynced = [b"\n".as_slice(), line].concat();
            resynced.as_slice()
        } else {
            line
        };

        // One buffer per line so O_APPEND destinations receive whole records.
        let mut written = 0;
        let result = write_counted(&mut open.writer, buf, &mut written);
        if written > 0 {
            open.torn = written < buf.len();
        }
        if open.torn {
            debug!(destination = %self.destination, written, "partial line left in output");
        }

        let result = result.and_then(|()| open.writer.flush());
        let result = match (result, self.sync) {
            (Ok(()), SyncPolicy::Data) => open.writer.sync_data(),
            (result, _) => result,
        };
        result.map_err(|source| SinkError::WriteFailed {
            destination: self.destination.clone(),
            source,
        })
    }

    /// Closes the sink and hands back the writer, if it was still open.
    pub fn into_inner(self) -> Option<W> {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|open| open.writer)
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenWriter<W>>> {
        // A panic inside a writer must not wedge every later event.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: AppendTarget> Sink for LineSink<W> {
    fn write(&self, record: &EventRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.write_line(&line)
    }

    fn close(&self) {
        let Some(mut open) = self.lock().take() else {
            return;
        };
        if let Err(error) = open.writer.flush() {
            debug!(destination = %self.destination, %error, "flush on close failed");
        }
        debug!(destination = %self.destination, "sink closed");
    }
}

impl<W> std::fmt::Debug for LineSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSink")
            .field("destination", &self.destination)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
