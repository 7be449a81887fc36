//! Destination strings and how they are opened.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::SinkError;
use crate::line::{AppendTarget, LineSink, SyncPolicy};

const FILE_SCHEME: &str = "file://";
const STDERR_SCHEME: &str = "stderr://";

/// Where records are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A regular file opened in append mode.
    File(PathBuf),
    /// The process standard error stream.
    Stderr,
}

impl Destination {
    /// Parses a destination string.
    ///
    /// Accepts a plain path, `file://<path>`, `-` or `stderr://`. Any other
    /// `<scheme>://` is rejected.
    pub fn parse(s: &str) -> Result<Self, SinkError> {
        if s.is_empty() {
            return Err(SinkError::DestinationUnavailable {
                destination: s.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty destination"),
            });
        }
        if s == "-" || s == STDERR_SCHEME {
            return Ok(Destination::Stderr);
        }
        if let Some(path) = s.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(SinkError::DestinationUnavailable {
                    destination: s.to_string(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "empty file path"),
                });
            }
            return Ok(Destination::File(PathBuf::from(path)));
        }
        if let Some(scheme) = uri_scheme(s) {
            return Err(SinkError::UnsupportedScheme {
                destination: s.to_string(),
                scheme: scheme.to_string(),
            });
        }
        Ok(Destination::File(PathBuf::from(s)))
    }

    /// Opens the destination for appending.
    ///
    /// Files are created when missing, parent directories are not.
    pub fn open(&self, sync: SyncPolicy) -> Result<LineSink<Output>, SinkError> {
        let output = match self {
            Destination::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| SinkError::DestinationUnavailable {
                        destination: self.to_string(),
                        source,
                    })?;
                Output::File(file)
            }
            Destination::Stderr => Output::Stderr(io::stderr()),
        };
        Ok(LineSink::new(self.to_string(), output, sync))
    }
}

/// Returns the scheme of `s` if it starts with `<scheme>://`.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// so relative paths that merely contain `://` are not mistaken for URIs.
fn uri_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

impl std::str::FromStr for Destination {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Destination::parse(s)
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::File(path) => write!(f, "{}", path.display()),
            Destination::Stderr => write!(f, "stderr"),
        }
    }
}

/// An opened destination stream.
#[derive(Debug)]
pub enum Output {
    File(File),
    Stderr(io::Stderr),
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::File(f) => f.write(buf),
            Output::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::File(f) => f.flush(),
            Output::Stderr(s) => s.flush(),
        }
    }
}

impl AppendTarget for Output {
    fn sync_data(&mut self) -> io::Result<()> {
        match self {
            Output::File(f) => f.sync_data(),
            Output::Stderr(_) => Ok(()),
        }
    }
}

/// A sink opened from a [`Destination`].
pub type DestinationSink = LineSink<Output>;

/// Parses and opens `destination` in one step.
pub fn open(destination: &str, sync: SyncPolicy) -> Result<DestinationSink, SinkError> {
    Destination::parse(destination)?.open(sync)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Sink;

    #[test]
    fn test_parse_plain_path() {
        assert_eq!(
            Destination::parse("/var/log/events.log").unwrap(),
            Destination::File(PathBuf::from("/var/log/events.log"))
        );
        assert_eq!(
            Destination::parse("relative/events.log").unwrap(),
            Destination::File(PathBuf::from("relative/events.log"))
        );
    }

    #[test]
    fn test_parse_file_uri() {
        assert_eq!(
            Destination::parse("file:///tmp/events.log").unwrap(),
            Destination::File(PathBuf::from("/tmp/events.log"))
        );
        assert!(Destination::parse("file://").is_err());
    }

    #[test]
    fn test_parse_stderr() {
        assert_eq!(Destination::parse("-").unwrap(), Destination::Stderr);
        assert_eq!(Destination::parse("stderr://").unwrap(), Destination::Stderr);
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = Destination::parse("udp://collector:514").unwrap_err();
        assert_eq!(err.reason_code(), "unsupported_scheme");
        assert!(err.is_open_error());
    }

    #[test]
    fn test_parse_path_containing_separator() {
        assert_eq!(
            Destination::parse("logs/a://b").unwrap(),
            Destination::File(PathBuf::from("logs/a://b"))
        );
        assert_eq!(
            Destination::parse("://events.log").unwrap(),
            Destination::File(PathBuf::from("://events.log"))
        );
        let err = Destination::parse("svc+tcp://collector").unwrap_err();
        assert!(matches!(
            err,
            SinkError::UnsupportedScheme { ref scheme, .. } if scheme == "svc+tcp"
        ));
    }

    #[test]
    fn test_open_stderr_accepts_writes() {
        let sink = Destination::parse("stderr://")
            .unwrap()
            .open(SyncPolicy::Data)
            .unwrap();
        sink.write_line(b"{\"event\":\"SUBNET_UP\"}\n").unwrap();
        sink.close();
        assert!(sink.is_closed());
        assert!(sink.into_inner().is_none());
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = Destination::parse("").unwrap_err();
        assert_eq!(err.reason_code(), "destination_unavailable");
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("events.log");

        let err = Destination::File(path)
            .open(SyncPolicy::Flush)
            .unwrap_err();
        assert!(matches!(err, SinkError::DestinationUnavailable { .. }));
        assert!(!dir.path().join("missing").exists());
    }
}
