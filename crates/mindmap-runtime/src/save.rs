#![forbid(unsafe_code)]

//! Persistence hooks.
//!
//! The engine never blocks on storage. After each commit it hands the
//! re-nested document to a [`SaveSink`]; failures are logged and the
//! in-memory state stays as committed. A [`SaveDebouncer`] can sit in
//! between so a burst of edits produces a single write.

use std::fmt;
use std::path::PathBuf;

use mindmap_core::{CodecError, PersistedDocument};
use web_time::{Duration, Instant};

/// Why a save did not reach storage.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Encode(CodecError),
    /// Backend-specific failure described by the sink.
    Rejected(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "save I/O error: {e}"),
            Self::Encode(e) => write!(f, "save encode error: {e}"),
            Self::Rejected(reason) => write!(f, "save rejected: {reason}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Rejected(_) => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CodecError> for SaveError {
    fn from(err: CodecError) -> Self {
        Self::Encode(err)
    }
}

/// Destination for committed documents.
pub trait SaveSink {
    fn save(&mut self, document: &PersistedDocument) -> Result<(), SaveError>;
}

impl<F> SaveSink for F
where
    F: FnMut(&PersistedDocument) -> Result<(), SaveError>,
{
    fn save(&mut self, document: &PersistedDocument) -> Result<(), SaveError> {
        self(document)
    }
}

/// Writes pretty JSON to a file, replacing it on each save.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SaveSink for JsonFileSink {
    fn save(&mut self, document: &PersistedDocument) -> Result<(), SaveError> {
        let json = document.to_json_pretty()?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Hand `document` to `sink`, logging instead of propagating failures.
///
/// Returns whether the save succeeded.
pub fn save_or_log(sink: &mut dyn SaveSink, document: &PersistedDocument) -> bool {
    match sink.save(document) {
        Ok(()) => {
            tracing::trace!(target: "mindmap.save", root_id = %document.root.id, "document saved");
            true
        }
        Err(err) => {
            tracing::warn!(
                target: "mindmap.save",
                root_id = %document.root.id,
                error = %err,
                "save failed; in-memory state kept"
            );
            false
        }
    }
}

/// Coalesces saves until the document has been quiet for a fixed period.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    pending: Option<(PersistedDocument, Instant)>,
}

impl SaveDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending document and restart the quiet period at `now`.
    pub fn schedule(&mut self, document: PersistedDocument, now: Instant) {
        self.pending = Some((document, now));
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending document becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Release the pending document if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<PersistedDocument> {
        let due = self
            .deadline()
            .is_some_and(|deadline| now >= deadline);
        if due {
            self.pending.take().map(|(document, _)| document)
        } else {
            None
        }
    }

    /// Release the pending document immediately.
    pub fn flush(&mut self) -> Option<PersistedDocument> {
        self.pending.take().map(|(document, _)| document)
    }
}
