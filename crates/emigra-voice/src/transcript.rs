//! Incremental extraction of the caller's spoken input.

use std::fmt;

use emigra_types::SessionMessage;

/// Callback receiving the full recomputed transcript and the raw log.
pub type TranscriptSink = Box<dyn FnMut(&str, &[SessionMessage]) + Send>;

/// Surfaces the caller's cumulative spoken input to a sink without
/// reprocessing already-seen messages.
///
/// The cursor marks how much of the log has been scanned. When a scan finds
/// a new user utterance, the transcript is recomputed from the *entire* log
/// rather than appended to: the sink contract guarantees an idempotent,
/// complete transcript on every invocation.
pub struct TranscriptExtractor {
    cursor: usize,
    sink: Option<TranscriptSink>,
}

impl fmt::Debug for TranscriptExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptExtractor")
            .field("cursor", &self.cursor)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl TranscriptExtractor {
    pub fn new(sink: Option<TranscriptSink>) -> Self {
        Self { cursor: 0, sink }
    }

    /// Rewinds the cursor for a fresh session.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Processes messages appended since the previous scan.
    ///
    /// The cursor advances to the end of the log whether or not the sink
    /// fires, so no message is ever rescanned.
    pub fn scan(&mut self, log: &[SessionMessage]) {
        if log.len() <= self.cursor {
            return;
        }
        let fresh = &log[self.cursor..];
        self.cursor = log.len();

        if !fresh.iter().any(|m| m.spoken_text().is_some()) {
            return;
        }

        let transcript = log
            .iter()
            .filter_map(SessionMessage::spoken_text)
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(sink) = self.sink.as_mut() {
            sink(&transcript, log);
        }
    }
}
