//! Chunked progress reporting and cooperative cancellation.
//!
//! Both the classification pass and the execution pass take a
//! [`RunControl`]. They poll [`RunControl::is_canceled`] before each check
//! and report every processed check through [`RunControl::check_processed`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Which pass a progress notification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Classification,
    Execution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Classification => f.write_str("classifying"),
            Phase::Execution => f.write_str("running"),
        }
    }
}

/// A completed chunk of checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub phase: Phase,
    /// Checks processed so far in this phase
    pub checks_completed: usize,
    /// Checks in this chunk; smaller than the chunk size only for the last one
    pub checks_in_chunk: usize,
    pub total_checks: usize,
}

/// Progress sink and cancellation flag for one pass.
pub struct RunControl<'a> {
    chunk_size: usize,
    cancel: Option<&'a AtomicBool>,
    on_chunk: Option<Box<dyn FnMut(ChunkProgress) + 'a>>,
}

impl<'a> RunControl<'a> {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            cancel: None,
            on_chunk: None,
        }
    }

    /// No progress reporting, never canceled.
    pub fn unattended() -> Self {
        Self::new(usize::MAX)
    }

    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, on_chunk: impl FnMut(ChunkProgress) + 'a) -> Self {
        self.on_chunk = Some(Box::new(on_chunk));
        self
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Record that `completed` of `total` checks are done; emits when a
    /// chunk fills up.
    pub fn check_processed(&mut self, phase: Phase, completed: usize, total: usize) {
        if completed % self.chunk_size == 0 {
            self.emit(phase, completed, self.chunk_size, total);
        }
    }

    /// Emit the trailing partial chunk, if any, once a pass ran to the end.
    pub fn phase_finished(&mut self, phase: Phase, completed: usize, total: usize) {
        let rest = completed % self.chunk_size;
        if rest > 0 {
            self.emit(phase, completed, rest, total);
        }
    }

    fn emit(&mut self, phase: Phase, completed: usize, in_chunk: usize, total: usize) {
        if let Some(cb) = self.on_chunk.as_mut() {
            cb(ChunkProgress {
                phase,
                checks_completed: completed,
                checks_in_chunk: in_chunk,
                total_checks: total,
            });
        }
    }
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
