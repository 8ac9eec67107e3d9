//! Console progress reporting for long feature loops.

use std::io::{self, Write};

/// Receives progress updates while features are processed.
pub trait ProgressReporter {
    /// Called after `done` of `total` items have been processed.
    fn update(&mut self, done: usize, total: usize);

    /// Called once after the last update.
    fn finish(&mut self);
}

/// Writes a single, carriage-return refreshed percentage line.
///
/// ```text
/// Processing features: 42.00% complete
/// ```
#[derive(Debug)]
pub struct ConsoleProgress<W: Write> {
    writer: W,
}

impl ConsoleProgress<io::Stdout> {
    /// Progress line on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the reporter and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = done as f64 / total as f64 * 100.0;
        // Best effort.
        let _ = write!(self.writer, "\rProcessing features: {percent:.2}% complete");
        let _ = self.writer.flush();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.writer);
        let _ = self.writer.flush();
    }
}

/// Discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn update(&mut self, _done: usize, _total: usize) {}

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_progress_format() {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.update(1, 3);
        progress.update(3, 3);
        progress.finish();
        let out = String::from_utf8(progress.into_inner()).unwrap();
        assert_eq!(
            out,
            "\rProcessing features: 33.33% complete\rProcessing features: 100.00% complete\n"
        );
    }

    #[test]
    fn test_zero_total_writes_nothing() {
        let mut progress = ConsoleProgress::new(Vec::new());
        progress.update(0, 0);
        assert!(progress.into_inner().is_empty());
    }
}
