//! Worker task: emit one line, then report completion
//!
//! `print` is the unit of work every flow runs. With a completion handle it
//! signals exactly once after the line is written; without one it is
//! fire-and-forget.

use crate::traits::{CompletionSignal, LineSink};
use std::io::Write;

/// Writes whole lines to the process stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) {
        // One write_all under the lock keeps the line contiguous
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(buf.as_bytes());
        let _ = handle.flush();
    }
}

/// Signals its handle when dropped, so unwinding still counts as finishing
struct SignalOnDrop<'a>(Option<&'a dyn CompletionSignal>);

impl Drop for SignalOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.signal();
        }
    }
}

/// Print `message` to stdout, then signal `handle` if present
pub fn print(message: &str, handle: Option<&dyn CompletionSignal>) {
    print_to(&StdoutSink, message, handle);
}

/// Write `message` to `sink`, then signal `handle` if present
pub fn print_to(sink: &dyn LineSink, message: &str, handle: Option<&dyn CompletionSignal>) {
    let _done = SignalOnDrop(handle);
    sink.write_line(message);
}
