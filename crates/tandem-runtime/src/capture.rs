//! In-memory line sink
//!
//! Records lines from any number of concurrent workers without a lock.
//! Order reflects the order writes landed, which for concurrent workers is
//! whatever the scheduler produced.

use crossbeam_queue::SegQueue;
use tandem_core::LineSink;

#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: SegQueue<String>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines captured so far
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove and return everything captured, oldest first
    pub fn drain(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len());
        while let Some(line) = self.lines.pop() {
            out.push(line);
        }
        out
    }
}

impl LineSink for CaptureSink {
    fn write_line(&self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_capture_in_order() {
        let sink = CaptureSink::new();
        assert!(sink.is_empty());
        sink.write_line("a");
        sink.write_line("b");
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.drain(), vec!["a", "b"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_capture_concurrent() {
        let sink = Arc::new(CaptureSink::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..100 {
                        sink.write_line(&format!("{}-{}", t, i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut lines = sink.drain();
        assert_eq!(lines.len(), 800);
        lines.sort();
        lines.dedup();
        assert_eq!(lines.len(), 800);
    }
}
