//! Output line sinks
//!
//! The monitor hands every formatted event line to a [`LineSink`]. Sinks are
//! composable: a [`TimestampSink`] stamps each line once, then a
//! [`FanoutSink`] forwards it to console and/or file destinations.

use arpscope_core::{Error, Result};
use chrono::Local;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Timestamp prefix format, `2009/01/23 01:23:23`
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Destination for formatted event lines
///
/// A sink either records the line durably or returns an error; the monitor's
/// classification state is unaffected either way.
pub trait LineSink: Send {
    /// Record or display a single line (without trailing newline)
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush any buffered lines to the underlying destination
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink writing to standard output
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl LineSink for ConsoleSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

/// Sink appending to a log file
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open (or create) the log file for appending
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self { file })
    }
}

impl LineSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

/// Sink forwarding each line to an ordered list of underlying sinks
///
/// Every sink gets the line even when an earlier one fails; the failures are
/// then combined into a single error so one destination cannot silently hide
/// another's breakage.
pub struct FanoutSink {
    sinks: Vec<Box<dyn LineSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Box<dyn LineSink>>) -> Self {
        Self { sinks }
    }

    fn for_each(&mut self, op: impl Fn(&mut Box<dyn LineSink>) -> Result<()>) -> Result<()> {
        let mut failures = Vec::new();
        for sink in &mut self.sinks {
            if let Err(e) = op(sink) {
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::sink(failures.join("; ")))
        }
    }
}

impl LineSink for FanoutSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.for_each(|sink| sink.write_line(line))
    }

    fn flush(&mut self) -> Result<()> {
        self.for_each(|sink| sink.flush())
    }
}

/// Sink decorating another sink with a local-time timestamp prefix
///
/// Stamping happens once per line, before any fan-out, so all destinations
/// record the same instant.
pub struct TimestampSink {
    inner: Box<dyn LineSink>,
}

impl TimestampSink {
    pub fn new(inner: Box<dyn LineSink>) -> Self {
        Self { inner }
    }
}

impl LineSink for TimestampSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let stamped = format!("{} {}", Local::now().format(TIMESTAMP_FORMAT), line);
        self.inner.write_line(&stamped)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

/// Sink collecting lines in memory
///
/// The handle returned by [`MemorySink::handle`] stays valid after the sink
/// itself has been boxed and moved into a monitor, which is what tests use
/// to assert on emitted lines.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected lines
    pub fn handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.lines)
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that always fails, for exercising fan-out error combination
    struct BrokenSink(&'static str);

    impl LineSink for BrokenSink {
        fn write_line(&mut self, _line: &str) -> Result<()> {
            Err(Error::sink(self.0))
        }
    }

    #[test]
    fn test_memory_sink_collects_lines() {
        let mut sink = MemorySink::new();
        let lines = sink.handle();

        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();

        assert_eq!(*lines.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_fanout_delivers_to_all_sinks() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let (la, lb) = (a.handle(), b.handle());

        let mut fanout = FanoutSink::new(vec![Box::new(a), Box::new(b)]);
        fanout.write_line("hello").unwrap();

        assert_eq!(*la.lock(), vec!["hello"]);
        assert_eq!(*lb.lock(), vec!["hello"]);
    }

    #[test]
    fn test_fanout_combines_failures_and_still_delivers() {
        let ok = MemorySink::new();
        let lines = ok.handle();

        let mut fanout = FanoutSink::new(vec![
            Box::new(BrokenSink("disk full")),
            Box::new(ok),
            Box::new(BrokenSink("pipe closed")),
        ]);

        let err = fanout.write_line("event").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("disk full"));
        assert!(msg.contains("pipe closed"));

        // the healthy sink still got the line
        assert_eq!(*lines.lock(), vec!["event"]);
    }

    #[test]
    fn test_timestamp_sink_prefixes_lines() {
        let inner = MemorySink::new();
        let lines = inner.handle();

        let mut sink = TimestampSink::new(Box::new(inner));
        sink.write_line("[NEW MAPPING] 10.0.0.1 <-> aa:bb:cc:dd:ee:ff")
            .unwrap();

        let recorded = lines.lock();
        assert_eq!(recorded.len(), 1);
        // "YYYY/MM/DD HH:MM:SS " prefix, then the original line
        assert!(recorded[0].ends_with("[NEW MAPPING] 10.0.0.1 <-> aa:bb:cc:dd:ee:ff"));
        assert_eq!(recorded[0].as_bytes()[4], b'/');
        assert_eq!(recorded[0].as_bytes()[7], b'/');
        assert_eq!(recorded[0].as_bytes()[10], b' ');
    }
}
