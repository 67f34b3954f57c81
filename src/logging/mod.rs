use std::io;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Line writer that forwards formatted events to the browser console.
///
/// The fmt layer writes one event per writer instance, so the buffer is
/// flushed on drop.
#[derive(Default)]
pub(crate) struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if !line.is_empty() {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&line.into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{line}");
        }
        self.buf.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

pub(crate) fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once.
pub(crate) fn setup_logging(level: &str) {
    // No wall clock is available to the default timer on wasm32.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(MakeConsoleWriter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_console_writer_buffers_until_flush() {
        let mut w = ConsoleWriter::default();
        w.write_all(b"INFO nav committed\n").expect("write");
        assert!(!w.buf.is_empty());
        w.flush().expect("flush");
        assert!(w.buf.is_empty());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic on garbage input.
        let _ = filter_for("[[not a directive");
        setup_logging("debug");
        setup_logging("info");
    }
}
