#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Installs a `tracing-subscriber` formatter as the global default. On wasm32
//! each event becomes one `console.log` line; elsewhere events go to stderr.
//! Timestamps are off because `SystemTime` is unavailable on
//! `wasm32-unknown-unknown`.

use std::fmt;

use tracing_subscriber::filter::LevelFilter;

/// Parse a configured log level. Case-insensitive.
#[must_use]
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Install the global subscriber at `level` (default `warn`).
///
/// Returns `false` when a global subscriber was already set, e.g. when the
/// host calls `boot` twice.
pub fn init(level: &str) -> bool {
    let filter = parse_level(level).unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_writer(writer::make_writer)
        .try_init()
        .is_ok()
}

/// Log a rejected best-effort write at `trace`. Returns whether it succeeded.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn trace_rejected<T, E: fmt::Debug>(what: &'static str, result: Result<T, E>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::trace!(what, error = ?err, "DOM write rejected");
            false
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod writer {
    use std::io;

    /// Buffers one formatted event and logs it to the console on drop.
    #[derive(Debug, Default)]
    pub struct ConsoleWriter {
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            if self.buf.is_empty() {
                return;
            }
            let line = String::from_utf8_lossy(&self.buf);
            web_sys::console::log_1(&line.trim_end().into());
        }
    }

    pub fn make_writer() -> ConsoleWriter {
        ConsoleWriter::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod writer {
    pub fn make_writer() -> std::io::Stderr {
        std::io::stderr()
    }
}
