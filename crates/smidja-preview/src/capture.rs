//! Log capture: keeps recent records in a ring buffer for the log pane and
//! optionally echoes them through env_logger.
//!
//! The TUI owns the terminal, so records are only echoed to stderr in
//! `--print` mode.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

/// Ring buffer capacity.
const LOG_CAP: usize = 2000;

#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp_secs: f32,
}

struct CaptureLogger {
    inner: env_logger::Logger,
    echo: bool,
    start: Instant,
    ring: Mutex<VecDeque<CapturedLog>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if self.echo && self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        if record.level() > log::Level::Debug {
            return;
        }

        let entry = CapturedLog {
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
            timestamp_secs: self.start.elapsed().as_secs_f32(),
        };
        if let Ok(mut ring) = self.ring.lock() {
            if ring.len() >= LOG_CAP {
                ring.pop_front();
            }
            ring.push_back(entry);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

/// Install the capturing logger. `echo` also writes records to stderr,
/// filtered by `RUST_LOG`.
pub fn init(echo: bool) {
    let inner = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();
    let max_level = inner.filter();

    let logger = LOGGER.get_or_init(|| CaptureLogger {
        inner,
        echo,
        start: Instant::now(),
        ring: Mutex::new(VecDeque::with_capacity(LOG_CAP)),
    });

    if log::set_logger(logger).is_err() {
        eprintln!("[smidja-preview] a logger is already set, log capture disabled");
        return;
    }
    log::set_max_level(max_level.max(log::LevelFilter::Debug));
}

/// A copy of every captured record, oldest first.
pub fn snapshot() -> Vec<CapturedLog> {
    LOGGER
        .get()
        .and_then(|l| l.ring.lock().ok().map(|ring| ring.iter().cloned().collect()))
        .unwrap_or_default()
}
