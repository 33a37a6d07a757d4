use parking_lot::Mutex;
/// Debug logging for the folio host
///
/// Routes every `log::` record from all crates to a debug file in the temp
/// directory (`folio_debug.log`), and mirrors to stderr when `RUST_LOG` is set.
///
/// Level precedence:
/// 1. Explicit level passed to [`init_log_bridge`] (the `--log-level` flag)
/// 2. `RUST_LOG` (`error`, `warn`, `info`, `debug`, `trace`, `off`)
/// 3. `DEBUG_LEVEL` environment variable:
///    - 0 or unset: No debugging
///    - 1: Errors only
///    - 2: Info level
///    - 3: Debug level
///    - 4: Trace level
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        match std::env::var("DEBUG_LEVEL") {
            Ok(val) => Self::parse(&val),
            Err(_) => DebugLevel::Off,
        }
    }

    fn parse(val: &str) -> Self {
        match val.trim().parse::<u8>() {
            Ok(1) => DebugLevel::Error,
            Ok(2) => DebugLevel::Info,
            Ok(3) => DebugLevel::Debug,
            Ok(4) => DebugLevel::Trace,
            _ => DebugLevel::Off,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            DebugLevel::Off => LevelFilter::Off,
            DebugLevel::Error => LevelFilter::Error,
            DebugLevel::Info => LevelFilter::Info,
            DebugLevel::Debug => LevelFilter::Debug,
            DebugLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("folio_debug.log")
}

/// File sink shared by every log call
struct DebugFile {
    file: Option<std::fs::File>,
}

impl DebugFile {
    fn open(level: LevelFilter) -> Self {
        if level == LevelFilter::Off {
            return DebugFile { file: None };
        }
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
            // Logging must never take the host down
            .ok();
        let mut sink = DebugFile { file };
        sink.write_raw(&format!(
            "\n{}\nfolio debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        sink
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

struct LogBridge {
    level: LevelFilter,
    mirror_stderr: bool,
    sink: Mutex<DebugFile>,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.sink.lock().write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(ref mut file) = self.sink.lock().file {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn rust_log_level() -> Option<LevelFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
}

/// Pick the effective level from the explicit override and the environment.
fn effective_level(explicit: Option<LevelFilter>) -> LevelFilter {
    explicit
        .or_else(rust_log_level)
        .unwrap_or_else(|| DebugLevel::from_env().to_level_filter())
}

/// Install the log bridge. Calling it again is a no-op.
pub fn init_log_bridge(explicit: Option<LevelFilter>) {
    let level = effective_level(explicit);
    let bridge = BRIDGE.get_or_init(|| LogBridge {
        level,
        mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
        sink: Mutex::new(DebugFile::open(level)),
    });
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(bridge.level);
    }
}
