use {
    anyhow::{Context, Result},
    std::{
        fs::{File, OpenOptions, create_dir_all},
        io::Write,
        path::PathBuf,
        sync::Mutex,
        time::{SystemTime, UNIX_EPOCH},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: Level, file: &str, line: usize, message: &str);
}

pub static LOGGER: Mutex<Option<Box<dyn Logger>>> = Mutex::new(None);

/// Current UTC time as ISO-8601 with millisecond precision, e.g.
/// `2024-05-01T12:30:05.120Z`.
pub fn format_timestamp() -> String {
    format_epoch_millis(now_millis())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn format_epoch_millis(millis: u64) -> String {
    let secs = millis / 1000;
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60,
        millis % 1000,
    )
}

fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

pub struct StdoutLogger {
    min_level: Level,
}

impl StdoutLogger {
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }
}

impl Logger for StdoutLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        if level < self.min_level {
            return;
        }
        let timestamp = format_timestamp();
        let thread_id = std::thread::current().id();
        println!(
            "[{:?}:{}:{} - {}:{}] {}",
            thread_id, level, timestamp, file, line, message
        );
    }
}

/// Appends to one file per UTC day, `<dir>/<prefix>-YYYY-MM-DD.log`.
pub struct FileLogger {
    dir: PathBuf,
    prefix: String,
    state: Mutex<(String, File)>,
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Result<Self> {
        let dir = dir.into();
        create_dir_all(&dir).with_context(|| format!("creating log directory {}", dir.display()))?;
        let date = format_date(now_millis());
        let file = open_log(&dir, prefix, &date)?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            state: Mutex::new((date, file)),
        })
    }

    /// Path of the file today's entries go to.
    pub fn current_path(&self) -> PathBuf {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        log_path(&self.dir, &self.prefix, &state.0)
    }
}

fn format_date(millis: u64) -> String {
    let mut timestamp = format_epoch_millis(millis);
    timestamp.truncate(10);
    timestamp
}

fn log_path(dir: &std::path::Path, prefix: &str, date: &str) -> PathBuf {
    dir.join(format!("{prefix}-{date}.log"))
}

fn open_log(dir: &std::path::Path, prefix: &str, date: &str) -> Result<File> {
    let path = log_path(dir, prefix, date);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))
}

impl Logger for FileLogger {
    fn log(&self, level: Level, file: &str, line: usize, message: &str) {
        let millis = now_millis();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let today = format_date(millis);
        if today != state.0 {
            match open_log(&self.dir, &self.prefix, &today) {
                Ok(next) => *state = (today, next),
                Err(error) => eprintln!("Failed to rotate log file: {error:#}"),
            }
        }
        let entry = format!(
            "[{:?}:{}:{} - {}:{}] {}\n",
            std::thread::current().id(),
            level,
            format_epoch_millis(millis),
            file,
            line,
            message
        );
        if let Err(error) = state.1.write_all(entry.as_bytes()) {
            eprintln!("Failed to write to log file: {error}");
            eprint!("{entry}");
        }
    }
}

pub fn init_file_logger(dir: impl Into<PathBuf>, prefix: &str) -> Result<()> {
    init_logger(Box::new(FileLogger::new(dir, prefix)?));
    Ok(())
}

pub fn init_stdout_logger() {
    init_logger(Box::new(StdoutLogger::new(Level::Info)));
}

pub fn init_logger(logger: Box<dyn Logger>) {
    LOGGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .replace(logger);
}

#[doc(hidden)]
pub fn dispatch(level: Level, file: &str, line: usize, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
        logger.log(level, file, line, message);
    }
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ $crate::log::dispatch($crate::log::Level::Debug, file!(), line!() as usize, &format!($($arg)*)); }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{ $crate::log::dispatch($crate::log::Level::Info, file!(), line!() as usize, &format!($($arg)*)); }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ $crate::log::dispatch($crate::log::Level::Warn, file!(), line!() as usize, &format!($($arg)*)); }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{ $crate::log::dispatch($crate::log::Level::Error, file!(), line!() as usize, &format!($($arg)*)); }};
}
