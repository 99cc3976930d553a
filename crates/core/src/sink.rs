//! Logging sink
//!
//! Appends rendered output to the console stream and, when enabled, to an
//! append-only log file at the project root. The file is capped: once it
//! reaches the size limit, the oldest lines are dropped before the next
//! append. Sink failures are reported through `tracing` and swallowed; the
//! logging path never propagates errors to the caller.

use crate::project::ProjectLayout;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;

/// Log file name, created in the project root
pub const LOG_FILE_NAME: &str = "stacksift.log";

/// Default cap on the log file size
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

const FALLBACK_PROJECT_NAME: &str = "Unknown_Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug)]
pub struct LogSink {
    project_name: String,
    log_file: Option<PathBuf>,
    max_file_size: u64,
    enabled: AtomicBool,
}

impl LogSink {
    /// Sink for a project layout; file logging starts disabled
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            project_name: layout
                .project_name()
                .unwrap_or(FALLBACK_PROJECT_NAME)
                .to_string(),
            log_file: layout.monorepo_root().map(|root| root.join(LOG_FILE_NAME)),
            max_file_size: MAX_LOG_FILE_SIZE,
            enabled: AtomicBool::new(false),
        }
    }

    /// Override the size cap (tests use small caps)
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Blocking write: console always, file when enabled
    ///
    /// `console_text` goes to stderr as-is; `file_text` becomes one
    /// timestamped log line. Reserved for exit-time handlers.
    pub fn log_sync(&self, level: LogLevel, console_text: &str, file_text: &str) {
        eprintln!("{console_text}");
        self.append_sync(level, file_text);
    }

    /// Non-blocking write, same semantics as [`LogSink::log_sync`]
    pub async fn log(&self, level: LogLevel, console_text: &str, file_text: &str) {
        eprintln!("{console_text}");
        self.append(level, file_text).await;
    }

    /// Blocking file-only append, gated on the enabled flag
    pub fn append_sync(&self, level: LogLevel, file_text: &str) {
        if !self.is_enabled() {
            return;
        }
        let Some(path) = &self.log_file else {
            tracing::warn!("log file path could not be determined");
            return;
        };

        let entry = self.format_entry(level, file_text);
        if let Err(err) = append_with_cap_sync(path, &entry, self.max_file_size) {
            tracing::warn!(error = %err, "failed to append to log file");
        }
    }

    /// Non-blocking file-only append, gated on the enabled flag
    pub async fn append(&self, level: LogLevel, file_text: &str) {
        if !self.is_enabled() {
            return;
        }
        let Some(path) = &self.log_file else {
            tracing::warn!("log file path could not be determined");
            return;
        };

        let entry = self.format_entry(level, file_text);
        if let Err(err) = append_with_cap(path, &entry, self.max_file_size).await {
            tracing::warn!(error = %err, "failed to append to log file");
        }
    }

    fn format_entry(&self, level: LogLevel, message: &str) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            Utc::now().to_rfc3339(),
            self.project_name,
            level.tag(),
            message
        )
    }
}

/// Append one line, trimming the oldest lines first when the file has
/// reached the cap
fn append_with_cap_sync(path: &Path, entry: &str, max_size: u64) -> std::io::Result<()> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.len() >= max_size {
            trim_oldest_lines_sync(path, max_size)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{entry}")
}

async fn append_with_cap(path: &Path, entry: &str, max_size: u64) -> std::io::Result<()> {
    if let Ok(meta) = tokio::fs::metadata(path).await {
        if meta.len() >= max_size {
            let contents = tokio::fs::read_to_string(path).await?;
            tokio::fs::write(path, drop_oldest(&contents, max_size)).await?;
        }
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{entry}\n").as_bytes()).await
}

fn trim_oldest_lines_sync(path: &Path, max_size: u64) -> std::io::Result<()> {
    let contents = fs::read_to_string(path)?;
    fs::write(path, drop_oldest(&contents, max_size))
}

/// Drop whole lines from the front until the text fits under the cap
fn drop_oldest(contents: &str, max_size: u64) -> String {
    let mut remaining = contents;
    while remaining.len() as u64 >= max_size {
        match remaining.split_once('\n') {
            Some((_, rest)) => remaining = rest,
            None => return String::new(),
        }
    }
    remaining.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sink_in_temp_root(max: u64) -> (TempDir, LogSink) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "demo"}"#).unwrap();
        let layout = ProjectLayout::with_root(dir.path());
        let sink = LogSink::new(&layout).with_max_file_size(max);
        (dir, sink)
    }

    #[test]
    fn test_disabled_sink_writes_no_file() {
        let (dir, sink) = sink_in_temp_root(1024);
        assert_eq!(
            sink.log_file(),
            Some(dir.path().join(LOG_FILE_NAME).as_path())
        );
        sink.log_sync(LogLevel::Info, "console", "file entry");
        assert!(!dir.path().join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_enabled_sink_appends_entries() {
        let (dir, sink) = sink_in_temp_root(1024 * 1024);
        sink.enable();
        sink.log_sync(LogLevel::Info, "console", "first");
        sink.log_sync(LogLevel::Error, "console", "second");

        let contents = fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[demo] [INFO] first"));
        assert!(lines[1].contains("[demo] [ERROR] second"));
    }

    #[test]
    fn test_oldest_lines_dropped_at_cap() {
        let (dir, sink) = sink_in_temp_root(120);
        sink.enable();
        for i in 0..10 {
            sink.log_sync(LogLevel::Info, "console", &format!("entry number {i}"));
        }

        let contents = fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!((contents.len() as u64) < 240);
        assert!(!contents.contains("entry number 0"));
        assert!(contents.contains("entry number 9"));
    }

    #[tokio::test]
    async fn test_async_append_matches_sync() {
        let (dir, sink) = sink_in_temp_root(1024 * 1024);
        sink.enable();
        sink.log(LogLevel::Warn, "console", "from async").await;

        let contents = fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(contents.contains("[demo] [WARN] from async"));
    }

    #[test]
    fn test_drop_oldest_keeps_newest() {
        let text = "a\nb\nc\n";
        assert_eq!(drop_oldest(text, 4), "c\n");
        assert_eq!(drop_oldest(text, 100), "a\nb\nc\n");
    }
}
