//! Source-line fetching
//!
//! Resolves a relative stack-entry path back to an absolute file and
//! returns the referenced source line, trimmed and capped. Total over all
//! failure modes: the result is always real text or one of the sentinels,
//! never an error. The async form exists for ordinary logging; the blocking
//! form is reserved for exit-time handlers that cannot suspend.

use crate::models::{ERROR_FETCHING_CODE, NO_DATA};
use crate::resolver::PathResolver;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tokio::time::timeout;

/// Longest code snippet attached to a stack entry
const MAX_CODE_LENGTH: usize = 100;

/// Guard against pathological filesystems (network mounts); a crash-logging
/// path must not hang the crash handler
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Pre-computed `(file, line) -> code` mapping that bypasses the filesystem
/// for one normalization call
#[derive(Debug, Clone, Default)]
pub struct CodeOverrides {
    entries: HashMap<(String, u32), String>,
}

impl CodeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, line: u32, code: impl Into<String>) {
        self.entries.insert((file.into(), line), code.into());
    }

    /// Override lookup; a miss yields the no-data sentinel, never a read
    pub fn lookup(&self, file: &str, line: u32) -> String {
        self.entries
            .get(&(file.to_string(), line))
            .cloned()
            .unwrap_or_else(|| NO_DATA.to_string())
    }
}

/// Blocking fetch of one source line
pub fn code_line(resolver: &PathResolver, file: &str, line: u32) -> String {
    let absolute = resolver.absolute_file_path(file);
    if !absolute.is_file() {
        return NO_DATA.to_string();
    }

    match fs::read_to_string(&absolute) {
        Ok(source) => line_from_source(&source, line),
        Err(err) => {
            tracing::warn!(
                file = %absolute.display(),
                line,
                error = %err,
                "failed to read source line"
            );
            ERROR_FETCHING_CODE.to_string()
        }
    }
}

/// Non-blocking fetch of one source line
pub async fn code_line_async(resolver: &PathResolver, file: &str, line: u32) -> String {
    let absolute = resolver.absolute_file_path(file);
    match tokio::fs::metadata(&absolute).await {
        Ok(meta) if meta.is_file() => {}
        _ => return NO_DATA.to_string(),
    }

    match timeout(READ_TIMEOUT, tokio::fs::read_to_string(&absolute)).await {
        Ok(Ok(source)) => line_from_source(&source, line),
        Ok(Err(err)) => {
            tracing::warn!(
                file = %absolute.display(),
                line,
                error = %err,
                "failed to read source line"
            );
            ERROR_FETCHING_CODE.to_string()
        }
        Err(_) => {
            tracing::warn!(
                file = %absolute.display(),
                line,
                "timed out reading source line"
            );
            ERROR_FETCHING_CODE.to_string()
        }
    }
}

/// Pick the 1-based line, trim it and cap it at [`MAX_CODE_LENGTH`] chars
fn line_from_source(source: &str, line: u32) -> String {
    if line == 0 {
        return NO_DATA.to_string();
    }
    match source.lines().nth(line as usize - 1) {
        Some(text) => text.trim().chars().take(MAX_CODE_LENGTH).collect(),
        None => NO_DATA.to_string(),
    }
}
