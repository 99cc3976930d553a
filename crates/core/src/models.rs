//! Data models for stack-trace normalization
//!
//! This module defines the structures flowing through the normalization
//! pipeline: raw classified trace lines, resolved stack entries, the
//! structured error record and the rendered output pair.

use serde::{Deserialize, Serialize};

/// Sentinel for a value that could not be extracted or fetched
pub const NO_DATA: &str = "<no-data>";

/// Sentinel for a source line that failed to read after the file was found
pub const ERROR_FETCHING_CODE: &str = "<error-fetching-code>";

/// Sentinel shown in console output for an unextractable call-site label
pub const ANONYMOUS: &str = "<anonymous>";

/// Fixed stack text attached to string-typed errors
pub const STRING_ERROR_STACK: &str = "No stack trace available for string-based errors";

/// Origin of a single stack-trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameOrigin {
    /// Frame inside the resolved project or workspace boundary
    Project,
    /// Frame inside a third-party package directory
    Dependency,
    /// Engine- or runtime-internal frame
    RuntimeInternal,
    /// Anonymous or native call-site
    Anonymous,
    /// Anything that matched no other bucket
    Unknown,
}

/// One trimmed line of a stack trace, pre-classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Original line text, trimmed
    pub text: String,

    /// Classified origin
    pub origin: FrameOrigin,
}

/// A raw frame known to carry an extractable location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFrame {
    /// Absolute file path extracted from the line
    pub absolute_path: String,

    /// 1-based line number
    pub line: u32,

    /// Enclosing call-site name, when extractable
    pub label: Option<String>,
}

/// A resolved, externally visible stack entry
///
/// Field names are part of the log format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Project- or workspace-relative path, forward-slash separated
    pub file: String,

    /// 1-based line number
    pub line: u32,

    /// Call-site label, or the `<no-data>` sentinel
    pub at: String,

    /// Source line text (trimmed, capped at 100 chars) or a sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl StackEntry {
    /// Whether this entry carries real source text worth rendering
    pub fn has_code(&self) -> bool {
        matches!(&self.code, Some(c) if c != NO_DATA)
    }
}

/// Stack portion of a record: structured frames or a diagnostic string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StackInfo {
    /// Plain diagnostic text (string-typed errors, no usable trace)
    Text(String),
    /// Ordered resolved frames; empty when nothing survived reduction
    Frames(Vec<StackEntry>),
}

impl StackInfo {
    pub fn frames(&self) -> Option<&[StackEntry]> {
        match self {
            StackInfo::Frames(frames) => Some(frames),
            StackInfo::Text(_) => None,
        }
    }
}

/// The structured, normalized form of one runtime error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Error class name
    pub name: String,

    /// Error message
    pub message: String,

    /// Always present: frames (possibly empty) or diagnostic text
    pub stack: StackInfo,

    /// Comma-joined `key: value` diagnostic parameters, possibly empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,
}

/// A captured runtime error report, as produced by a Node.js process
///
/// All fields are optional; absent name/message fall back to fixed defaults
/// during normalization. `errors` carries the sub-errors of an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawError {
    pub name: Option<String>,
    pub message: Option<String>,
    pub stack: Option<String>,

    /// Sub-errors of an AggregateError
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RawError>,

    // Diagnostic fields, checked in this fixed order when building params
    pub code: Option<String>,
    pub errno: Option<i64>,
    pub syscall: Option<String>,
    pub path: Option<String>,
    pub address: Option<String>,
    pub port: Option<u32>,
    pub hostname: Option<String>,
}

impl RawError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn is_aggregate(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Input accepted by the normalizer: a structured error or a bare string
#[derive(Debug, Clone)]
pub enum ErrorInput {
    Message(String),
    Error(RawError),
}

impl From<&str> for ErrorInput {
    fn from(message: &str) -> Self {
        ErrorInput::Message(message.to_string())
    }
}

impl From<String> for ErrorInput {
    fn from(message: String) -> Self {
        ErrorInput::Message(message)
    }
}

impl From<RawError> for ErrorInput {
    fn from(error: RawError) -> Self {
        ErrorInput::Error(error)
    }
}

/// The unit returned to callers: the record plus both renderings
#[derive(Debug, Clone, Serialize)]
pub struct RenderedError {
    /// The structured record
    #[serde(rename = "error")]
    pub record: ErrorRecord,

    /// Machine-oriented serialization, empty fields omitted
    #[serde(rename = "log")]
    pub log_text: String,

    /// Colorized, human-oriented multi-line rendering
    #[serde(rename = "formatted")]
    pub console_text: String,
}
