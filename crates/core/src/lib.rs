//! stacksift_core - Core library for stack-trace normalization
//!
//! This crate converts raw Node.js/V8 runtime error reports into a stable,
//! structured, de-duplicated, source-annotated representation and renders
//! it as both a machine-diffable log line and a colorized console block.
//!
//! # Features
//!
//! - **Resilient Parsing**: classifies every trace line (project code,
//!   dependency, runtime-internal, anonymous) and silently drops what it
//!   cannot extract; the reporting path itself never fails.
//! - **Monorepo Aware**: resolves absolute paths against the project root
//!   or the owning workspace member.
//! - **Noise Reduction**: keeps project frames and one dependency boundary
//!   frame, and suppresses locations already reported this process.
//! - **Source Annotation**: attaches the referenced source line to each
//!   frame, blocking or concurrently.
//! - **Two Renderings**: compact JSON for logs and diffs, ANSI for humans.
//!
//! # Example
//!
//! ```rust,no_run
//! use stacksift_core::{ErrorNormalizer, ProjectLayout, RawError, render};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let layout = ProjectLayout::detect();
//! let normalizer = ErrorNormalizer::new(&layout);
//!
//! let report = RawError::new("Error", "boom")
//!     .with_stack("Error: boom\n    at run (/app/src/index.ts:3:9)");
//! let record = normalizer.normalize(report).await;
//!
//! let rendered = render(record);
//! println!("{}", rendered.console_text);
//! # }
//! ```

pub mod config;
pub mod models;
pub mod normalizer;
pub mod output;
pub mod parser;
pub mod project;
pub mod reducer;
pub mod resolver;
pub mod sink;
pub mod source;
pub mod tracer;

// Re-exports for convenience
pub use config::{Config, ConfigError, LogConfig, StackTraceConfig, CONFIG_NAME};
pub use models::{
    ClassifiedFrame, ErrorInput, ErrorRecord, FrameOrigin, RawError, RawFrame, RenderedError,
    StackEntry, StackInfo, ANONYMOUS, ERROR_FETCHING_CODE, NO_DATA, STRING_ERROR_STACK,
};
pub use normalizer::ErrorNormalizer;
pub use output::{format_console, format_log_text, format_output, render, FormatError, OutputFormat};
pub use parser::{extract_location, parse_stack};
pub use project::{ProjectLayout, MANIFEST_FILE};
pub use reducer::{reduce_frames, FrameDeduper};
pub use resolver::PathResolver;
pub use sink::{LogLevel, LogSink, LOG_FILE_NAME};
pub use source::{code_line, code_line_async, CodeOverrides};
pub use tracer::StackTracer;
