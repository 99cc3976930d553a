//! Stack tracer service
//!
//! A small stateful object constructed once at process start and passed by
//! handle to whoever needs to normalize errors or flip the switch. When
//! disabled, processing degrades to a passthrough record (bare message and
//! name, no filesystem access). Also owns the exit-time panic hook, which
//! must use the blocking path: the process may die before a suspended read
//! resumes.

use crate::models::{ErrorInput, ErrorRecord, RawError, RenderedError, StackInfo};
use crate::normalizer::ErrorNormalizer;
use crate::output;
use crate::project::ProjectLayout;
use crate::sink::{LogLevel, LogSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct StackTracer {
    layout: ProjectLayout,
    enabled: AtomicBool,
}

impl StackTracer {
    /// Tracer over a project layout; starts disabled
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            enabled: AtomicBool::new(false),
        }
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

    /// Normalize and render, non-blocking form
    pub async fn process(&self, input: impl Into<ErrorInput>) -> RenderedError {
        let input = input.into();
        if !self.is_enabled() {
            return passthrough(input);
        }
        let record = ErrorNormalizer::new(&self.layout).normalize(input).await;
        output::render(record)
    }

    /// Normalize and render, blocking form for exit-time handlers
    pub fn process_sync(&self, input: impl Into<ErrorInput>) -> RenderedError {
        let input = input.into();
        if !self.is_enabled() {
            return passthrough(input);
        }
        let record = ErrorNormalizer::new(&self.layout).normalize_sync(input);
        output::render(record)
    }

    /// Register a panic hook routing panics through the blocking path into
    /// the sink before the process unwinds
    pub fn install_panic_hook(self: &Arc<Self>, sink: Arc<LogSink>) {
        let tracer = Arc::clone(self);
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let message = if let Some(text) = info.payload().downcast_ref::<&str>() {
                (*text).to_string()
            } else if let Some(text) = info.payload().downcast_ref::<String>() {
                text.clone()
            } else {
                "panic with non-string payload".to_string()
            };

            let mut error = RawError::new("UncaughtException", message);
            if let Some(location) = info.location() {
                error.stack = Some(format!(
                    "at {} ({}:{}:{})",
                    "panic",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }

            let rendered = tracer.process_sync(error);
            sink.log_sync(LogLevel::Error, &rendered.console_text, &rendered.log_text);

            previous(info);
        }));
    }
}

/// Disabled-mode record: identity only, empty stack, nothing touched
fn passthrough(input: ErrorInput) -> RenderedError {
    let record = match input {
        ErrorInput::Message(message) => ErrorRecord {
            name: "DevErrorMessage".to_string(),
            message,
            stack: StackInfo::Frames(vec![]),
            params: String::new(),
        },
        ErrorInput::Error(error) => ErrorRecord {
            name: error.name.unwrap_or_else(|| "Unknown Error".to_string()),
            message: error
                .message
                .unwrap_or_else(|| "No message provided".to_string()),
            stack: StackInfo::Frames(vec![]),
            params: String::new(),
        },
    };

    let log_text = output::format_log_text(&record);
    let console_text = output::ansi::format_passthrough(&record);
    RenderedError {
        record,
        log_text,
        console_text,
    }
}
