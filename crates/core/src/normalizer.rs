//! Error normalization
//!
//! Orchestrates the pipeline: classify the raw stack text, reduce it to the
//! frames worth keeping, resolve their paths and annotate them with source
//! lines. One pure core builds the record; the sync and async entry points
//! differ only in how source lines are read. Nothing in here returns an
//! error: an error reporter must itself be failure-proof.

use crate::models::{
    ErrorInput, ErrorRecord, RawError, RawFrame, StackInfo, STRING_ERROR_STACK,
};
use crate::parser;
use crate::project::ProjectLayout;
use crate::reducer::{self, FrameDeduper};
use crate::resolver::PathResolver;
use crate::source::{self, CodeOverrides};
use futures::future::join_all;

/// Record name used for string-typed errors
const STRING_ERROR_NAME: &str = "DevErrorMessage";

/// Fallbacks for errors missing their identity
const UNKNOWN_NAME: &str = "Unknown Error";
const NO_MESSAGE: &str = "No message provided";

pub struct ErrorNormalizer<'d> {
    resolver: PathResolver,
    deduper: &'d FrameDeduper,
    overrides: Option<CodeOverrides>,
}

impl ErrorNormalizer<'static> {
    /// Normalizer over a project layout, sharing the process-wide deduper
    pub fn new(layout: &ProjectLayout) -> Self {
        Self::with_resolver(PathResolver::new(layout))
    }

    pub fn with_resolver(resolver: PathResolver) -> Self {
        Self {
            resolver,
            deduper: FrameDeduper::shared(),
            overrides: None,
        }
    }
}

impl<'d> ErrorNormalizer<'d> {
    /// Swap in an explicit deduper (tests construct a fresh one per case)
    pub fn with_deduper<'n>(self, deduper: &'n FrameDeduper) -> ErrorNormalizer<'n> {
        ErrorNormalizer {
            resolver: self.resolver,
            deduper,
            overrides: self.overrides,
        }
    }

    /// Supply pre-computed source lines; the filesystem is not touched
    pub fn with_overrides(mut self, overrides: CodeOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Blocking normalization, for exit-time handlers only
    pub fn normalize_sync(&self, input: impl Into<ErrorInput>) -> ErrorRecord {
        let mut record = self.build_record(input.into());
        if let StackInfo::Frames(entries) = &mut record.stack {
            for entry in entries.iter_mut() {
                entry.code = Some(match &self.overrides {
                    Some(overrides) => overrides.lookup(&entry.file, entry.line),
                    None => source::code_line(&self.resolver, &entry.file, entry.line),
                });
            }
        }
        record
    }

    /// Non-blocking normalization; source lines for all frames are fetched
    /// concurrently and reassembled in original frame order
    pub async fn normalize(&self, input: impl Into<ErrorInput>) -> ErrorRecord {
        let mut record = self.build_record(input.into());
        if let StackInfo::Frames(entries) = &mut record.stack {
            match &self.overrides {
                Some(overrides) => {
                    for entry in entries.iter_mut() {
                        entry.code = Some(overrides.lookup(&entry.file, entry.line));
                    }
                }
                None => {
                    let fetches = entries
                        .iter()
                        .map(|e| source::code_line_async(&self.resolver, &e.file, e.line));
                    let codes = join_all(fetches).await;
                    for (entry, code) in entries.iter_mut().zip(codes) {
                        entry.code = Some(code);
                    }
                }
            }
        }
        record
    }

    /// The shared pure core: everything except source-line I/O
    fn build_record(&self, input: ErrorInput) -> ErrorRecord {
        let error = match input {
            ErrorInput::Message(message) => {
                return ErrorRecord {
                    name: STRING_ERROR_NAME.to_string(),
                    message,
                    stack: StackInfo::Text(STRING_ERROR_STACK.to_string()),
                    params: String::new(),
                };
            }
            ErrorInput::Error(error) => error,
        };

        let name = error
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let message = error
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| NO_MESSAGE.to_string());
        let params = build_params(&error);

        let raw_frames = self.collect_raw_frames(&error);
        let entries = reducer::reduce_frames(&raw_frames, &self.resolver, self.deduper);

        ErrorRecord {
            name,
            message,
            stack: StackInfo::Frames(entries),
            params,
        }
    }

    /// Parse the error's stack text, or each sub-error's stack for an
    /// aggregate (independently, then concatenated in sub-error order)
    fn collect_raw_frames(&self, error: &RawError) -> Vec<RawFrame> {
        if error.is_aggregate() {
            return error
                .errors
                .iter()
                .filter_map(|sub| sub.stack.as_deref())
                .filter(|stack| !stack.is_empty())
                .flat_map(|stack| parser::parse_stack(stack, &self.resolver))
                .collect();
        }

        match error.stack.as_deref() {
            Some(stack) if !stack.is_empty() => parser::parse_stack(stack, &self.resolver),
            _ => Vec::new(),
        }
    }
}

/// Join the present diagnostic fields as `key: value` pairs
///
/// The allow-list and its order are fixed: code, errno, syscall, path,
/// address, port, hostname.
fn build_params(error: &RawError) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(code) = &error.code {
        parts.push(format!("code: {code}"));
    }
    if let Some(errno) = error.errno {
        parts.push(format!("errno: {errno}"));
    }
    if let Some(syscall) = &error.syscall {
        parts.push(format!("syscall: {syscall}"));
    }
    if let Some(path) = &error.path {
        parts.push(format!("path: {path}"));
    }
    if let Some(address) = &error.address {
        parts.push(format!("address: {address}"));
    }
    if let Some(port) = error.port {
        parts.push(format!("port: {port}"));
    }
    if let Some(hostname) = &error.hostname {
        parts.push(format!("hostname: {hostname}"));
    }
    parts.join(", ")
}
