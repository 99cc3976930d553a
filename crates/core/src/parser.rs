//! Stack-trace line parsing
//!
//! Splits a raw V8-style stack string into classified lines and extracts
//! file/line/label locations from the ones worth keeping. Extraction is
//! positional, matching the engine's `at label (path:line:col)` shape; a
//! line that fails extraction is silently dropped by the reducer, never an
//! error.

use crate::models::{ClassifiedFrame, FrameOrigin, RawFrame};
use crate::resolver::PathResolver;

/// Marker opening every real frame line
const FRAME_MARKER: &str = "at ";

/// Split, trim and classify a raw stack-trace string
///
/// The first line is the error's own header (`Error: message`) unless it
/// already starts with the frame marker; headers are discarded, not
/// classified.
pub fn parse_stack(raw: &str, resolver: &PathResolver) -> Vec<RawFrame> {
    raw.split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if index == 0 && !trimmed.starts_with(FRAME_MARKER) {
                return None;
            }
            Some(RawFrame {
                origin: classify_line(trimmed, resolver),
                text: trimmed.to_string(),
            })
        })
        .collect()
}

/// Classify one trimmed line; first match wins
fn classify_line(line: &str, resolver: &PathResolver) -> FrameOrigin {
    if line.contains("/node_modules/") {
        FrameOrigin::Dependency
    } else if line.starts_with("at native") || line.contains("node:") {
        FrameOrigin::RuntimeInternal
    } else if line.contains("(<anonymous>)") || line.contains("(native)") {
        // Anonymity wins over any path-like substring the line also carries
        FrameOrigin::Anonymous
    } else if resolver.is_line_in_project(line) {
        FrameOrigin::Project
    } else {
        FrameOrigin::Unknown
    }
}

/// Extract the absolute path, line number and call-site label
///
/// Returns `None` when the line does not reduce to a usable location.
pub fn extract_location(line: &str) -> Option<ClassifiedFrame> {
    let absolute_path = extract_file_path(line)?;
    let line_number = extract_line_number(line)?;
    Some(ClassifiedFrame {
        absolute_path,
        line: line_number,
        label: extract_label(line),
    })
}

/// Path between a `file:///` prefix (keeping one leading slash) and the next
/// colon, or from the first `/` to the next colon
fn extract_file_path(line: &str) -> Option<String> {
    if let Some(marker) = line.find("file:///") {
        let start = marker + "file:///".len() - 1;
        let end = line[start..].find(':')? + start;
        return Some(line[start..end].to_string());
    }

    let start = line.find('/')?;
    let end = line[start..].find(':')? + start;
    Some(line[start..end].to_string())
}

/// Second-to-last non-empty colon-separated segment, parsed as an integer
///
/// Leading digits only, mirroring the lenient integer parse of the source
/// format ("12)" reads as 12).
fn extract_line_number(line: &str) -> Option<u32> {
    let parts: Vec<&str> = line.split(':').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return None;
    }
    parse_leading_int(parts[parts.len() - 2])
}

fn parse_leading_int(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Substring between the `at ` token and the following ` (` token
fn extract_label(line: &str) -> Option<String> {
    let at = line.find(FRAME_MARKER)?;
    let paren = line.find(" (")?;
    let start = at + FRAME_MARKER.len();
    if paren <= start {
        return None;
    }
    let label = line[start..paren].trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
