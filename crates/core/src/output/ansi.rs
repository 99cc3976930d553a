//! Colorized console rendering
//!
//! The human-oriented template: header line with the message and
//! parenthesized name, one block per stack frame with a fenced code
//! snippet when source text is available, and an additional-parameters
//! trailer. The exact text and styling are compared against golden output
//! in tests, so changes here are breaking.

use crate::models::{ErrorRecord, StackInfo, ANONYMOUS, NO_DATA};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const BRIGHT_RED: &str = "\x1b[91m";

/// Render the full console text for a record
pub fn format_console(record: &ErrorRecord) -> String {
    let mut output = format!(
        "\n{BRIGHT_RED}{}{RESET} {BOLD}({}){RESET}\n",
        record.message, record.name
    );

    match &record.stack {
        StackInfo::Frames(frames) if !frames.is_empty() => {
            for (index, entry) in frames.iter().enumerate() {
                let location = format!("{}:{}", basename(&entry.file), entry.line);
                let at_text = if entry.at == NO_DATA {
                    ANONYMOUS
                } else {
                    entry.at.as_str()
                };

                let snippet = if entry.has_code() {
                    let code = entry.code.as_deref().unwrap_or_default();
                    format!(
                        "{DIM}\n    ```js\n{RESET}    // {at_text}:\n    {BOLD}{code}{RESET}{DIM}\n    ```{RESET}"
                    )
                } else {
                    format!("\n    {at_text}")
                };

                output.push_str(&format!(
                    "\n> {BRIGHT_RED}{location}{RESET}    {DIM}({}){RESET}{snippet}",
                    entry.file
                ));

                if index == frames.len() - 1 {
                    output.push('\n');
                }
            }
        }
        StackInfo::Frames(_) => {
            output.push_str("Stack Trace: Unavailable\n");
        }
        StackInfo::Text(text) => {
            output.push_str(&format!("Stack Trace: {text}\n"));
        }
    }

    if !record.params.is_empty() {
        output.push_str(&format!(
            "\nAdditional Parameters: {}",
            emphasize_params(&record.params)
        ));
    }

    output
}

/// Bare message/name composition used when stack processing is disabled
pub fn format_passthrough(record: &ErrorRecord) -> String {
    format!("{} ({})", record.message, record.name)
}

/// Re-join the params string with each value in bold
fn emphasize_params(params: &str) -> String {
    params
        .split(", ")
        .map(|param| match param.split_once(": ") {
            Some((key, value)) => format!("{key}: {BOLD}{value}{RESET}"),
            None => param.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn basename(file: &str) -> &str {
    file.rsplit('/').next().unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StackEntry;

    fn frame(file: &str, line: u32, at: &str, code: Option<&str>) -> StackEntry {
        StackEntry {
            file: file.to_string(),
            line,
            at: at.to_string(),
            code: code.map(|c| c.to_string()),
        }
    }

    #[test]
    fn test_header_has_message_and_name() {
        let record = ErrorRecord {
            name: "TypeError".to_string(),
            message: "obj is not a function".to_string(),
            stack: StackInfo::Frames(vec![]),
            params: String::new(),
        };

        let text = format_console(&record);
        assert!(text.starts_with(&format!(
            "\n{BRIGHT_RED}obj is not a function{RESET} {BOLD}(TypeError){RESET}\n"
        )));
        assert!(text.contains("Stack Trace: Unavailable"));
    }

    #[test]
    fn test_frame_with_code_renders_fenced_snippet() {
        let record = ErrorRecord {
            name: "Error".to_string(),
            message: "boom".to_string(),
            stack: StackInfo::Frames(vec![frame(
                "api/src/server.ts",
                14,
                "startServer",
                Some("listen(port);"),
            )]),
            params: String::new(),
        };

        let text = format_console(&record);
        assert!(text.contains(&format!("> {BRIGHT_RED}server.ts:14{RESET}")));
        assert!(text.contains(&format!("{DIM}(api/src/server.ts){RESET}")));
        assert!(text.contains("```js"));
        assert!(text.contains("// startServer:"));
        assert!(text.contains(&format!("{BOLD}listen(port);{RESET}")));
    }

    #[test]
    fn test_no_data_code_skips_snippet_and_label_becomes_anonymous() {
        let record = ErrorRecord {
            name: "Error".to_string(),
            message: "boom".to_string(),
            stack: StackInfo::Frames(vec![frame("app.ts", 3, NO_DATA, Some(NO_DATA))]),
            params: String::new(),
        };

        let text = format_console(&record);
        assert!(!text.contains("```"));
        assert!(text.contains("\n    <anonymous>"));
    }

    #[test]
    fn test_params_trailer_bolds_values() {
        let record = ErrorRecord {
            name: "Error".to_string(),
            message: "boom".to_string(),
            stack: StackInfo::Frames(vec![]),
            params: "code: ECONNREFUSED, port: 80".to_string(),
        };

        let text = format_console(&record);
        assert!(text.contains(&format!(
            "Additional Parameters: code: {BOLD}ECONNREFUSED{RESET}, port: {BOLD}80{RESET}"
        )));
    }

    #[test]
    fn test_string_stack_rendered_verbatim() {
        let record = ErrorRecord {
            name: "DevErrorMessage".to_string(),
            message: "boom".to_string(),
            stack: StackInfo::Text(
                "No stack trace available for string-based errors".to_string(),
            ),
            params: String::new(),
        };

        let text = format_console(&record);
        assert!(text.contains("Stack Trace: No stack trace available for string-based errors"));
    }

    #[test]
    fn test_passthrough_composition() {
        let record = ErrorRecord {
            name: "Error".to_string(),
            message: "boom".to_string(),
            stack: StackInfo::Frames(vec![]),
            params: String::new(),
        };
        assert_eq!(format_passthrough(&record), "boom (Error)");
    }
}
