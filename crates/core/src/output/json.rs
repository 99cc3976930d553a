//! Machine-oriented log serialization
//!
//! One compact JSON line per record. Null and empty fields are omitted at
//! the model level (`skip_serializing_if` on `params` and `code`) so log
//! lines stay short.

use crate::models::ErrorRecord;

/// Serialize a record to its log-line form
pub fn format_log_text(record: &ErrorRecord) -> String {
    // A record is plain data; serialization cannot fail in practice, and
    // the logging path must never throw
    serde_json::to_string(record).unwrap_or_else(|_| {
        format!("{{\"name\":\"{}\",\"message\":\"{}\"}}", record.name, record.message)
    })
}
