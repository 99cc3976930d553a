//! YAML output formatter

use crate::models::ErrorRecord;
use crate::output::FormatError;

/// Format a record as YAML
pub fn format_yaml(record: &ErrorRecord) -> Result<String, FormatError> {
    serde_yaml::to_string(record).map_err(FormatError::from)
}
