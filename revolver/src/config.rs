//! Runtime configuration
//!
//! Every field has a default, so a partial document deserializes cleanly:
//!
//! ```rust
//! let config: revolver::ApiConfig =
//!     serde_json::from_str(r#"{"default_page_size": 25, "export": {"bom": false}}"#).unwrap();
//! assert_eq!(config.default_page_size, 25);
//! assert_eq!(config.max_page_size, 100);
//! assert!(!config.export.bom);
//! ```

use serde::{Deserialize, Serialize};

use crate::filtering::pagination::MAX_SQL_ROWS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Page size used when the request has no `size`
    pub default_page_size: u64,
    /// Upper bound for `size`
    pub max_page_size: u64,
    /// How many relation hops `to_json` follows
    pub max_relation_depth: u8,
    pub export: ExportConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            max_relation_depth: 2,
            export: ExportConfig::default(),
        }
    }
}

/// Spreadsheet export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub true_label: String,
    pub false_label: String,
    /// Cell text for a key the row does not have
    pub missing: String,
    /// Cell text for null or empty values
    pub empty: String,
    pub datetime_format: String,
    pub date_format: String,
    /// Rows beyond this are not exported
    pub max_rows: u64,
    /// Prefix the file with a UTF-8 byte order mark
    pub bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            true_label: "Yes".to_string(),
            false_label: "No".to_string(),
            missing: "-".to_string(),
            empty: "/".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            max_rows: 10_000,
            bom: true,
        }
    }
}

impl ExportConfig {
    /// `max_rows`, bounded to what a query limit can carry.
    #[must_use]
    pub fn row_limit(&self) -> u64 {
        self.max_rows.min(MAX_SQL_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ApiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.export.true_label, "Yes");
        assert_eq!(config.max_relation_depth, 2);
    }

    #[test]
    fn test_nested_export_override() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"export": {"true_label": "是", "false_label": "否"}}"#)
                .unwrap();
        assert_eq!(config.export.true_label, "是");
        assert_eq!(config.export.missing, "-");
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_row_limit_fits_sql() {
        let config = ExportConfig {
            max_rows: u64::MAX,
            ..ExportConfig::default()
        };
        assert_eq!(config.row_limit(), MAX_SQL_ROWS);
        assert_eq!(ExportConfig::default().row_limit(), 10_000);
    }
}
