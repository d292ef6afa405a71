//! # Spreadsheet Export
//!
//! Serialized rows are flattened into a CSV sheet. Columns follow the model's column
//! order, then any extra keys of the first row, and are finally ordered by
//! [`SerializerModel::xls_sort_key`]. Headers come from [`SerializerModel::xls_label`].

use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use csv::Writer;
use sea_orm::{EntityTrait, IdenStatic, Iterable};
use serde_json::{Map, Value};

use crate::config::ExportConfig;
use crate::errors::ApiError;
use crate::serializer::SerializerModel;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Rendered export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub data: Vec<u8>,
    pub row_count: usize,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            self.file_name
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"export.csv\""));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv; charset=utf-8"),
        );
        headers.insert(header::CONTENT_DISPOSITION, disposition);
        headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(self.row_count));

        (headers, self.data).into_response()
    }
}

/// Sheet columns for a set of serialized rows.
#[must_use]
pub fn export_columns<M: SerializerModel>(rows: &[Map<String, Value>]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut columns: Vec<String> = <<M::Entity as EntityTrait>::Column as Iterable>::iter()
        .map(|column| column.as_str().to_string())
        .filter(|name| first.contains_key(name))
        .collect();
    for key in first.keys() {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }

    columns.sort_by_key(|key| M::xls_sort_key(key));
    columns
}

fn format_text(text: &str, config: &ExportConfig) -> String {
    if text.is_empty() {
        return config.empty.clone();
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return datetime
            .with_timezone(&Local)
            .format(&config.datetime_format)
            .to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, pattern) {
            return datetime.format(&config.datetime_format).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.format(&config.date_format).to_string();
    }
    text.to_string()
}

/// Text of a single cell.
#[must_use]
pub fn format_cell(value: Option<&Value>, config: &ExportConfig) -> String {
    match value {
        None => config.missing.clone(),
        Some(Value::Null) => config.empty.clone(),
        Some(Value::Bool(true)) => config.true_label.clone(),
        Some(Value::Bool(false)) => config.false_label.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => format_text(text, config),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
    }
}

/// Write rows as CSV.
///
/// # Errors
///
/// Returns an internal error when the CSV writer fails.
pub fn render_csv<M: SerializerModel>(
    rows: &[Map<String, Value>],
    config: &ExportConfig,
) -> Result<Vec<u8>, ApiError> {
    let columns = export_columns::<M>(rows);

    let mut buffer = Vec::new();
    if config.bom {
        buffer.extend_from_slice(UTF8_BOM);
    }
    let mut writer = Writer::from_writer(buffer);

    let headers: Vec<String> = columns.iter().map(|key| M::xls_label(key)).collect();
    writer
        .write_record(&headers)
        .map_err(|e| ApiError::internal("export failed", Some(e.to_string())))?;

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|key| format_cell(row.get(key), config))
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| ApiError::internal("export failed", Some(e.to_string())))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::internal("export failed", Some(e.to_string())))
}

/// Keep characters that are safe inside a quoted header parameter
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// `<name>.csv`, defaulting to `<route>_export_<timestamp>`.
#[must_use]
pub fn export_file_name(requested: Option<&str>, route_name: &str, now: DateTime<Local>) -> String {
    let requested = requested.map(sanitize_file_name).unwrap_or_default();
    let stem = if requested.is_empty() {
        sanitize_file_name(&format!(
            "{route_name}_export_{}",
            now.format("%Y-%m-%d-%H-%M")
        ))
    } else {
        requested
    };
    format!("{stem}.csv")
}
