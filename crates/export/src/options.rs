//! Export option descriptors offered for a data type.
//!
//! Every data type is offered the same three whole-dataset exports, in this
//! order: Excel, CSV, JSON. The `filtered` scope exists on the wire but no
//! option emits it yet.
//!
//! Filenames are stamped with the local date when the list is built and are
//! not regenerated afterwards.

use chrono::{Local, NaiveDate};
use coverage_client::{DataType, ExportFilters, ExportFormat, ExportRequest, ExportScope};

/// Formats offered for every data type, in display order.
const OFFERED_FORMATS: [ExportFormat; 3] =
    [ExportFormat::Excel, ExportFormat::Csv, ExportFormat::Json];

/// One selectable export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOption {
    /// Stable identifier, e.g. `csv-all`.
    pub id: String,
    pub label: String,
    pub description: String,
    pub data_type: DataType,
    pub format: ExportFormat,
    pub scope: ExportScope,
    /// Requested artifact name, e.g. `teams_export_2024-03-01.csv`.
    pub filename: String,
}

impl ExportOption {
    /// Build the request body for dispatching this option.
    pub fn to_request(&self, filters: &ExportFilters) -> ExportRequest {
        ExportRequest {
            data_type: self.data_type,
            format: self.format,
            scope: self.scope,
            filters: filters.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Options for `data_type`, stamped with today's local date.
pub fn export_options(data_type: DataType, filters: &ExportFilters) -> Vec<ExportOption> {
    export_options_at(data_type, filters, Local::now().date_naive())
}

/// Options for `data_type`, stamped with `date`.
pub fn export_options_at(
    data_type: DataType,
    filters: &ExportFilters,
    date: NaiveDate,
) -> Vec<ExportOption> {
    OFFERED_FORMATS
        .iter()
        .map(|&format| build_option(data_type, format, ExportScope::All, filters, date))
        .collect()
}

/// `{data_type}_export_{YYYY-MM-DD}.{ext}`
pub fn export_filename(data_type: DataType, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_export_{}.{}",
        data_type.as_str(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn build_option(
    data_type: DataType,
    format: ExportFormat,
    scope: ExportScope,
    filters: &ExportFilters,
    date: NaiveDate,
) -> ExportOption {
    let shape = match format {
        ExportFormat::Excel => "a multi-sheet Excel workbook",
        ExportFormat::Csv => "comma-separated values",
        ExportFormat::Json => "a JSON document",
    };
    let mut description = format!("Export all {} as {}", data_type.label(), shape);
    if scope == ExportScope::All && !filters.is_empty() {
        description.push_str(" (active filters are not applied)");
    }

    ExportOption {
        id: format!("{}-{}", format.as_str(), scope.as_str()),
        label: format!("{} ({})", format.label(), scope.as_str()),
        description,
        data_type,
        format,
        scope,
        filename: export_filename(data_type, format, date),
    }
}
