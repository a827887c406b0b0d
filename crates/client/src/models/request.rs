//! Export request models.
//!
//! # What this module handles:
//! - The closed sets of data types, formats and scopes an export can target
//! - The optional filter record sent with every export request
//! - The request body for `POST /exports`
//!
//! # What this module does NOT handle:
//! - Choosing which format/scope combinations are offered (see the export crate)
//! - HTTP transport (see [`crate::endpoints`])

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dataset an export covers.
///
/// The presentation tag of [`DataType::Methods`] is `methods`, while the
/// wire tag is `test-methods`. All other variants use the same tag for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    Repositories,
    Teams,
    #[serde(rename = "test-methods", alias = "methods")]
    Methods,
    Classes,
    Analytics,
}

impl DataType {
    /// Every data type, in display order.
    pub const ALL: [DataType; 5] = [
        DataType::Repositories,
        DataType::Teams,
        DataType::Methods,
        DataType::Classes,
        DataType::Analytics,
    ];

    /// Presentation tag, also used as the filename stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Repositories => "repositories",
            DataType::Teams => "teams",
            DataType::Methods => "methods",
            DataType::Classes => "classes",
            DataType::Analytics => "analytics",
        }
    }

    /// Tag sent to the export API.
    pub const fn wire_tag(self) -> &'static str {
        match self {
            DataType::Methods => "test-methods",
            other => other.as_str(),
        }
    }

    /// Human-readable name used in option descriptions.
    pub const fn label(self) -> &'static str {
        match self {
            DataType::Repositories => "repositories",
            DataType::Teams => "teams",
            DataType::Methods => "test methods",
            DataType::Classes => "test classes",
            DataType::Analytics => "analytics",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repositories" => Ok(DataType::Repositories),
            "teams" => Ok(DataType::Teams),
            "methods" | "test-methods" => Ok(DataType::Methods),
            "classes" => Ok(DataType::Classes),
            "analytics" => Ok(DataType::Analytics),
            other => Err(format!(
                "unknown data type '{}' (expected repositories, teams, methods, classes or analytics)",
                other
            )),
        }
    }
}

/// Output format of an export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Multi-sheet spreadsheet.
    Excel,
    /// Tabular, comma-delimited.
    Csv,
    /// Structured object document.
    Json,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// File extension (without the dot).
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExportFormat::Excel => "Excel",
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!(
                "unknown export format '{}' (expected excel, csv or json)",
                other
            )),
        }
    }
}

/// Whether an export covers every record or only those matching the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    #[default]
    All,
    Filtered,
}

impl ExportScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExportScope::All => "all",
            ExportScope::Filtered => "filtered",
        }
    }
}

/// Filters active in the dashboard when an export is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated: Option<bool>,
}

impl ExportFilters {
    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none() && self.repository_name.is_none() && self.annotated.is_none()
    }

    pub fn team(mut self, name: impl Into<String>) -> Self {
        self.team_name = Some(name.into());
        self
    }

    pub fn repository(mut self, name: impl Into<String>) -> Self {
        self.repository_name = Some(name.into());
        self
    }

    pub fn annotated(mut self, annotated: bool) -> Self {
        self.annotated = Some(annotated);
        self
    }
}

/// Body of `POST /exports`. Built fresh for every dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub data_type: DataType,
    pub format: ExportFormat,
    pub scope: ExportScope,
    pub filters: ExportFilters,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods_maps_to_wire_tag() {
        assert_eq!(DataType::Methods.as_str(), "methods");
        assert_eq!(DataType::Methods.wire_tag(), "test-methods");
        assert_eq!(
            serde_json::to_value(DataType::Methods).unwrap(),
            json!("test-methods")
        );
    }

    #[test]
    fn test_other_tags_pass_through() {
        for data_type in [
            DataType::Repositories,
            DataType::Teams,
            DataType::Classes,
            DataType::Analytics,
        ] {
            assert_eq!(data_type.as_str(), data_type.wire_tag());
            assert_eq!(
                serde_json::to_value(data_type).unwrap(),
                json!(data_type.wire_tag())
            );
        }
    }

    #[test]
    fn test_methods_deserializes_from_both_tags() {
        let a: DataType = serde_json::from_value(json!("test-methods")).unwrap();
        let b: DataType = serde_json::from_value(json!("methods")).unwrap();
        assert_eq!(a, DataType::Methods);
        assert_eq!(b, DataType::Methods);
    }

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("Teams".parse::<DataType>().unwrap(), DataType::Teams);
        assert_eq!("test-methods".parse::<DataType>().unwrap(), DataType::Methods);
        assert!("widgets".parse::<DataType>().is_err());
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
    }

    #[test]
    fn test_empty_filters_serialize_to_empty_object() {
        let filters = ExportFilters::default();
        assert!(filters.is_empty());
        assert_eq!(serde_json::to_value(&filters).unwrap(), json!({}));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = ExportRequest {
            data_type: DataType::Methods,
            format: ExportFormat::Csv,
            scope: ExportScope::All,
            filters: ExportFilters::default().team("platform").annotated(true),
            filename: "methods_export_2024-03-01.csv".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "dataType": "test-methods",
                "format": "csv",
                "scope": "all",
                "filters": { "teamName": "platform", "annotated": true },
                "filename": "methods_export_2024-03-01.csv"
            })
        );
    }
}
