use serde::Serialize;
use serde_json::{Map, Value};

/// Descriptive statistics for one numeric column. `None` means the column had
/// no non-missing values and serializes as null, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Preview payload returned after an upload. Tables carry shape, head rows
/// and leading-column statistics; non-tabular JSON carries a truncated
/// pretty-printed preview.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum PreviewSummary {
    #[serde(rename = "dataframe")]
    Dataframe {
        rows: usize,
        columns: usize,
        column_names: Vec<String>,
        sample: Vec<Map<String, Value>>,
        data_types: Map<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        statistics: Option<Map<String, Value>>,
    },
    #[serde(rename = "json")]
    Json { preview: String },
}
