// ============================================================
// SUMMARIZE
// ============================================================
// Preview summary for an uploaded document: shape, head rows, and
// statistics for the leading numeric columns.

use serde_json::{Map, Value};

use crate::application::use_cases::stats;
use crate::domain::preview::{ColumnStatistics, PreviewSummary};
use crate::domain::table::{Column, Table, TabularDocument};

/// Rows included in the preview sample.
pub const SAMPLE_ROW_LIMIT: usize = 5;

/// Numeric columns (in table order) that get preview statistics.
pub const STATISTICS_COLUMN_LIMIT: usize = 5;

/// Length cap for the pretty-printed preview of non-tabular JSON.
const JSON_PREVIEW_LIMIT: usize = 1000;

pub fn summarize(document: &TabularDocument) -> PreviewSummary {
    match document {
        TabularDocument::Table(table) => summarize_table(table),
        TabularDocument::Opaque(value) => PreviewSummary::Json {
            preview: json_preview(value),
        },
    }
}

fn summarize_table(table: &Table) -> PreviewSummary {
    let sample = (0..table.row_count().min(SAMPLE_ROW_LIMIT))
        .map(|row| table.row_object(row))
        .collect();

    let mut data_types = Map::new();
    for column in table.columns() {
        data_types.insert(
            column.name.clone(),
            Value::from(column.column_type.label()),
        );
    }

    let numeric = table.numeric_columns();
    let statistics = if numeric.is_empty() {
        None
    } else {
        let mut out = Map::new();
        for column in numeric.into_iter().take(STATISTICS_COLUMN_LIMIT) {
            let stats = column_statistics(column);
            out.insert(
                column.name.clone(),
                serde_json::to_value(stats).unwrap_or(Value::Null),
            );
        }
        Some(out)
    };

    PreviewSummary::Dataframe {
        rows: table.row_count(),
        columns: table.column_count(),
        column_names: table.column_names(),
        sample,
        data_types,
        statistics,
    }
}

/// Min/max/mean/median over the non-missing values of a numeric column.
/// A column with nothing to aggregate reports every statistic as undefined.
pub fn column_statistics(column: &Column) -> ColumnStatistics {
    let values = column.numeric_values();
    ColumnStatistics {
        min: stats::min(&values),
        max: stats::max(&values),
        mean: stats::mean(&values),
        median: stats::median(&values),
    }
}

fn json_preview(value: &Value) -> String {
    let compact = value.to_string();
    let pretty = serde_json::to_string_pretty(value).unwrap_or(compact.clone());
    if compact.len() > JSON_PREVIEW_LIMIT {
        let truncated: String = pretty.chars().take(JSON_PREVIEW_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        pretty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numeric_table(name: &str, values: &[&str]) -> Table {
        Table::from_string_records(
            vec![name.to_string()],
            values.iter().map(|v| vec![Some(v.to_string())]).collect(),
        )
    }

    #[test]
    fn test_statistics_for_one_to_five() {
        let table = numeric_table("n", &["1", "2", "3", "4", "5"]);
        let stats = column_statistics(&table.columns()[0]);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.median, Some(3.0));
    }

    #[test]
    fn test_all_missing_column_reports_undefined_not_zero() {
        let table = numeric_table("n", &["", "NA", "null"]);
        let stats = column_statistics(&table.columns()[0]);
        assert_eq!(
            stats,
            ColumnStatistics {
                min: None,
                max: None,
                mean: None,
                median: None,
            }
        );
    }

    #[test]
    fn test_sample_is_first_five_rows_in_order() {
        let rows: Vec<Vec<Option<String>>> =
            (0..8).map(|i| vec![Some(i.to_string())]).collect();
        let table = Table::from_string_records(vec!["i".into()], rows);
        let summary = summarize(&TabularDocument::Table(table));
        match summary {
            PreviewSummary::Dataframe { rows, sample, .. } => {
                assert_eq!(rows, 8);
                assert_eq!(sample.len(), 5);
                assert_eq!(sample[0]["i"], json!(0));
                assert_eq!(sample[4]["i"], json!(4));
            }
            PreviewSummary::Json { .. } => panic!("expected dataframe summary"),
        }
    }

    #[test]
    fn test_statistics_limited_to_first_five_numeric_columns() {
        let headers: Vec<String> = (0..7).map(|i| format!("c{}", i)).collect();
        let row: Vec<Option<String>> = (0..7).map(|i| Some(i.to_string())).collect();
        let table = Table::from_string_records(headers, vec![row.clone(), row]);
        let summary = summarize(&TabularDocument::Table(table));
        match summary {
            PreviewSummary::Dataframe { statistics, .. } => {
                let statistics = statistics.expect("numeric columns present");
                assert_eq!(statistics.len(), 5);
                let keys: Vec<&String> = statistics.keys().collect();
                assert_eq!(keys, vec!["c0", "c1", "c2", "c3", "c4"]);
            }
            PreviewSummary::Json { .. } => panic!("expected dataframe summary"),
        }
    }

    #[test]
    fn test_no_statistics_without_numeric_columns() {
        let table = Table::from_string_records(
            vec!["word".into()],
            vec![vec![Some("alpha".to_string())], vec![Some("beta".to_string())]],
        );
        let summary = summarize(&TabularDocument::Table(table));
        match summary {
            PreviewSummary::Dataframe { statistics, .. } => assert!(statistics.is_none()),
            PreviewSummary::Json { .. } => panic!("expected dataframe summary"),
        }
    }

    #[test]
    fn test_sample_rows_match_source_fixture_field_for_field() {
        let source = "\
Product,Price,Quantity\n\
Laptop,1200,5\n\
Phone,800,10\n\
Tablet,600,8\n\
Laptop,1300,3\n\
Phone,750,12\n\
Tablet,550,7\n\
Laptop,1250,6\n\
Phone,820,9\n\
Tablet,580,4\n\
Laptop,1350,5\n";
        let document =
            crate::infrastructure::tabular::load_bytes(source.as_bytes(), "csv").unwrap();
        let summary = summarize(&document);
        match summary {
            PreviewSummary::Dataframe {
                rows,
                column_names,
                sample,
                ..
            } => {
                assert_eq!(rows, 10);
                assert_eq!(column_names, vec!["Product", "Price", "Quantity"]);
                let expected = [
                    ("Laptop", 1200, 5),
                    ("Phone", 800, 10),
                    ("Tablet", 600, 8),
                    ("Laptop", 1300, 3),
                    ("Phone", 750, 12),
                ];
                assert_eq!(sample.len(), expected.len());
                for (row, (product, price, quantity)) in sample.iter().zip(expected) {
                    assert_eq!(row["Product"], json!(product));
                    assert_eq!(row["Price"], json!(price));
                    assert_eq!(row["Quantity"], json!(quantity));
                }
            }
            PreviewSummary::Json { .. } => panic!("expected dataframe summary"),
        }
    }

    #[test]
    fn test_opaque_document_gets_json_preview() {
        let value = json!({"nested": {"a": 1}});
        let summary = summarize(&TabularDocument::Opaque(value));
        match summary {
            PreviewSummary::Json { preview } => assert!(preview.contains("nested")),
            PreviewSummary::Dataframe { .. } => panic!("expected json summary"),
        }
    }

    #[test]
    fn test_long_json_preview_is_truncated() {
        let items: Vec<Value> = (0..200).map(|i| json!({ "key": i })).collect();
        let summary = summarize(&TabularDocument::Opaque(json!({ "items": items })));
        match summary {
            PreviewSummary::Json { preview } => {
                assert!(preview.ends_with("..."));
                assert!(preview.chars().count() <= 1003);
            }
            PreviewSummary::Dataframe { .. } => panic!("expected json summary"),
        }
    }
}
