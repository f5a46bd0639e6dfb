// ============================================================
// TABLE
// ============================================================
// In-memory column-major table with inferred per-column types

use serde::Serialize;
use serde_json::Value;

/// A single cell. Missing cells are excluded from every aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// JSON rendering for preview rows. Whole numbers serialize as integers
    /// so integer columns round-trip the way they appeared in the source.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    Value::from(*n as i64)
                } else {
                    Value::from(*n)
                }
            }
            CellValue::Text(s) => Value::from(s.clone()),
            CellValue::Missing => Value::Null,
        }
    }
}

/// Inferred semantic type of a column. Display label only; the analysis
/// pipeline branches on numeric/text detection and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
    Other,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }

    pub fn is_text(&self) -> bool {
        self.column_type == ColumnType::Text
    }

    /// Non-missing numeric values in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|cell| match cell {
                CellValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Non-missing values rendered as category labels, in row order.
    pub fn category_values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|cell| match cell {
                CellValue::Text(s) => Some(s.clone()),
                CellValue::Number(n) => Some(cell_number_label(*n)),
                CellValue::Missing => None,
            })
            .collect()
    }
}

fn cell_number_label(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Tokens treated as absent when reading delimited or spreadsheet text.
const NA_TOKENS: [&str; 4] = ["na", "n/a", "nan", "null"];

fn is_na_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NA_TOKENS.contains(&trimmed.to_ascii_lowercase().as_str())
}

fn is_bool_token(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "false")
}

/// Ordered columns of equal length with unique names.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table from header names and textual row records, inferring a
    /// type per column. A column where every non-missing cell parses as a
    /// number is numeric (an all-missing column counts as numeric too, with
    /// every statistic undefined). All-boolean columns are `other`; anything
    /// else is text.
    pub fn from_string_records(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Table {
        let column_count = headers.len();
        let mut cells: Vec<Vec<CellValue>> = vec![Vec::with_capacity(rows.len()); column_count];

        for row in &rows {
            for (idx, slot) in cells.iter_mut().enumerate() {
                let cell = match row.get(idx).and_then(|value| value.as_deref()) {
                    None => CellValue::Missing,
                    Some(raw) if is_na_token(raw) => CellValue::Missing,
                    Some(raw) => {
                        let trimmed = raw.trim();
                        if is_bool_token(trimmed) {
                            CellValue::Text(trimmed.to_string())
                        } else {
                            match trimmed.parse::<f64>() {
                                Ok(n) if n.is_finite() => CellValue::Number(n),
                                _ => CellValue::Text(trimmed.to_string()),
                            }
                        }
                    }
                };
                slot.push(cell);
            }
        }

        Self::from_cells(headers, cells)
    }

    /// Build a table from already-typed cells. Column names are deduplicated
    /// with `.1`, `.2` suffixes and empty names become `Unnamed: {index}`.
    pub fn from_cells(headers: Vec<String>, cells: Vec<Vec<CellValue>>) -> Table {
        let row_count = cells.first().map(|c| c.len()).unwrap_or(0);
        let names = unique_names(headers);

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column {
                column_type: infer_column_type(&values),
                name,
                values,
            })
            .collect();

        Table { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    /// Text columns in table order.
    pub fn text_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_text()).collect()
    }

    /// One row as an ordered name -> value mapping. Missing cells map to null.
    pub fn row_object(&self, index: usize) -> serde_json::Map<String, Value> {
        let mut object = serde_json::Map::new();
        for column in &self.columns {
            let value = column
                .values
                .get(index)
                .map(CellValue::to_json)
                .unwrap_or(Value::Null);
            object.insert(column.name.clone(), value);
        }
        object
    }
}

fn infer_column_type(values: &[CellValue]) -> ColumnType {
    let mut saw_number = false;
    let mut saw_text = false;
    let mut all_bool = true;

    for cell in values {
        match cell {
            CellValue::Number(_) => {
                saw_number = true;
                all_bool = false;
            }
            CellValue::Text(s) => {
                saw_text = true;
                if !is_bool_token(s) {
                    all_bool = false;
                }
            }
            CellValue::Missing => {}
        }
    }

    if !saw_text {
        // Covers the all-missing column: no evidence against numeric.
        ColumnType::Numeric
    } else if !saw_number && all_bool {
        ColumnType::Other
    } else {
        ColumnType::Text
    }
}

fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let base = if raw.trim().is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                raw.trim().to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// What a data file decodes to: a structured table, or a JSON document that
/// did not have tabular shape and is carried through opaque.
#[derive(Debug, Clone)]
pub enum TabularDocument {
    Table(Table),
    Opaque(Value),
}

impl TabularDocument {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            TabularDocument::Table(table) => Some(table),
            TabularDocument::Opaque(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn test_numeric_column_inference() {
        let table = Table::from_string_records(
            vec!["price".into(), "name".into()],
            vec![record(&["1.5", "widget"]), record(&["2", "gadget"])],
        );
        assert_eq!(table.columns()[0].column_type, ColumnType::Numeric);
        assert_eq!(table.columns()[1].column_type, ColumnType::Text);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let table = Table::from_string_records(
            vec!["empty".into()],
            vec![record(&[""]), record(&["NA"]), record(&["null"])],
        );
        assert_eq!(table.columns()[0].column_type, ColumnType::Numeric);
        assert!(table.columns()[0].numeric_values().is_empty());
    }

    #[test]
    fn test_boolean_column_is_other() {
        let table = Table::from_string_records(
            vec!["active".into()],
            vec![record(&["true"]), record(&["False"]), record(&[""])],
        );
        assert_eq!(table.columns()[0].column_type, ColumnType::Other);
    }

    #[test]
    fn test_mixed_column_is_text() {
        let table = Table::from_string_records(
            vec!["code".into()],
            vec![record(&["12"]), record(&["A7"])],
        );
        assert_eq!(table.columns()[0].column_type, ColumnType::Text);
    }

    #[test]
    fn test_duplicate_and_empty_headers() {
        let table = Table::from_string_records(
            vec!["a".into(), "a".into(), "".into()],
            vec![record(&["1", "2", "3"])],
        );
        assert_eq!(
            table.column_names(),
            vec!["a".to_string(), "a.1".to_string(), "Unnamed: 2".to_string()]
        );
    }

    #[test]
    fn test_row_object_preserves_order_and_nulls() {
        let table = Table::from_string_records(
            vec!["x".into(), "y".into()],
            vec![record(&["1", ""]), record(&["2", "b"])],
        );
        let row = table.row_object(0);
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(row["x"], Value::from(1));
        assert_eq!(row["y"], Value::Null);
    }

    #[test]
    fn test_short_rows_pad_with_missing() {
        let table = Table::from_string_records(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".to_string())]],
        );
        assert!(table.columns()[1].values[0].is_missing());
    }

    #[test]
    fn test_whole_numbers_serialize_as_integers() {
        assert_eq!(CellValue::Number(5.0).to_json(), Value::from(5));
        assert_eq!(CellValue::Number(5.5).to_json(), Value::from(5.5));
    }
}
