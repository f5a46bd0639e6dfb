// ============================================================
// JSON PARSER
// ============================================================
// A root that is a flat list of equal-shaped records loads as a
// table; any other document is carried through opaque.

use serde_json::Value;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, Table, TabularDocument};

pub fn parse(bytes: &[u8]) -> Result<TabularDocument> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::ParseError(format!("invalid JSON: {}", e)))?;

    Ok(match records_table(&value) {
        Some(table) => TabularDocument::Table(table),
        None => TabularDocument::Opaque(value),
    })
}

/// Promote `[{...}, {...}]` to a table when every record is an object with
/// the same key set and only scalar members.
fn records_table(value: &Value) -> Option<Table> {
    let records = value.as_array()?;
    if records.is_empty() {
        return None;
    }

    let keys: Vec<String> = records[0].as_object()?.keys().cloned().collect();

    for record in records {
        let object = record.as_object()?;
        if object.len() != keys.len() {
            return None;
        }
        for key in &keys {
            let member = object.get(key)?;
            if member.is_object() || member.is_array() {
                return None;
            }
        }
    }

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::with_capacity(records.len()); keys.len()];
    for record in records {
        if let Some(object) = record.as_object() {
            for (index, key) in keys.iter().enumerate() {
                cells[index].push(member_cell(&object[key]));
            }
        }
    }

    Some(Table::from_cells(keys, cells))
}

fn member_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Missing,
        Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or(CellValue::Missing),
        Value::Bool(b) => CellValue::Text(b.to_string()),
        Value::String(s) => CellValue::Text(s.clone()),
        // Validated scalar-only above.
        _ => CellValue::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::ColumnType;

    #[test]
    fn test_record_array_becomes_table() {
        let document = parse(
            br#"[{"name": "a", "value": 1}, {"name": "b", "value": 2}]"#,
        )
        .unwrap();
        let table = document.as_table().expect("tabular document");
        assert_eq!(table.column_names(), vec!["name", "value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[1].column_type, ColumnType::Numeric);
    }

    #[test]
    fn test_numeric_looking_strings_stay_text() {
        let document = parse(br#"[{"code": "12"}, {"code": "34"}]"#).unwrap();
        let table = document.as_table().unwrap();
        assert_eq!(table.columns()[0].column_type, ColumnType::Text);
    }

    #[test]
    fn test_null_members_are_missing() {
        let document = parse(br#"[{"v": 1}, {"v": null}]"#).unwrap();
        let table = document.as_table().unwrap();
        assert_eq!(table.columns()[0].numeric_values(), vec![1.0]);
    }

    #[test]
    fn test_root_object_is_opaque() {
        let document = parse(br#"{"rows": [{"a": 1}]}"#).unwrap();
        assert!(document.as_table().is_none());
    }

    #[test]
    fn test_nested_members_are_opaque() {
        let document = parse(br#"[{"a": {"b": 1}}]"#).unwrap();
        assert!(document.as_table().is_none());
    }

    #[test]
    fn test_inconsistent_keys_are_opaque() {
        let document = parse(br#"[{"a": 1}, {"b": 2}]"#).unwrap();
        assert!(document.as_table().is_none());
    }

    #[test]
    fn test_empty_array_is_opaque() {
        let document = parse(b"[]").unwrap();
        assert!(document.as_table().is_none());
    }

    #[test]
    fn test_invalid_json_is_a_parse_failure() {
        assert!(matches!(parse(b"{not json"), Err(AppError::ParseError(_))));
    }
}
