// ============================================================
// SPREADSHEET PARSER
// ============================================================
// First worksheet of an xlsx/xls workbook, first row as headers.

use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

pub fn parse(bytes: &[u8], extension: &str) -> Result<Table> {
    let cursor = Cursor::new(bytes.to_vec());
    let range = match extension {
        "xlsx" => {
            let mut workbook: Xlsx<_> = Xlsx::new(cursor).map_err(|e| {
                AppError::ParseError(format!("failed to open xlsx workbook: {}", e))
            })?;
            first_worksheet(&mut workbook)?
        }
        "xls" => {
            let mut workbook: Xls<_> = Xls::new(cursor).map_err(|e| {
                AppError::ParseError(format!("failed to open xls workbook: {}", e))
            })?;
            first_worksheet(&mut workbook)?
        }
        other => return Err(AppError::UnsupportedFormat(format!(".{}", other))),
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_cell).collect(),
        None => return Err(AppError::ParseError("worksheet is empty".to_string())),
    };

    let records: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(value_cell).collect())
        .collect();

    Ok(Table::from_string_records(headers, records))
}

fn first_worksheet<RS, R>(workbook: &mut R) -> Result<Range<Data>>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("no worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("failed to read worksheet: {}", e)))
}

fn header_cell(cell: &Data) -> String {
    value_cell(cell).unwrap_or_default()
}

fn value_cell(cell: &Data) -> Option<String> {
    if cell.is_empty() {
        return None;
    }
    Some(
        cell.as_string()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}", cell)),
    )
}
