// ============================================================
// TABULAR LOADERS
// ============================================================
// Extension-dispatched decoding of uploaded data files.

pub mod csv;
pub mod json;
pub mod spreadsheet;

use std::path::Path;

use crate::domain::error::{AppError, Result};
use crate::domain::table::TabularDocument;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "xlsx", "xls", "json"];

pub fn is_supported(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
}

pub fn load_path(path: &Path) -> Result<TabularDocument> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::IoError(format!("failed to read {}: {}", path.display(), e)))?;
    load_bytes(&bytes, &extension)
}

pub fn load_bytes(bytes: &[u8], extension: &str) -> Result<TabularDocument> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    match extension.as_str() {
        "csv" => csv::parse(bytes).map(TabularDocument::Table),
        "xlsx" | "xls" => spreadsheet::parse(bytes, &extension).map(TabularDocument::Table),
        "json" => json::parse(bytes),
        other => Err(AppError::UnsupportedFormat(format!(".{}", other))),
    }
}
