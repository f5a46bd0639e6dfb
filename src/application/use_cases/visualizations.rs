// ============================================================
// VISUALIZATIONS
// ============================================================
// Chart-ready aggregates derived from a table, always in the same
// order: correlation heatmap, then histograms for the leading numeric
// columns, then category counts for the leading text columns.

use std::collections::HashMap;

use crate::application::use_cases::stats;
use crate::domain::table::{CellValue, Column, TabularDocument};
use crate::domain::visualization::{
    CategoryCount, CorrelationCell, HistogramBin, VisualizationSpec,
};

pub const HISTOGRAM_BINS: usize = 10;
pub const HISTOGRAM_COLUMN_LIMIT: usize = 3;
pub const CATEGORY_COLUMN_LIMIT: usize = 2;
pub const CATEGORY_LIMIT: usize = 10;

/// Derive every chart payload for a document. Non-tabular documents yield
/// nothing. A failure deriving one category chart drops that chart only.
pub fn derive_visualizations(document: &TabularDocument) -> Vec<VisualizationSpec> {
    let table = match document.as_table() {
        Some(table) => table,
        None => return Vec::new(),
    };

    let mut visualizations = Vec::new();

    let numeric = table.numeric_columns();
    if numeric.len() >= 2 {
        visualizations.push(VisualizationSpec::heatmap(
            "Correlation Matrix".to_string(),
            correlation_cells(&numeric),
        ));
    }

    for column in numeric.iter().take(HISTOGRAM_COLUMN_LIMIT) {
        if let Some(bins) = histogram_bins(column) {
            visualizations.push(VisualizationSpec::histogram(
                format!("Distribution of {}", column.name),
                bins,
            ));
        }
    }

    for column in table.text_columns().into_iter().take(CATEGORY_COLUMN_LIMIT) {
        // A column that cannot produce counts is skipped, never an error.
        if let Some(counts) = category_counts(column) {
            visualizations.push(VisualizationSpec::category_counts(
                format!("Distribution of {}", column.name),
                counts,
            ));
        }
    }

    visualizations
}

/// Dense N x N Pearson matrix over every numeric column, diagonal and
/// symmetric cells included. Off-diagonal pairs use the rows where both
/// values are present; an undefined correlation becomes a null cell.
fn correlation_cells(columns: &[&Column]) -> Vec<CorrelationCell> {
    let mut cells = Vec::with_capacity(columns.len() * columns.len());
    for a in columns {
        for b in columns {
            let value = if a.name == b.name {
                1.0
            } else {
                paired_pearson(a, b).unwrap_or(f64::NAN)
            };
            cells.push(CorrelationCell {
                x: a.name.clone(),
                y: b.name.clone(),
                value,
            });
        }
    }
    cells
}

fn paired_pearson(a: &Column, b: &Column) -> Option<f64> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (left, right) in a.values.iter().zip(b.values.iter()) {
        if let (CellValue::Number(x), CellValue::Number(y)) = (left, right) {
            xs.push(*x);
            ys.push(*y);
        }
    }
    stats::pearson(&xs, &ys)
}

/// Equal-width bins over the observed range of the column's non-missing
/// values. A column with no observations yields no histogram; a constant
/// column bins over `[v - 0.5, v + 0.5]`.
fn histogram_bins(column: &Column) -> Option<Vec<HistogramBin>> {
    let values = column.numeric_values();
    if values.is_empty() {
        return None;
    }

    let mut low = stats::min(&values)?;
    let mut high = stats::max(&values)?;
    if low == high {
        low -= 0.5;
        high += 0.5;
    }
    let width = (high - low) / HISTOGRAM_BINS as f64;

    let mut counts = vec![0u64; HISTOGRAM_BINS];
    for value in &values {
        let mut index = ((value - low) / width) as usize;
        // The range maximum belongs to the last bin.
        if index >= HISTOGRAM_BINS {
            index = HISTOGRAM_BINS - 1;
        }
        counts[index] += 1;
    }

    Some(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                bin: format!(
                    "{:.2}-{:.2}",
                    low + i as f64 * width,
                    low + (i + 1) as f64 * width
                ),
                count,
            })
            .collect(),
    )
}

/// Frequency of each distinct value, sorted by count descending (ties keep
/// first-appearance order), truncated to the top entries.
fn category_counts(column: &Column) -> Option<Vec<CategoryCount>> {
    let values = column.category_values();
    if values.is_empty() {
        return None;
    }

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        if !counts.contains_key(&value) {
            order.push(value.clone());
        }
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut entries: Vec<CategoryCount> = order
        .into_iter()
        .map(|category| {
            let count = counts[&category];
            CategoryCount { category, count }
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(CATEGORY_LIMIT);
    Some(entries)
}
