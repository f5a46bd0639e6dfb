// ============================================================
// PROMPTS
// ============================================================
// Textual rendering of a document for the remote model, plus the
// prompt template per requested insight flavor.

use crate::application::use_cases::stats;
use crate::domain::insight::InsightType;
use crate::domain::table::{CellValue, Table, TabularDocument};

const PROMPT_SAMPLE_ROWS: usize = 5;
const PROMPT_JSON_LIMIT: usize = 1000;

/// Render the document the way the model sees it: shape, column list, head
/// rows and descriptive statistics for tables; a truncated dump for opaque
/// JSON documents.
pub(crate) fn describe_document(document: &TabularDocument) -> String {
    match document {
        TabularDocument::Table(table) => {
            let mut body = String::new();
            body.push_str(&format!(
                "Table with {} rows and {} columns.\n",
                table.row_count(),
                table.column_count()
            ));
            body.push_str(&format!("Columns: {}\n", table.column_names().join(", ")));
            body.push_str("Sample data:\n");
            body.push_str(&format_head(table, PROMPT_SAMPLE_ROWS));
            if !table.numeric_columns().is_empty() {
                body.push_str("Summary statistics:\n");
                body.push_str(&format_describe(table));
            }
            body
        }
        TabularDocument::Opaque(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            let truncated: String = pretty.chars().take(PROMPT_JSON_LIMIT).collect();
            format!("JSON data: {}...", truncated)
        }
    }
}

pub(crate) fn build_question_prompt(data_summary: &str, question: &str) -> String {
    format!(
        "As a business intelligence expert, analyze this data and answer the specific question:\n\
         {}\n\
         \n\
         Data:\n\
         {}\n\
         \n\
         Provide a clear, concise answer with specific insights backed by the data.\n\
         Format your response in structured paragraphs with headers for each key point.",
        question, data_summary
    )
}

pub(crate) fn build_insight_prompt(data_summary: &str, insight_type: InsightType) -> String {
    match insight_type {
        InsightType::Trends => format!(
            "As a business intelligence expert, analyze this data and identify the most significant trends.\n\
             \n\
             Data:\n\
             {}\n\
             \n\
             Provide 3-5 key trends with supporting evidence from the data.\n\
             Format your response with clear headers for each trend and supporting points in paragraphs.",
            data_summary
        ),
        InsightType::Anomalies => format!(
            "As a business intelligence expert, analyze this data and identify any anomalies or outliers.\n\
             \n\
             Data:\n\
             {}\n\
             \n\
             Provide details on the most significant anomalies and what they might indicate.\n\
             Format your response with clear headers for each anomaly and supporting points in paragraphs.",
            data_summary
        ),
        InsightType::General => format!(
            "As a business intelligence expert, analyze this data and provide valuable business insights.\n\
             \n\
             Data:\n\
             {}\n\
             \n\
             Provide 3-5 actionable insights that could help business decision-making.\n\
             Include specific details from the data to support each insight.\n\
             Format your response with clear headers for each insight and supporting points in paragraphs.",
            data_summary
        ),
    }
}

/// First rows rendered as a fixed-width text table, missing cells as NaN.
fn format_head(table: &Table, limit: usize) -> String {
    let rows = table.row_count().min(limit);
    let rendered: Vec<Vec<String>> = table
        .columns()
        .iter()
        .map(|column| {
            (0..rows)
                .map(|row| match column.values.get(row) {
                    Some(CellValue::Missing) | None => "NaN".to_string(),
                    Some(cell) => cell.to_json().to_string().trim_matches('"').to_string(),
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .zip(&rendered)
        .map(|(column, cells)| {
            cells
                .iter()
                .map(String::len)
                .chain(std::iter::once(column.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (column, &width) in table.columns().iter().zip(&widths) {
        out.push_str(&format!("{:>width$}  ", column.name));
    }
    out.push('\n');
    for row in 0..rows {
        for (cells, &width) in rendered.iter().zip(&widths) {
            out.push_str(&format!("{:>width$}  ", cells[row]));
        }
        out.push('\n');
    }
    out
}

/// count/mean/std/min/quartiles/max per numeric column.
fn format_describe(table: &Table) -> String {
    const LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    let columns = table.numeric_columns();
    let rendered: Vec<(String, Vec<String>)> = columns
        .iter()
        .map(|column| {
            let values = column.numeric_values();
            let cells = vec![
                format!("{}", values.len()),
                format_stat(stats::mean(&values)),
                format_stat(stats::std_dev(&values)),
                format_stat(stats::min(&values)),
                format_stat(stats::quantile(&values, 0.25)),
                format_stat(stats::quantile(&values, 0.5)),
                format_stat(stats::quantile(&values, 0.75)),
                format_stat(stats::max(&values)),
            ];
            (column.name.clone(), cells)
        })
        .collect();

    let label_width = LABELS.iter().map(|l| l.len()).max().unwrap_or(0);
    let widths: Vec<usize> = rendered
        .iter()
        .map(|(name, cells)| {
            cells
                .iter()
                .map(String::len)
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(label_width));
    for ((name, _), &width) in rendered.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name));
    }
    out.push('\n');
    for (index, label) in LABELS.iter().enumerate() {
        out.push_str(&format!("{:<label_width$}", label));
        for ((_, cells), &width) in rendered.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cells[index]));
        }
        out.push('\n');
    }
    out
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        None => "NaN".to_string(),
        Some(v) => {
            let formatted = format!("{:.6}", v);
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
    }
}
