// ============================================================
// CSV PARSER
// ============================================================
// Delimited-text parsing with an explicit fallback ladder: strict
// UTF-8 first, then alternate encodings, then alternate delimiters,
// finally lossy decoding with automatic delimiter detection. The
// first successful attempt wins.

use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextEncoding {
    /// Strict UTF-8; invalid bytes fail the attempt.
    Utf8,
    /// Windows-1252, the web's Latin-1. Decodes any byte sequence.
    Latin1,
    /// UTF-8 with replacement characters. Last-resort decoding.
    Lossy,
}

impl TextEncoding {
    fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Lossy => "lossy utf-8",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ParseCandidate {
    encoding: TextEncoding,
    /// None means detect from content.
    delimiter: Option<u8>,
    /// Lenient attempts tolerate rows whose width differs from the header.
    lenient: bool,
}

/// Outcome of one rung of the ladder.
enum ParseAttempt {
    Parsed(Table),
    Failed(String),
}

pub fn parse(bytes: &[u8]) -> Result<Table> {
    let candidates = [
        ParseCandidate {
            encoding: TextEncoding::Utf8,
            delimiter: Some(b','),
            lenient: false,
        },
        ParseCandidate {
            encoding: TextEncoding::Latin1,
            delimiter: Some(b','),
            lenient: false,
        },
        ParseCandidate {
            encoding: TextEncoding::Utf8,
            delimiter: Some(b';'),
            lenient: false,
        },
        ParseCandidate {
            encoding: TextEncoding::Utf8,
            delimiter: Some(b'\t'),
            lenient: false,
        },
        ParseCandidate {
            encoding: TextEncoding::Utf8,
            delimiter: Some(b'|'),
            lenient: false,
        },
        ParseCandidate {
            encoding: TextEncoding::Lossy,
            delimiter: None,
            lenient: true,
        },
    ];

    let mut last_failure = String::from("file contains no data");
    for candidate in candidates {
        match try_candidate(bytes, candidate) {
            ParseAttempt::Parsed(table) => return Ok(table),
            ParseAttempt::Failed(cause) => {
                debug!(
                    encoding = candidate.encoding.label(),
                    delimiter = candidate
                        .delimiter
                        .map(|d| (d as char).to_string())
                        .unwrap_or_else(|| "auto".to_string()),
                    cause = %cause,
                    "CSV parse attempt failed"
                );
                last_failure = cause;
            }
        }
    }

    Err(AppError::ParseError(format!(
        "could not parse CSV content: {}",
        last_failure
    )))
}

fn try_candidate(bytes: &[u8], candidate: ParseCandidate) -> ParseAttempt {
    let content = match decode(bytes, candidate.encoding) {
        Some(content) => content,
        None => {
            return ParseAttempt::Failed(format!(
                "content is not valid {}",
                candidate.encoding.label()
            ))
        }
    };
    if content.trim().is_empty() {
        return ParseAttempt::Failed("file contains no data".to_string());
    }

    let delimiter = candidate
        .delimiter
        .unwrap_or_else(|| detect_delimiter(&content));
    parse_with(&content, delimiter, candidate.lenient)
}

fn parse_with(content: &str, delimiter: u8, lenient: bool) -> ParseAttempt {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(lenient)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(str::to_string).collect(),
        Err(err) => return ParseAttempt::Failed(format!("could not read header row: {}", err)),
    };
    if headers.is_empty() {
        return ParseAttempt::Failed("header row is empty".to_string());
    }

    // A one-column parse of content that carries another candidate delimiter
    // means we picked the wrong separator; fail so the ladder can advance.
    if !lenient && headers.len() == 1 {
        if let Some(other) = competing_delimiter(content, delimiter) {
            return ParseAttempt::Failed(format!(
                "parsed a single column but content contains '{}'",
                other as char
            ));
        }
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(record.iter().map(|cell| Some(cell.to_string())).collect()),
            Err(err) => {
                return ParseAttempt::Failed(format!("row {}: {}", rows.len() + 1, err))
            }
        }
    }

    ParseAttempt::Parsed(Table::from_string_records(headers, rows))
}

fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<Cow<'_, str>> {
    let bytes = strip_bom(bytes);
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        TextEncoding::Latin1 => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            Some(text)
        }
        TextEncoding::Lossy => Some(String::from_utf8_lossy(bytes)),
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes)
}

fn competing_delimiter(content: &str, current: u8) -> Option<u8> {
    let first_line = content.lines().next()?;
    DELIMITER_CANDIDATES
        .iter()
        .copied()
        .find(|&candidate| candidate != current && first_line.contains(candidate as char))
}

/// Pick the candidate whose per-line count is high and consistent across the
/// first lines of the content.
pub fn detect_delimiter(content: &str) -> u8 {
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.chars().filter(|&c| c as u32 == delimiter as u32).count())
            .collect();
        if counts.is_empty() {
            continue;
        }

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&count| (count as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());

        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}
