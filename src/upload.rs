//! Delimited text upload.
//!
//! Turns CSV, TSV or other delimited text into a [`RecordSet`]: the first
//! line is the header, empty lines are skipped and every cell is typed with
//! [`parser::infer_cell`]. The delimiter is guessed from the first rows.

use crate::data::{Record, RecordSet};
use crate::parser;
use csv::ReaderBuilder;
use log::{debug, warn};
use std::path::Path;
use thiserror::Error;

/// Columns a typical limma top table carries. Missing ones only warn.
pub const EXPECTED_COLUMNS: [&str; 8] = [
    "ID",
    "adj.P.Val",
    "P.Value",
    "t",
    "B",
    "logFC",
    "Gene.symbol",
    "Gene.title",
];

const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

const CANDIDATE_DELIMITERS: [u8; 6] = [b',', b'\t', b'|', b';', 0x1e, 0x1f];

/// Rows inspected when guessing the delimiter
const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload a CSV, TSV, or TXT file.")]
    UnsupportedFile,
    #[error("File is empty.")]
    Empty,
    #[error("Error parsing file: {0}")]
    Parse(String),
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub records: RecordSet,
    pub file_name: String,
}

/// Accepts `.csv`, `.tsv` and `.txt`, case-insensitively
pub fn is_supported(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

pub fn read_upload(path: &Path) -> Result<Upload, UploadError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_supported(&file_name) {
        return Err(UploadError::UnsupportedFile);
    }
    let bytes = std::fs::read(path)?;
    parse_upload(&file_name, &bytes)
}

pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Upload, UploadError> {
    if !is_supported(file_name) {
        return Err(UploadError::UnsupportedFile);
    }
    let decoded = String::from_utf8_lossy(bytes);
    let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);

    let records = parse_records(text)?;
    warn_missing_columns(&records);

    Ok(Upload {
        records,
        file_name: file_name.to_string(),
    })
}

/// Parse delimited text with a header line into typed records
pub fn parse_records(text: &str) -> Result<RecordSet, UploadError> {
    let delimiter = guess_delimiter(text).unwrap_or_else(|| {
        debug!("Unable to auto-detect delimiting character; defaulting to ','");
        b','
    });

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| UploadError::Parse(e.to_string()))?
        .clone();

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| UploadError::Parse(e.to_string()))?;
        if row.len() != headers.len() {
            let problem = if row.len() < headers.len() {
                "Too few fields"
            } else {
                "Too many fields"
            };
            return Err(UploadError::Parse(format!(
                "{}: expected {} fields but parsed {} (row {})",
                problem,
                headers.len(),
                row.len(),
                index + 1
            )));
        }
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column, parser::infer_cell(cell)))
            .collect();
        records.push(record);
    }

    if records.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(RecordSet::new(records))
}

/// Pick the candidate delimiter whose preview rows have the most consistent
/// field counts, requiring on average more than one field per row.
pub fn guess_delimiter(text: &str) -> Option<u8> {
    let mut best: Option<(u8, usize, f64)> = None;

    for &delimiter in CANDIDATE_DELIMITERS.iter() {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let counts: Vec<usize> = reader
            .records()
            .filter_map(Result::ok)
            .take(PREVIEW_ROWS)
            .map(|row| row.len())
            .collect();
        if counts.is_empty() {
            continue;
        }

        let delta: usize = counts.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
        let average = counts.iter().sum::<usize>() as f64 / counts.len() as f64;

        let better = match best {
            None => true,
            Some((_, best_delta, best_average)) => delta <= best_delta && average > best_average,
        };
        if better && average > 1.99 {
            best = Some((delimiter, delta, average));
        }
    }

    best.map(|(delimiter, _, _)| delimiter)
}

fn warn_missing_columns(records: &RecordSet) {
    let Some(first) = records.first() else {
        return;
    };
    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|column| first.get(column).is_none())
        .collect();
    if !missing.is_empty() {
        warn!("Missing potential columns: {}", missing.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use std::io::Write;

    #[test]
    fn test_extension_check() {
        assert!(is_supported("results.csv"));
        assert!(is_supported("RESULTS.TSV"));
        assert!(is_supported("notes.Txt"));
        assert!(!is_supported("table.xlsx"));
        assert!(!is_supported("csv"));
    }

    #[test]
    fn test_unsupported_file_is_rejected_before_parsing() {
        let err = parse_upload("plot.xlsx", b"a,b\n1,2\n").unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFile));
        assert_eq!(err.to_string(), "Please upload a CSV, TSV, or TXT file.");
    }

    #[test]
    fn test_comma_separated_with_typed_cells() {
        let upload = parse_upload("top.csv", b"Gene.symbol,logFC,flag\nTP53,2.5,TRUE\nEGFR,,x\n").unwrap();
        assert_eq!(upload.file_name, "top.csv");
        let first = &upload.records.records()[0];
        assert_eq!(first.get("Gene.symbol"), Some(&Value::from("TP53")));
        assert_eq!(first.get("logFC"), Some(&Value::Number(2.5)));
        assert_eq!(first.get("flag"), Some(&Value::Bool(true)));
        let second = &upload.records.records()[1];
        assert_eq!(second.get("logFC"), Some(&Value::Empty));
    }

    #[test]
    fn test_tab_separated_is_detected() {
        assert_eq!(guess_delimiter("ID\tlogFC\tt\np1\t1.0\t2.0\n"), Some(b'\t'));
        let records = parse_records("ID\tlogFC\np1\t-1.5\np2\t0.3\n").unwrap();
        assert_eq!(records.columns(), vec!["ID", "logFC"]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_semicolon_and_pipe_are_detected() {
        assert_eq!(guess_delimiter("a;b;c\n1;2;3\n"), Some(b';'));
        assert_eq!(guess_delimiter("a|b\n1|2\n"), Some(b'|'));
    }

    #[test]
    fn test_single_column_falls_back_to_comma() {
        assert_eq!(guess_delimiter("gene\nTP53\nEGFR\n"), None);
        let records = parse_records("gene\nTP53\nEGFR\n").unwrap();
        assert_eq!(records.columns(), vec!["gene"]);
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let records = parse_records("a,b\n\n1,2\n\n3,4\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = parse_records("a,b,c\n").unwrap_err();
        assert!(matches!(err, UploadError::Empty));
        assert_eq!(err.to_string(), "File is empty.");
        assert!(matches!(parse_records("").unwrap_err(), UploadError::Empty));
    }

    #[test]
    fn test_short_row_is_a_parse_error() {
        let err = parse_records("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error parsing file: Too few fields: expected 3 fields but parsed 2 (row 2)"
        );
    }

    #[test]
    fn test_long_row_is_a_parse_error() {
        let err = parse_records("a,b\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("Too many fields"));
    }

    #[test]
    fn test_bom_and_quotes() {
        let upload = parse_upload(
            "q.csv",
            "\u{feff}Gene.title,count\n\"DNA replication, nuclear\",25\n".as_bytes(),
        )
        .unwrap();
        let first = upload.records.first().unwrap();
        assert_eq!(first.columns().next(), Some("Gene.title"));
        assert_eq!(first.label("Gene.title"), "DNA replication, nuclear");
    }

    #[test]
    fn test_read_upload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Gene.symbol\tlogFC").unwrap();
        writeln!(file, "MYC\t1.2").unwrap();
        drop(file);

        let upload = read_upload(&path).unwrap();
        assert_eq!(upload.file_name, "genes.tsv");
        assert_eq!(upload.records.len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, UploadError::Read(_)));
    }
}
