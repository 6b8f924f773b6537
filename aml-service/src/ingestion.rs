//! Spreadsheet ingestion: column normalization, coercion, and warnings.
//!
//! Headers are normalized, cells are coerced one at a time, and problems
//! are collected as warnings rather than failing the whole upload.

use std::collections::HashMap;
use std::io::Cursor;

use aml_engine::{HighRiskCountry, Transaction, WatchlistEntry};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::ServiceError;
use crate::store::WorkInstruction;

/// Result of parsing one worksheet: the typed rows plus any non-fatal
/// warnings collected along the way.
pub struct Parsed<T> {
    /// Successfully coerced rows.
    pub rows: Vec<T>,
    /// Missing-column / coercion warnings, for display in `UploadResponse`.
    pub warnings: Vec<String>,
}

fn normalize_header(raw: &str) -> String {
    let collapsed = raw.trim().split_whitespace().collect::<Vec<_>>().join("_");
    collapsed.to_lowercase()
}

/// Reads the first worksheet of an `.xlsx`/`.xls` file into a header index
/// map and the data rows (header row excluded).
fn read_sheet(bytes: &[u8]) -> Result<(HashMap<String, usize>, Vec<Vec<Data>>), ServiceError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| ServiceError::Ingestion(format!("could not open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ServiceError::Ingestion("workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ServiceError::Ingestion(format!("could not read worksheet: {e}")))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ServiceError::Ingestion("worksheet is empty".to_string()))?;

    let headers: HashMap<String, usize> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| (normalize_header(&cell.to_string()), i))
        .collect();

    let data_rows: Vec<Vec<Data>> = rows.map(|r| r.to_vec()).collect();
    Ok((headers, data_rows))
}

fn check_required(
    headers: &HashMap<String, usize>,
    required: &[&str],
    warnings: &mut Vec<String>,
) {
    for column in required {
        if !headers.contains_key(*column) {
            warnings.push(format!("missing expected column '{column}'"));
        }
    }
}

fn cell_string(row: &[Data], headers: &HashMap<String, usize>, column: &str) -> String {
    headers
        .get(column)
        .and_then(|&i| row.get(i))
        .map(|c| c.to_string().trim().to_string())
        .unwrap_or_default()
}

fn cell_decimal(row: &[Data], headers: &HashMap<String, usize>, column: &str) -> Decimal {
    headers
        .get(column)
        .and_then(|&i| row.get(i))
        .and_then(|cell| match cell {
            Data::Float(f) => Decimal::try_from(*f).ok(),
            Data::Int(i) => Some(Decimal::from(*i)),
            Data::String(s) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        })
        .unwrap_or(Decimal::ZERO)
}

fn cell_datetime(row: &[Data], headers: &HashMap<String, usize>, column: &str) -> Option<DateTime<Utc>> {
    let cell = headers.get(column).and_then(|&i| row.get(i))?;
    if let Some(naive) = cell.as_datetime() {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }
    let text = cell.to_string();
    let text = text.trim();
    for fmt in ["%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(text, fmt) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(
                date.and_hms_opt(0, 0, 0).unwrap(),
                Utc,
            ));
        }
    }
    None
}

const TRANSACTION_COLUMNS: &[&str] = &[
    "date",
    "amount",
    "sender",
    "receiver",
    "iban",
    "bic",
    "currency",
    "description",
    "transaction_type",
    "business_contact_number",
];

/// Parse a transactions workbook.
pub fn parse_transactions(bytes: &[u8]) -> Result<Parsed<Transaction>, ServiceError> {
    let (headers, rows) = read_sheet(bytes)?;
    let mut warnings = Vec::new();
    check_required(&headers, TRANSACTION_COLUMNS, &mut warnings);

    let mut unparseable_dates = 0usize;
    let parsed = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let date = cell_datetime(row, &headers, "date");
            if date.is_none() {
                unparseable_dates += 1;
            }
            let currency = cell_string(row, &headers, "currency");
            Transaction {
                index,
                date,
                amount: cell_decimal(row, &headers, "amount"),
                sender: cell_string(row, &headers, "sender"),
                receiver: cell_string(row, &headers, "receiver"),
                iban: cell_string(row, &headers, "iban"),
                bic: cell_string(row, &headers, "bic"),
                currency: if currency.is_empty() { "EUR".to_string() } else { currency },
                description: cell_string(row, &headers, "description"),
                transaction_type: cell_string(row, &headers, "transaction_type"),
                business_contact_number: cell_string(row, &headers, "business_contact_number"),
            }
        })
        .collect();

    if unparseable_dates > 0 {
        warnings.push(format!("{unparseable_dates} rows have unparseable dates"));
    }

    Ok(Parsed { rows: parsed, warnings })
}

/// Parse a watchlist workbook.
pub fn parse_watchlist(bytes: &[u8]) -> Result<Parsed<WatchlistEntry>, ServiceError> {
    let (headers, rows) = read_sheet(bytes)?;
    let mut warnings = Vec::new();
    check_required(&headers, &["name"], &mut warnings);

    let parsed = rows
        .iter()
        .map(|row| WatchlistEntry {
            name: cell_string(row, &headers, "name"),
            entry_type: None,
            notes: None,
        })
        .collect();

    Ok(Parsed { rows: parsed, warnings })
}

/// Parse a high-risk-countries workbook.
pub fn parse_high_risk_countries(bytes: &[u8]) -> Result<Parsed<HighRiskCountry>, ServiceError> {
    let (headers, rows) = read_sheet(bytes)?;
    let mut warnings = Vec::new();
    check_required(&headers, &["country_code", "country_name", "risk_level"], &mut warnings);

    let parsed = rows
        .iter()
        .map(|row| HighRiskCountry {
            country_code: cell_string(row, &headers, "country_code").to_uppercase(),
            country_name: cell_string(row, &headers, "country_name"),
            risk_level: cell_string(row, &headers, "risk_level"),
        })
        .collect();

    Ok(Parsed { rows: parsed, warnings })
}

/// Parse a work-instructions workbook.
pub fn parse_work_instructions(bytes: &[u8]) -> Result<Parsed<WorkInstruction>, ServiceError> {
    let (headers, rows) = read_sheet(bytes)?;
    let mut warnings = Vec::new();
    check_required(&headers, &["business_contact_number", "instruction"], &mut warnings);

    let has_bcn_column = headers.contains_key("business_contact_number");
    let parsed = rows
        .iter()
        .map(|row| WorkInstruction {
            business_contact_number: if has_bcn_column {
                Some(cell_string(row, &headers, "business_contact_number"))
            } else {
                None
            },
            instruction: cell_string(row, &headers, "instruction"),
        })
        .collect();

    Ok(Parsed { rows: parsed, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("  Business  Contact   Number "), "business_contact_number");
        assert_eq!(normalize_header("Date"), "date");
    }
}
