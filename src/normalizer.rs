use std::collections::HashMap;
use std::io::Read;

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::models::NewTransaction;

/// One CSV row keyed by its (cleaned) header name.
pub type RawRow = HashMap<String, String>;

/// A row as read from the source; records the reader cannot decode are kept
/// as errors so they are counted with the other dropped rows.
pub type SourceRow = std::result::Result<RawRow, ParseError>;

const DATE_COLUMNS: &[&str] = &["Transaction Date", "Date"];
const DESCRIPTION_COLUMNS: &[&str] = &["Description"];
const AMOUNT_COLUMNS: &[&str] = &["Amount"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a statement amount. Thousands separators, quotes and `$` are
/// stripped; `(12.50)` is read as a negative.
pub fn parse_amount(raw: &str) -> std::result::Result<f64, ParseError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$'))
        .collect();
    let s = cleaned.trim();
    let (negate, digits) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let value: f64 = digits
        .parse()
        .map_err(|_| ParseError::InvalidAmount(raw.to_string()))?;
    if !value.is_finite() {
        return Err(ParseError::InvalidAmount(raw.to_string()));
    }
    Ok(if negate { -value } else { value })
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// First non-blank value among `columns`, in order. Values are returned as
/// written: surrounding whitespace is part of a row's identity.
fn first_present<'a>(row: &'a RawRow, columns: &[&str]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|c| row.get(*c))
        .map(String::as_str)
        .find(|v| !v.trim().is_empty())
}

fn optional(row: &RawRow, column: &str) -> String {
    first_present(row, &[column]).unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

pub fn normalize_row(row: &RawRow) -> std::result::Result<NewTransaction, ParseError> {
    let transaction_date = first_present(row, DATE_COLUMNS)
        .ok_or(ParseError::MissingField("Transaction Date"))?;
    let description = first_present(row, DESCRIPTION_COLUMNS)
        .ok_or(ParseError::MissingField("Description"))?;
    let amount = first_present(row, AMOUNT_COLUMNS)
        .ok_or(ParseError::MissingField("Amount"))
        .and_then(parse_amount)?;

    Ok(NewTransaction {
        transaction_date: transaction_date.to_string(),
        post_date: optional(row, "Post Date"),
        description: description.to_string(),
        category: optional(row, "Category"),
        txn_type: optional(row, "Type"),
        amount,
        memo: optional(row, "Memo"),
    })
}

/// Lazily turns raw rows into candidates, skipping rows that fail to parse.
pub struct Normalizer<I> {
    rows: I,
    row_index: usize,
    dropped: usize,
}

impl<I: Iterator<Item = SourceRow>> Normalizer<I> {
    pub fn new(rows: I) -> Self {
        Self {
            rows,
            row_index: 0,
            dropped: 0,
        }
    }

    /// Rows skipped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<I: Iterator<Item = SourceRow>> Iterator for Normalizer<I> {
    type Item = NewTransaction;

    fn next(&mut self) -> Option<NewTransaction> {
        for row in self.rows.by_ref() {
            self.row_index += 1;
            match row.and_then(|row| normalize_row(&row)) {
                Ok(txn) => return Some(txn),
                Err(e) => {
                    debug!(row = self.row_index, error = %e, "dropping row");
                    self.dropped += 1;
                }
            }
        }
        None
    }
}

pub fn normalize<I>(rows: I) -> Normalizer<I::IntoIter>
where
    I: IntoIterator<Item = SourceRow>,
{
    Normalizer::new(rows.into_iter())
}

// ---------------------------------------------------------------------------
// CSV source
// ---------------------------------------------------------------------------

/// Read a header row plus data rows. Ragged rows are kept; records that
/// cannot be decoded come through as [`ParseError::Unreadable`]. An I/O
/// failure ends the stream after its error.
pub fn read_rows<R: Read>(reader: R) -> Result<impl Iterator<Item = SourceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();

    let mut records = rdr.into_records();
    let mut done = false;
    Ok(std::iter::from_fn(move || {
        if done {
            return None;
        }
        match records.next()? {
            Ok(record) => Some(Ok(headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect())),
            Err(e) => {
                done = e.is_io_error();
                Some(Err(ParseError::Unreadable(e.to_string())))
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Ok(1234.56));
        assert_eq!(parse_amount("\"500.00\""), Ok(500.0));
        assert_eq!(parse_amount("  -42.50  "), Ok(-42.5));
        assert_eq!(parse_amount("0"), Ok(0.0));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("not_a_number").is_err());
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_amount_parenthesized_and_currency() {
        assert_eq!(parse_amount("(1,234.56)"), Ok(-1234.56));
        assert_eq!(parse_amount("$1,234.56"), Ok(1234.56));
        assert_eq!(parse_amount("-$50.00"), Ok(-50.0));
    }

    #[test]
    fn test_transaction_date_preferred_over_date() {
        let r = row(&[
            ("Transaction Date", "01/02/2025"),
            ("Date", "01/05/2025"),
            ("Description", "COFFEE"),
            ("Amount", "-3.50"),
        ]);
        assert_eq!(normalize_row(&r).unwrap().transaction_date, "01/02/2025");
    }

    #[test]
    fn test_falls_back_to_date_column() {
        let r = row(&[("Date", "2025-01-05"), ("Description", "COFFEE"), ("Amount", "-3.50")]);
        let txn = normalize_row(&r).unwrap();
        assert_eq!(txn.transaction_date, "2025-01-05");
        assert_eq!(txn.post_date, "");
        assert_eq!(txn.category, "");
        assert_eq!(txn.memo, "");
    }

    #[test]
    fn test_blank_transaction_date_falls_back() {
        let r = row(&[
            ("Transaction Date", ""),
            ("Date", "2025-01-05"),
            ("Description", "COFFEE"),
            ("Amount", "1"),
        ]);
        assert_eq!(normalize_row(&r).unwrap().transaction_date, "2025-01-05");
    }

    #[test]
    fn test_optional_columns_carried() {
        let r = row(&[
            ("Transaction Date", "01/02/2025"),
            ("Post Date", "01/03/2025"),
            ("Description", "GROCER"),
            ("Category", "Groceries"),
            ("Type", "Sale"),
            ("Amount", "-80.10"),
            ("Memo", "weekly shop"),
        ]);
        let txn = normalize_row(&r).unwrap();
        assert_eq!(txn.post_date, "01/03/2025");
        assert_eq!(txn.category, "Groceries");
        assert_eq!(txn.txn_type, "Sale");
        assert_eq!(txn.memo, "weekly shop");
    }

    #[test]
    fn test_missing_amount_is_dropped() {
        let r = row(&[("Date", "2025-01-05"), ("Description", "COFFEE")]);
        assert_eq!(normalize_row(&r), Err(ParseError::MissingField("Amount")));
    }

    #[test]
    fn test_missing_description_is_dropped() {
        let r = row(&[("Date", "2025-01-05"), ("Amount", "1.00")]);
        assert_eq!(normalize_row(&r), Err(ParseError::MissingField("Description")));
    }

    #[test]
    fn test_normalize_preserves_order_and_counts_drops() {
        let rows = vec![
            row(&[("Date", "d1"), ("Description", "A"), ("Amount", "1")]),
            row(&[("Date", "d2"), ("Description", "B"), ("Amount", "oops")]),
            row(&[("Date", "d3"), ("Description", "C"), ("Amount", "3")]),
        ];
        let mut normalizer = normalize(rows.into_iter().map(Ok));
        let out: Vec<_> = normalizer.by_ref().map(|t| t.description).collect();
        assert_eq!(out, vec!["A", "C"]);
        assert_eq!(normalizer.dropped(), 1);
    }

    #[test]
    fn test_read_rows_trims_headers_and_bom() {
        let content = "\u{feff}Transaction Date , Description,Amount\n01/15/2025,ADOBE,\"1,234.56\"\n";
        let rows: Vec<RawRow> = read_rows(content.as_bytes()).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        let txn = normalize_row(&rows[0]).unwrap();
        assert_eq!(txn.transaction_date, "01/15/2025");
        assert_eq!(txn.amount, 1234.56);
    }

    #[test]
    fn test_read_rows_tolerates_ragged_rows() {
        let content = "Date,Description,Amount,Memo\n2025-01-01,SHORT\n2025-01-02,FULL,5.00,note\n";
        let rows: Vec<SourceRow> = read_rows(content.as_bytes()).unwrap().collect();
        assert_eq!(rows.len(), 2);
        let kept: Vec<_> = normalize(rows).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].memo, "note");
    }

    #[test]
    fn test_values_keep_surrounding_whitespace() {
        let r = row(&[("Date", "2025-01-05"), ("Description", "COFFEE "), ("Amount", " 1.00 ")]);
        let txn = normalize_row(&r).unwrap();
        assert_eq!(txn.description, "COFFEE ");
        assert_eq!(txn.amount, 1.0);
    }

    #[test]
    fn test_whitespace_only_value_is_missing() {
        let r = row(&[("Date", "2025-01-05"), ("Description", "   "), ("Amount", "1.00")]);
        assert_eq!(normalize_row(&r), Err(ParseError::MissingField("Description")));
    }

    #[test]
    fn test_undecodable_record_is_counted_as_dropped() {
        let content: &[u8] = b"Date,Description,Amount\n2025-01-01,OK,1.00\n2025-01-02,\xff\xfe,2.00\n2025-01-03,AFTER,3.00\n";
        let rows: Vec<SourceRow> = read_rows(content).unwrap().collect();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Err(ParseError::Unreadable(_))));

        let mut normalizer = normalize(rows);
        let kept: Vec<_> = normalizer.by_ref().map(|t| t.description).collect();
        assert_eq!(kept, vec!["OK", "AFTER"]);
        assert_eq!(normalizer.dropped(), 1);
    }
}
