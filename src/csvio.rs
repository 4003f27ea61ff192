//! CSV import/export for ledger entries
//!
//! CSV is the additive side door into the store: it never deduplicates.
//! Parsing is quote-aware (embedded commas and newlines inside quoted
//! fields, doubled quotes, CRLF as a single record terminator) and trims
//! whitespace on every field. Headers are matched case-insensitively in
//! English or Chinese. Export prepends a byte-order mark so spreadsheet
//! tools pick up the UTF-8 encoding.

use chrono::{DateTime, NaiveDate};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, NewEntry};
use crate::storage::EntryRepository;

/// UTF-8 byte-order mark prepended to exports
const BOM: char = '\u{feff}';

/// Column positions resolved from the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub amount: usize,
    pub category: usize,
    pub notes: Option<usize>,
}

/// Result summary of a CSV import
#[derive(Debug, Default)]
pub struct CsvImportResult {
    /// Rows created as new entries
    pub imported: usize,
    /// Blank rows, counted but not treated as errors
    pub skipped: usize,
    /// Per-row failure descriptions, tagged with 1-based data-row numbers
    pub errors: Vec<String>,
}

/// Parse CSV text into rows of trimmed fields
pub fn parse(content: &str) -> LedgerResult<Vec<Vec<String>>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| LedgerError::Validation(format!("CSV parse error: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Validate the header row and resolve column positions
///
/// Date, amount, and category columns are required; notes is optional.
/// Labels match case-insensitively and accept Chinese or English variants.
pub fn validate_structure(rows: &[Vec<String>]) -> LedgerResult<ColumnMap> {
    let header = rows
        .first()
        .ok_or_else(|| LedgerError::Validation("CSV file is empty".into()))?;

    let find = |names: &[&str]| {
        header.iter().position(|label| {
            let label = label.to_lowercase();
            names.iter().any(|name| label.contains(name))
        })
    };

    let date = find(&["date", "日期", "时间"])
        .ok_or_else(|| LedgerError::Validation("missing required column: date".into()))?;
    let amount = find(&["amount", "金额"])
        .ok_or_else(|| LedgerError::Validation("missing required column: amount".into()))?;
    let category = find(&["category", "类别", "分类"])
        .ok_or_else(|| LedgerError::Validation("missing required column: category".into()))?;
    let notes = find(&["note", "memo", "备注"]);

    Ok(ColumnMap {
        date,
        amount,
        category,
        notes,
    })
}

/// Convert one data row into entry-creation input
///
/// Returns a descriptive per-row error rather than aborting the file.
pub fn row_to_entry(row: &[String], columns: &ColumnMap) -> Result<NewEntry, String> {
    let field = |index: usize| row.get(index).map(String::as_str).unwrap_or("");

    let date_text = field(columns.date);
    let date = parse_date(date_text).ok_or_else(|| format!("invalid date: '{}'", date_text))?;

    let amount_text = field(columns.amount);
    let amount: f64 = amount_text
        .parse()
        .map_err(|_| format!("invalid amount: '{}'", amount_text))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("amount must be greater than 0: '{}'", amount_text));
    }

    let category = field(columns.category);
    if category.is_empty() {
        return Err("category must not be empty".into());
    }

    let notes = columns.notes.map(field).unwrap_or("");

    Ok(NewEntry {
        amount: Money::from_float(amount),
        date,
        category: category.to_string(),
        notes: notes.to_string(),
    })
}

/// Parse a date as ISO-8601 first, then loose `YYYY[-/]M[-/]D`
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    let parts: Vec<&str> = text.split(['-', '/']).collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Import a CSV file, creating one entry per valid data row
///
/// Blank rows are counted as skipped; any other row failure is collected
/// with its 1-based data-row number. Rows are never deduplicated.
pub fn import_from_csv(content: &str, repo: &EntryRepository) -> LedgerResult<CsvImportResult> {
    let rows = parse(content)?;
    let columns = validate_structure(&rows)?;

    let mut result = CsvImportResult::default();
    for (index, row) in rows[1..].iter().enumerate() {
        let row_number = index + 1;

        if row.iter().all(|field| field.is_empty()) {
            result.skipped += 1;
            continue;
        }

        match row_to_entry(row, &columns) {
            Ok(input) => match repo.create(input) {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(format!("Row {}: {}", row_number, e)),
            },
            Err(e) => result.errors.push(format!("Row {}: {}", row_number, e)),
        }
    }
    Ok(result)
}

/// Serialize entries to CSV text with a BOM and RFC-4180 quoting
pub fn entries_to_csv(entries: &[crate::models::LedgerEntry]) -> LedgerResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Date", "Amount", "Category", "Notes"])
        .map_err(|e| LedgerError::Export(format!("failed to write CSV header: {}", e)))?;

    for entry in entries {
        writer
            .write_record([
                entry.date.to_string(),
                entry.amount.to_string(),
                entry.category.clone(),
                entry.notes.clone(),
            ])
            .map_err(|e| LedgerError::Export(format!("failed to write CSV row: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::Export(format!("failed to flush CSV: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| LedgerError::Export(format!("CSV output was not UTF-8: {}", e)))?;
    Ok(format!("{}{}", BOM, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SessionKey;
    use crate::models::LedgerEntry;
    use crate::storage::{KvEngine, MemoryEngine};
    use std::sync::Arc;

    fn repo() -> EntryRepository {
        let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
        let session = Arc::new(SessionKey::new());
        session.set("pw1");
        EntryRepository::new(engine, session)
    }

    #[test]
    fn test_parse_plain_rows() {
        let rows = parse("a,b,c\n1,2,3\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_comma_and_newline() {
        let rows = parse("a,b\n\"x, y\",\"line1\nline2\"\n").unwrap();
        assert_eq!(rows[1][0], "x, y");
        assert_eq!(rows[1][1], "line1\nline2");
    }

    #[test]
    fn test_parse_doubled_quote() {
        let rows = parse("a\n\"say \"\"hi\"\"\"\n").unwrap();
        assert_eq!(rows[1][0], "say \"hi\"");
    }

    #[test]
    fn test_parse_crlf_single_terminator() {
        let rows = parse("a,b\r\n1,2\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let rows = parse(" a , b \n 1 , 2 \n").unwrap();
        assert_eq!(rows[0], vec!["a", "b"]);
        assert_eq!(rows[1], vec!["1", "2"]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let rows = parse("\u{feff}Date,Amount\n2026-01-15,100\n").unwrap();
        assert_eq!(rows[0][0], "Date");
    }

    #[test]
    fn test_validate_structure_english() {
        let rows = parse("Date,Amount,Category,Notes\n").unwrap();
        let columns = validate_structure(&rows).unwrap();
        assert_eq!(
            columns,
            ColumnMap {
                date: 0,
                amount: 1,
                category: 2,
                notes: Some(3)
            }
        );
    }

    #[test]
    fn test_validate_structure_chinese() {
        let rows = parse("日期,金额,类别,备注\n").unwrap();
        let columns = validate_structure(&rows).unwrap();
        assert_eq!(columns.date, 0);
        assert_eq!(columns.amount, 1);
        assert_eq!(columns.category, 2);
        assert_eq!(columns.notes, Some(3));
    }

    #[test]
    fn test_validate_structure_notes_optional() {
        let rows = parse("date,amount,category\n").unwrap();
        let columns = validate_structure(&rows).unwrap();
        assert_eq!(columns.notes, None);
    }

    #[test]
    fn test_validate_structure_missing_column() {
        let rows = parse("date,category\n").unwrap();
        let err = validate_structure(&rows).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_row_to_entry_loose_date() {
        let columns = ColumnMap {
            date: 0,
            amount: 1,
            category: 2,
            notes: Some(3),
        };
        let row: Vec<String> = ["2026/1/15", "100", "餐饮", "午餐"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let entry = row_to_entry(&row, &columns).unwrap();
        assert_eq!(entry.date.to_string(), "2026-01-15");
        assert_eq!(entry.amount, Money::from_cents(10000));
        assert_eq!(entry.category, "餐饮");
        assert_eq!(entry.notes, "午餐");
    }

    #[test]
    fn test_row_to_entry_rejects_bad_rows() {
        let columns = ColumnMap {
            date: 0,
            amount: 1,
            category: 2,
            notes: None,
        };
        let row = |a: &str, b: &str, c: &str| -> Vec<String> {
            vec![a.to_string(), b.to_string(), c.to_string()]
        };

        assert!(row_to_entry(&row("nonsense", "100", "food"), &columns)
            .unwrap_err()
            .contains("invalid date"));
        assert!(row_to_entry(&row("2026-01-15", "abc", "food"), &columns)
            .unwrap_err()
            .contains("invalid amount"));
        assert!(row_to_entry(&row("2026-01-15", "-5", "food"), &columns)
            .unwrap_err()
            .contains("greater than 0"));
        assert!(row_to_entry(&row("2026-01-15", "100", ""), &columns)
            .unwrap_err()
            .contains("category"));
    }

    #[test]
    fn test_import_counts_blank_rows_as_skipped() {
        // Chinese headers, one valid row, one all-blank row
        let content = "日期,金额,类别,备注\n2026/1/15,100,餐饮,午餐\n,,,";
        let repo = repo();
        let result = import_from_csv(content, &repo).unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
        assert!(result.errors.is_empty());

        let entries = repo.get_all(None, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].notes, "午餐");
    }

    #[test]
    fn test_import_collects_row_errors_with_numbers() {
        let content = "date,amount,category\n2026-01-15,100,food\nbad,100,food\n2026-01-16,0,food\n";
        let repo = repo();
        let result = import_from_csv(content, &repo).unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("Row 2:"));
        assert!(result.errors[1].starts_with("Row 3:"));
    }

    #[test]
    fn test_import_never_deduplicates() {
        let content = "date,amount,category\n2026-01-15,100,food\n2026-01-15,100,food\n";
        let repo = repo();
        let result = import_from_csv(content, &repo).unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(repo.get_all(None, None).unwrap().len(), 2);
    }

    #[test]
    fn test_serialize_quotes_and_bom() {
        let entry = LedgerEntry::new(NewEntry {
            amount: Money::from_cents(10050),
            date: "2026-01-15".parse().unwrap(),
            category: "food".into(),
            notes: "lunch, with \"friends\"".into(),
        });
        let text = entries_to_csv(&[entry]).unwrap();

        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("Date,Amount,Category,Notes"));
        assert!(text.contains("\"lunch, with \"\"friends\"\"\""));
    }

    #[test]
    fn test_csv_roundtrip() {
        let originals = vec![
            LedgerEntry::new(NewEntry {
                amount: Money::from_cents(10050),
                date: "2026-01-15".parse().unwrap(),
                category: "food".into(),
                notes: "lunch, downtown".into(),
            }),
            LedgerEntry::new(NewEntry {
                amount: Money::from_cents(250),
                date: "2026-01-16".parse().unwrap(),
                category: "transport".into(),
                notes: "the \"express\" bus".into(),
            }),
        ];

        let text = entries_to_csv(&originals).unwrap();
        let rows = parse(&text).unwrap();
        let columns = validate_structure(&rows).unwrap();

        let recovered: Vec<NewEntry> = rows[1..]
            .iter()
            .map(|row| row_to_entry(row, &columns).unwrap())
            .collect();

        for (original, back) in originals.iter().zip(&recovered) {
            assert_eq!(back.date, original.date);
            assert_eq!(back.amount, original.amount);
            assert_eq!(back.category, original.category);
            assert_eq!(back.notes, original.notes);
        }
    }
}
