use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::categorizer::{apply_rules, MatchPolicy};
use crate::error::{HqError, Result, ValidationError};
use crate::models::{TransactionCandidate, TransactionType};
use crate::rules::{list_rules, record_hit};
use crate::transactions::insert_candidates;

// ---------------------------------------------------------------------------
// Header schema
// ---------------------------------------------------------------------------

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    date: usize,
    description: usize,
    amount: usize,
    txn_type: usize,
    merchant_name: Option<usize>,
    category: Option<usize>,
    tags: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> std::result::Result<Self, ValidationError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let need = |name: &'static str| find(name).ok_or(ValidationError::MissingColumn(name));
        Ok(Self {
            date: need("date")?,
            description: need("description")?,
            amount: need("amount")?,
            txn_type: need("type")?,
            merchant_name: find("merchant_name"),
            category: find("category"),
            tags: find("tags"),
            notes: find("notes"),
        })
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).map(str::trim).unwrap_or("")
}

fn optional(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.map(|i| field(record, i))
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(
    record: &csv::StringRecord,
    idx: usize,
    line: usize,
    name: &'static str,
) -> std::result::Result<String, ValidationError> {
    let value = field(record, idx);
    if value.is_empty() {
        return Err(ValidationError::MissingField { line, field: name });
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a plain decimal amount. Anything that is not a finite number is
/// rejected, so NaN and infinities never reach the database.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_date(raw: &str) -> Option<String> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn parse_tags(raw: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

fn decode_row(
    cols: &ColumnMap,
    record: &csv::StringRecord,
    line: usize,
) -> std::result::Result<TransactionCandidate, ValidationError> {
    let raw_date = required(record, cols.date, line, "date")?;
    let date = parse_date(&raw_date).ok_or(ValidationError::InvalidDate {
        line,
        raw: raw_date.clone(),
    })?;
    let description = required(record, cols.description, line, "description")?;
    let raw_amount = required(record, cols.amount, line, "amount")?;
    let amount = parse_amount(&raw_amount).ok_or(ValidationError::InvalidAmount {
        line,
        raw: raw_amount.clone(),
    })?;
    let raw_type = required(record, cols.txn_type, line, "type")?;
    let txn_type = raw_type
        .parse::<TransactionType>()
        .map_err(|_| ValidationError::InvalidType {
            line,
            raw: raw_type.clone(),
        })?;

    Ok(TransactionCandidate {
        date,
        description,
        merchant_name: optional(record, cols.merchant_name),
        amount,
        txn_type,
        category: optional(record, cols.category),
        tags: cols.tags.and_then(|i| parse_tags(field(record, i))),
        notes: optional(record, cols.notes),
    })
}

// ---------------------------------------------------------------------------
// parse_csv
// ---------------------------------------------------------------------------

/// Decode CSV text into transaction candidates in source order.
///
/// Fields are split on commas only; quote characters are kept as part of the
/// value. Line numbers in errors are physical lines of the input, counting
/// any blank lines before the header.
pub fn parse_csv(text: &str) -> Result<Vec<TransactionCandidate>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut header = None;
    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if header.is_none() {
            header = Some(record);
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        records.push((line, record));
    }
    let header = header.ok_or_else(|| HqError::Parse("empty CSV".to_string()))?;
    if records.is_empty() {
        return Err(HqError::Parse("CSV has a header but no data rows".to_string()));
    }

    let cols = ColumnMap::from_header(&header)?;
    let rows = records
        .iter()
        .map(|(line, record)| decode_row(&cols, record, *line))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub struct ImportResult {
    pub imported: usize,
    pub tagged: usize,
    pub duplicate_file: bool,
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Parse a file, tag each row with the stored rules and insert everything
/// as one batch. A bad row aborts the import with nothing written.
pub fn import_file(conn: &Connection, file_path: &Path, policy: MatchPolicy) -> Result<ImportResult> {
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    {
        let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        if stmt.exists([&checksum])? {
            tracing::warn!(file = %file_path.display(), "file already imported");
            return Ok(ImportResult {
                imported: 0,
                tagged: 0,
                duplicate_file: true,
            });
        }
    }

    let text = String::from_utf8(data).map_err(|e| HqError::Parse(e.to_string()))?;
    let mut rows = parse_csv(&text)?;

    let rules = list_rules(conn)?;
    let mut hits = Vec::new();
    for row in rows.iter_mut() {
        if let Some(rule_id) = apply_rules(&rules, row, policy) {
            hits.push(rule_id);
        }
    }

    let min_date = rows.iter().map(|r| r.date.as_str()).min();
    let max_date = rows.iter().map(|r| r.date.as_str()).max();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO imports (filename, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            rows.len() as i64,
            min_date,
            max_date,
            checksum,
        ],
    )?;
    let import_id = tx.last_insert_rowid();
    let imported = insert_candidates(&tx, Some(import_id), &rows)?;
    for rule_id in &hits {
        record_hit(&tx, *rule_id)?;
    }
    tx.commit()?;

    tracing::info!(imported, tagged = hits.len(), import_id, "import finished");
    Ok(ImportResult {
        imported,
        tagged: hits.len(),
        duplicate_file: false,
    })
}
