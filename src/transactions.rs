use rusqlite::{Connection, Row};

use crate::db::{decode_tags, encode_tags};
use crate::error::{Result, ValidationError};
use crate::models::{Transaction, TransactionCandidate, TransactionType};

const SELECT_COLUMNS: &str = "SELECT id, date, description, merchant_name, amount, type, \
     category, tags, notes FROM transactions";

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let raw_type: String = row.get(5)?;
    let txn_type = raw_type.parse::<TransactionType>().map_err(|bad| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown transaction type '{bad}'").into(),
        )
    })?;
    let tags = decode_tags(row.get(7)?);
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        merchant_name: row.get(3)?,
        amount: row.get(4)?,
        txn_type,
        category: row.get(6)?,
        tags: if tags.is_empty() { None } else { Some(tags) },
        notes: row.get(8)?,
    })
}

/// Insert candidates in order. Callers wanting all-or-nothing semantics pass
/// a connection that is inside a transaction.
pub fn insert_candidates(
    conn: &Connection,
    import_id: Option<i64>,
    rows: &[TransactionCandidate],
) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions \
         (date, description, merchant_name, amount, type, category, tags, notes, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for row in rows {
        if !row.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount(row.description.clone()).into());
        }
        stmt.execute(rusqlite::params![
            row.date,
            row.description,
            row.merchant_name,
            row.amount,
            row.txn_type.as_str(),
            row.category,
            row.tags.as_deref().map(encode_tags),
            row.notes,
            import_id,
        ])?;
    }
    Ok(rows.len())
}

/// Newest first. `category` filters on an exact category name.
pub fn list_transactions(conn: &Connection, category: Option<&str>) -> Result<Vec<Transaction>> {
    let rows = match category {
        Some(cat) => {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE category = ?1 ORDER BY date DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([cat], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC"))?;
            let rows = stmt
                .query_map([], transaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

pub(crate) fn list_for_categorize(
    conn: &Connection,
    include_categorized: bool,
) -> Result<Vec<Transaction>> {
    let sql = if include_categorized {
        format!("{SELECT_COLUMNS} ORDER BY id")
    } else {
        format!("{SELECT_COLUMNS} WHERE category IS NULL AND tags IS NULL ORDER BY id")
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], transaction_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_tagging(
    conn: &Connection,
    id: i64,
    category: Option<&str>,
    tags: Option<&[String]>,
) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET category = ?1, tags = ?2, updated_at = datetime('now') WHERE id = ?3",
        rusqlite::params![category, tags.map(encode_tags), id],
    )?;
    Ok(())
}

/// Distinct categories currently assigned, alphabetical.
pub fn list_categories(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM transactions WHERE category IS NOT NULL ORDER BY category",
    )?;
    let cats = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(cats)
}
