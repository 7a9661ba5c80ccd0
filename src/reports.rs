use rusqlite::Connection;

use crate::error::Result;

pub struct CashflowMonth {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
    pub net: f64,
    pub running_balance: f64,
}

pub struct CashflowReport {
    pub months: Vec<CashflowMonth>,
    pub total_inflow: f64,
    pub total_outflow: f64,
}

/// Monthly totals by transaction type. Inflow sums income magnitudes and
/// outflow sums expense magnitudes, so sign conventions in the source file
/// do not matter.
pub fn get_cashflow(conn: &Connection, year: Option<i32>) -> Result<CashflowReport> {
    let year_prefix = year.map(|y| format!("{y:04}-%")).unwrap_or_else(|| "%".to_string());
    let mut stmt = conn.prepare(
        "SELECT substr(date, 1, 7) AS month, \
         SUM(CASE WHEN type = 'income' THEN abs(amount) ELSE 0 END) AS inflow, \
         SUM(CASE WHEN type = 'expense' THEN abs(amount) ELSE 0 END) AS outflow \
         FROM transactions WHERE date LIKE ?1 \
         GROUP BY substr(date, 1, 7) ORDER BY month",
    )?;
    let raw: Vec<(String, f64, f64)> = stmt
        .query_map([&year_prefix], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut months = Vec::with_capacity(raw.len());
    let mut running = 0.0f64;
    for (month, inflow, outflow) in raw {
        let net = inflow - outflow;
        running += net;
        months.push(CashflowMonth {
            month,
            inflow,
            outflow,
            net,
            running_balance: running,
        });
    }
    let total_inflow: f64 = months.iter().map(|m| m.inflow).sum();
    let total_outflow: f64 = months.iter().map(|m| m.outflow).sum();

    Ok(CashflowReport {
        months,
        total_inflow,
        total_outflow,
    })
}

pub struct Summary {
    pub transactions: i64,
    pub untagged: i64,
    pub rules: i64,
    pub imports: i64,
    pub last_import: Option<String>,
}

pub fn get_summary(conn: &Connection) -> Result<Summary> {
    let count = |sql: &str| conn.query_row(sql, [], |r| r.get::<_, i64>(0));
    Ok(Summary {
        transactions: count("SELECT count(*) FROM transactions")?,
        untagged: count("SELECT count(*) FROM transactions WHERE category IS NULL AND tags IS NULL")?,
        rules: count("SELECT count(*) FROM tagging_rules")?,
        imports: count("SELECT count(*) FROM imports")?,
        last_import: conn.query_row("SELECT max(import_date) FROM imports", [], |r| r.get(0))?,
    })
}
