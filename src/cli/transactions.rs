use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::{money, tag_list};
use crate::session::Session;
use crate::transactions::{list_categories, list_transactions};

pub fn list(session: &Session, category: Option<&str>) -> Result<()> {
    let conn = session.accounting("view transactions")?;
    let rows = list_transactions(&conn, category)?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Merchant", "Amount", "Type", "Category", "Tags", "Notes"]);
    for t in &rows {
        table.add_row(vec![
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(t.merchant_name.as_deref().unwrap_or("")),
            Cell::new(money(t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(t.txn_type),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(tag_list(t.tags.as_deref())),
            Cell::new(t.notes.as_deref().unwrap_or("")),
        ]);
    }
    match category {
        Some(cat) => println!("Transactions in {cat} ({})\n{table}", rows.len()),
        None => println!("Transactions ({})\n{table}", rows.len()),
    }
    Ok(())
}

pub fn categories(session: &Session) -> Result<()> {
    let conn = session.accounting("view categories")?;
    for cat in list_categories(&conn)? {
        println!("{cat}");
    }
    Ok(())
}
