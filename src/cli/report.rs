use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::session::Session;

pub fn cashflow(session: &Session, year: Option<i32>) -> Result<()> {
    let conn = session.accounting("view reports")?;
    let data = reports::get_cashflow(&conn, year)?;

    let mut table = Table::new();
    table.set_header(vec!["Month", "Inflow", "Outflow", "Net", "Running"]);
    for m in &data.months {
        let net_str = if m.net >= 0.0 {
            money(m.net).green().to_string()
        } else {
            money(m.net).red().to_string()
        };
        table.add_row(vec![
            Cell::new(&m.month),
            Cell::new(money(m.inflow)),
            Cell::new(money(m.outflow)),
            Cell::new(net_str),
            Cell::new(money(m.running_balance)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(money(data.total_inflow)),
        Cell::new(money(data.total_outflow)),
        Cell::new(money(data.total_inflow - data.total_outflow)),
        Cell::new(""),
    ]);
    println!("Cash Flow\n{table}");
    Ok(())
}
