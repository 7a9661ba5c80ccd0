use crate::error::Result;
use crate::reports::get_summary;
use crate::session::Session;

pub fn run(session: &Session) -> Result<()> {
    let db_path = session.db_path();
    println!("Database: {}", db_path.display());
    println!("User: {} ({})", display_name(&session.user_name), session.role);
    println!("Match policy: {}", session.policy.as_str());

    if !db_path.exists() {
        println!("Not initialized. Run `hqledger init`.");
        return Ok(());
    }

    let conn = session.accounting("view status")?;
    let s = get_summary(&conn)?;
    println!("Transactions: {} ({} untagged)", s.transactions, s.untagged);
    println!("Rules: {}", s.rules);
    println!(
        "Imports: {}{}",
        s.imports,
        s.last_import.map(|d| format!(", last on {d}")).unwrap_or_default()
    );
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}
