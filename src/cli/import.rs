use std::path::PathBuf;

use crate::error::Result;
use crate::importer::import_file;
use crate::session::Session;

pub fn run(session: &Session, file: &str) -> Result<()> {
    let conn = session.accounting("import transactions")?;
    let result = import_file(&conn, &PathBuf::from(file), session.policy)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!(
        "Imported {} transactions, {} tagged by rules",
        result.imported, result.tagged
    );
    Ok(())
}
