use comfy_table::{Cell, Table};

use crate::categorizer::categorize_transactions;
use crate::error::Result;
use crate::fmt::{amount_range, tag_list};
use crate::importer::parse_tags;
use crate::models::NewRule;
use crate::rules::{create_rule, delete_rule, list_rules};
use crate::session::Session;

pub fn add(session: &Session, rule: NewRule) -> Result<()> {
    let conn = session.accounting("add rules")?;
    let id = create_rule(&conn, rule)?;
    println!("Added rule {id}");
    Ok(())
}

/// Split the `--tags` flag the same way the importer splits the tags column.
pub fn tags_arg(raw: Option<&str>) -> Vec<String> {
    raw.and_then(parse_tags).unwrap_or_default()
}

pub fn list(session: &Session) -> Result<()> {
    let conn = session.accounting("list rules")?;
    let rules = list_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Keyword", "Merchant", "Amount Range", "Category", "Tags", "Hits"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.keyword.unwrap_or_default()),
            Cell::new(rule.merchant.unwrap_or_default()),
            Cell::new(amount_range(rule.min_amount, rule.max_amount)),
            Cell::new(rule.category.unwrap_or_default()),
            Cell::new(tag_list(Some(rule.tags.as_slice()))),
            Cell::new(rule.hit_count),
        ]);
    }
    println!("Tagging Rules\n{table}");
    Ok(())
}

pub fn delete(session: &Session, id: i64) -> Result<()> {
    let conn = session.accounting("delete rules")?;
    if delete_rule(&conn, id)? {
        println!("Deleted rule {id}");
    } else {
        println!("No rule with ID {id}; nothing deleted");
    }
    Ok(())
}

pub fn apply(session: &Session, all: bool) -> Result<()> {
    let conn = session.accounting("apply rules")?;
    let result = categorize_transactions(&conn, session.policy, all)?;
    println!(
        "{} tagged, {} unmatched",
        result.categorized, result.unmatched
    );
    Ok(())
}
