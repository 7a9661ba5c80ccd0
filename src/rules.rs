use rusqlite::{Connection, Row};

use crate::db::{decode_tags, encode_tags};
use crate::error::{Result, ValidationError};
use crate::models::{NewRule, TaggingRule};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize blank fields to `None` and check the rule is usable.
pub fn validate(rule: NewRule) -> std::result::Result<NewRule, ValidationError> {
    let rule = NewRule {
        keyword: non_empty(rule.keyword),
        merchant: non_empty(rule.merchant),
        min_amount: rule.min_amount,
        max_amount: rule.max_amount,
        category: non_empty(rule.category),
        tags: rule
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    };

    for bound in [rule.min_amount, rule.max_amount].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(ValidationError::NonFiniteBound);
        }
    }
    if let (Some(min), Some(max)) = (rule.min_amount, rule.max_amount) {
        if min > max {
            return Err(ValidationError::InvalidBounds { min, max });
        }
    }
    if rule.keyword.is_none()
        && rule.merchant.is_none()
        && rule.min_amount.is_none()
        && rule.max_amount.is_none()
    {
        return Err(ValidationError::EmptyRule);
    }
    if rule.category.is_none() && rule.tags.is_empty() {
        return Err(ValidationError::NoAssignment);
    }
    Ok(rule)
}

pub fn create_rule(conn: &Connection, rule: NewRule) -> Result<i64> {
    let rule = validate(rule)?;
    conn.execute(
        "INSERT INTO tagging_rules (keyword, merchant, min_amount, max_amount, category, tags) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            rule.keyword,
            rule.merchant,
            rule.min_amount,
            rule.max_amount,
            rule.category,
            encode_tags(&rule.tags),
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(rule_id = id, "created tagging rule");
    Ok(id)
}

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<TaggingRule> {
    Ok(TaggingRule {
        id: row.get(0)?,
        keyword: row.get(1)?,
        merchant: row.get(2)?,
        min_amount: row.get(3)?,
        max_amount: row.get(4)?,
        category: row.get(5)?,
        tags: decode_tags(row.get(6)?),
        hit_count: row.get(7)?,
    })
}

/// All rules in ascending id order, which is also the order the matcher
/// evaluates them in.
pub fn list_rules(conn: &Connection) -> Result<Vec<TaggingRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, keyword, merchant, min_amount, max_amount, category, tags, hit_count \
         FROM tagging_rules ORDER BY id ASC",
    )?;
    let rules = stmt
        .query_map([], rule_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

/// Returns whether a rule was removed. Unknown ids are not an error.
pub fn delete_rule(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn.execute("DELETE FROM tagging_rules WHERE id = ?1", [id])?;
    if removed == 0 {
        tracing::debug!(rule_id = id, "delete of unknown rule ignored");
    } else {
        tracing::info!(rule_id = id, "deleted tagging rule");
    }
    Ok(removed > 0)
}

pub(crate) fn record_hit(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE tagging_rules SET hit_count = hit_count + 1 WHERE id = ?1",
        [id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::error::HqError;

    fn keyword_rule(keyword: &str, category: &str) -> NewRule {
        NewRule {
            keyword: Some(keyword.to_string()),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_list_in_id_order() {
        let (_dir, conn) = test_db();
        let a = create_rule(&conn, keyword_rule("AMZN", "Shopping")).unwrap();
        let b = create_rule(&conn, keyword_rule("UBER", "Travel")).unwrap();
        assert!(a < b);
        let rules = list_rules(&conn).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, a);
        assert_eq!(rules[0].keyword.as_deref(), Some("AMZN"));
        assert_eq!(rules[1].category.as_deref(), Some("Travel"));
        assert_eq!(rules[1].hit_count, 0);
    }

    #[test]
    fn test_tags_are_stored_and_trimmed() {
        let (_dir, conn) = test_db();
        create_rule(
            &conn,
            NewRule {
                merchant: Some("Amazon".into()),
                tags: vec![" online ".into(), "".into(), "retail".into()],
                ..Default::default()
            },
        )
        .unwrap();
        let rules = list_rules(&conn).unwrap();
        assert_eq!(rules[0].tags, vec!["online", "retail"]);
        assert_eq!(rules[0].category, None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, conn) = test_db();
        let id = create_rule(&conn, keyword_rule("AMZN", "Shopping")).unwrap();
        assert!(delete_rule(&conn, id).unwrap());
        assert!(!delete_rule(&conn, id).unwrap());
        assert!(!delete_rule(&conn, 9999).unwrap());
        assert!(list_rules(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (_dir, conn) = test_db();
        let first = create_rule(&conn, keyword_rule("A", "X")).unwrap();
        delete_rule(&conn, first).unwrap();
        let second = create_rule(&conn, keyword_rule("B", "Y")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let (_dir, conn) = test_db();
        let err = create_rule(
            &conn,
            NewRule {
                min_amount: Some(500.0),
                max_amount: Some(100.0),
                category: Some("Big".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HqError::Validation(ValidationError::InvalidBounds { .. })
        ));
        assert!(list_rules(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_equal_bounds_allowed() {
        let rule = validate(NewRule {
            min_amount: Some(100.0),
            max_amount: Some(100.0),
            category: Some("Exact".into()),
            ..Default::default()
        });
        assert!(rule.is_ok());
    }

    #[test]
    fn test_rejects_nan_bound() {
        let err = validate(NewRule {
            min_amount: Some(f64::NAN),
            category: Some("X".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteBound);
    }

    #[test]
    fn test_rejects_rule_without_match_fields() {
        let err = validate(NewRule {
            keyword: Some("   ".into()),
            category: Some("Everything".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyRule);
    }

    #[test]
    fn test_rejects_rule_without_assignment() {
        let err = validate(NewRule {
            keyword: Some("AMZN".into()),
            tags: vec!["".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::NoAssignment);
    }
}
