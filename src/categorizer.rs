use std::cmp::Reverse;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{TaggingRule, Taggable};
use crate::rules::{list_rules, record_hit};
use crate::transactions::{list_for_categorize, set_tagging};

/// How to pick a winner when more than one rule matches a transaction.
/// Rules are always scanned in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Lowest-id matching rule wins.
    #[default]
    FirstMatch,
    /// Highest-id matching rule wins (every match overwrites the previous one).
    LastMatch,
    /// The rule testing the most fields wins; ties go to the lowest id.
    MostSpecific,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first-match",
            Self::LastMatch => "last-match",
            Self::MostSpecific => "most-specific",
        }
    }
}

impl TaggingRule {
    /// True when every field the rule specifies agrees with the transaction.
    pub fn matches<T: Taggable + ?Sized>(&self, txn: &T) -> bool {
        if let Some(keyword) = &self.keyword {
            if !txn.description().contains(keyword.as_str()) {
                return false;
            }
        }
        if let Some(merchant) = &self.merchant {
            if txn.merchant_name() != Some(merchant.as_str()) {
                return false;
            }
        }
        let amount = txn.amount();
        if let Some(min) = self.min_amount {
            if amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if amount > max {
                return false;
            }
        }
        true
    }

    /// Number of match fields set. A min/max pair counts as two.
    pub fn specificity(&self) -> usize {
        [
            self.keyword.is_some(),
            self.merchant.is_some(),
            self.min_amount.is_some(),
            self.max_amount.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// `rules` must be sorted by ascending id (as returned by `list_rules`).
pub fn best_match<'r, T: Taggable + ?Sized>(
    rules: &'r [TaggingRule],
    txn: &T,
    policy: MatchPolicy,
) -> Option<&'r TaggingRule> {
    let mut matching = rules.iter().filter(|r| r.matches(txn));
    match policy {
        MatchPolicy::FirstMatch => matching.next(),
        MatchPolicy::LastMatch => matching.last(),
        // min_by_key keeps the first of equal elements, i.e. the lowest id.
        MatchPolicy::MostSpecific => matching.min_by_key(|r| Reverse(r.specificity())),
    }
}

/// Overwrite the transaction's category and tags with the winning rule's.
/// Returns the id of the rule applied.
pub fn apply_rules<T: Taggable + ?Sized>(
    rules: &[TaggingRule],
    txn: &mut T,
    policy: MatchPolicy,
) -> Option<i64> {
    let rule = best_match(rules, txn, policy)?;
    let tags = if rule.tags.is_empty() {
        None
    } else {
        Some(rule.tags.clone())
    };
    txn.set_tagging(rule.category.clone(), tags);
    tracing::debug!(rule_id = rule.id, description = txn.description(), "rule matched");
    Some(rule.id)
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub unmatched: usize,
}

/// Re-run the rules over stored transactions. With `include_categorized`
/// false only transactions with neither a category nor tags are considered.
pub fn categorize_transactions(
    conn: &Connection,
    policy: MatchPolicy,
    include_categorized: bool,
) -> Result<CategorizeResult> {
    let rules = list_rules(conn)?;
    let candidates = list_for_categorize(conn, include_categorized)?;

    let tx = conn.unchecked_transaction()?;
    let mut categorized = 0usize;
    let mut unmatched = 0usize;
    for mut txn in candidates {
        match apply_rules(&rules, &mut txn, policy) {
            Some(rule_id) => {
                set_tagging(&tx, txn.id, txn.category.as_deref(), txn.tags.as_deref())?;
                record_hit(&tx, rule_id)?;
                categorized += 1;
            }
            None => unmatched += 1,
        }
    }
    tx.commit()?;

    tracing::info!(categorized, unmatched, ?policy, "categorize finished");
    Ok(CategorizeResult {
        categorized,
        unmatched,
    })
}
