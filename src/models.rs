use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded CSV row, validated but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub date: String,
    pub description: String,
    pub merchant_name: Option<String>,
    pub amount: f64,
    pub txn_type: TransactionType,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub merchant_name: Option<String>,
    pub amount: f64,
    pub txn_type: TransactionType,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggingRule {
    pub id: i64,
    pub keyword: Option<String>,
    pub merchant: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub hit_count: i64,
}

/// Rule fields as entered by the user, before validation and storage.
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub keyword: Option<String>,
    pub merchant: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Read access to the fields a tagging rule can test. Implemented by both
/// stored transactions and fresh import candidates.
pub trait Taggable {
    fn description(&self) -> &str;
    fn merchant_name(&self) -> Option<&str>;
    fn amount(&self) -> f64;
    fn set_tagging(&mut self, category: Option<String>, tags: Option<Vec<String>>);
}

impl Taggable for TransactionCandidate {
    fn description(&self) -> &str {
        &self.description
    }
    fn merchant_name(&self) -> Option<&str> {
        self.merchant_name.as_deref()
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn set_tagging(&mut self, category: Option<String>, tags: Option<Vec<String>>) {
        self.category = category;
        self.tags = tags;
    }
}

impl Taggable for Transaction {
    fn description(&self) -> &str {
        &self.description
    }
    fn merchant_name(&self) -> Option<&str> {
        self.merchant_name.as_deref()
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn set_tagging(&mut self, category: Option<String>, tags: Option<Vec<String>>) {
        self.category = category;
        self.tags = tags;
    }
}
