//! Records persisted by the ledger store.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Income/expense label carried by a transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    Income,
    Expense,
}

/// Income/expense label carried by a transaction.
///
/// Must match the classification of the transaction's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Income,
    Expense,
}

/// Error returned when parsing an income/expense label fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value '{0}': expected 'income' or 'expense'")]
pub struct ParseLabelError(pub String);

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Income => "income",
            Classification::Expense => "expense",
        }
    }
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Returns the category classification this type requires.
    pub fn classification(&self) -> Classification {
        match self {
            TransactionType::Income => Classification::Income,
            TransactionType::Expense => Classification::Expense,
        }
    }

    /// Returns true when a category with `classification` may hold this type.
    pub fn matches(&self, classification: Classification) -> bool {
        self.classification() == classification
    }
}

impl FromStr for Classification {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Classification::Income),
            "expense" => Ok(Classification::Expense),
            other => Err(ParseLabelError(other.to_string())),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseLabelError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rental property.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An income or expense category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: String,
    pub name: String,
    pub classification: Classification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub description: Option<String>,
    pub transaction_type: TransactionType,
    pub category_id: String,
    pub property_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Behaviour shared by every persisted record.
pub trait Record: Clone + Default + PartialEq + Send + Sync + 'static {
    /// Name of the collection (table) holding this record.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Fills in timestamps that were left at their default value.
    fn stamp_unset(&mut self, now: DateTime<Utc>);

    /// Returns true for the all-default record.
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

fn is_unset(ts: DateTime<Utc>) -> bool {
    ts == DateTime::<Utc>::default()
}

macro_rules! impl_record {
    ($ty:ty, $collection:literal) => {
        impl Record for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn stamp_unset(&mut self, now: DateTime<Utc>) {
                if is_unset(self.created_at) {
                    self.created_at = now;
                }
                if is_unset(self.updated_at) {
                    self.updated_at = now;
                }
            }
        }
    };
}

impl_record!(Property, "properties");
impl_record!(TransactionCategory, "transaction_categories");
impl_record!(Transaction, "transactions");
