//! Income and expense transactions.

mod commands;
mod service;

pub use commands::{CreateTransaction, UpdateTransaction};
pub use service::TransactionService;

use chrono::{DateTime, Utc};
use record_store::{Transaction, TransactionType};
use serde::{Deserialize, Serialize};

/// Transaction as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            transaction_date: tx.transaction_date,
            description: tx.description,
            transaction_type: tx.transaction_type,
            category_id: tx.category_id,
            property_id: tx.property_id,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}
