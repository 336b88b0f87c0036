//! Transaction categories and the rules that keep them unique.

mod commands;
mod service;

pub use commands::{CreateCategory, UpdateCategory};
pub use service::{CategoryDeletePolicy, CategoryService, ParsePolicyError};

use chrono::{DateTime, Utc};
use record_store::{Classification, TransactionCategory};
use serde::{Deserialize, Serialize};

/// Category as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub classification: Classification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransactionCategory> for CategoryResponse {
    fn from(category: TransactionCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
            classification: category.classification,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
