//! Transaction requests.

use chrono::{DateTime, Utc};
use common::Patch;
use record_store::TransactionType;
use serde::Deserialize;

/// Request to record a transaction.
///
/// Every field is optional at the wire level so that missing values are
/// reported together as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    #[serde(default)]
    pub amount: Option<f64>,

    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,

    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    pub property_id: Option<String>,
}

impl CreateTransaction {
    pub fn new(
        amount: f64,
        transaction_date: DateTime<Utc>,
        transaction_type: TransactionType,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            amount: Some(amount),
            transaction_date: Some(transaction_date),
            transaction_type: Some(transaction_type),
            category_id: Some(category_id.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }
}

/// Partial update of a transaction. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    #[serde(default)]
    pub amount: Patch<f64>,

    #[serde(default)]
    pub transaction_date: Patch<DateTime<Utc>>,

    /// `null` removes the description.
    #[serde(default)]
    pub description: Patch<String>,

    #[serde(default, rename = "type")]
    pub transaction_type: Patch<TransactionType>,

    #[serde(default)]
    pub category_id: Patch<String>,

    /// `null` detaches the transaction from its property.
    #[serde(default)]
    pub property_id: Patch<String>,
}

impl UpdateTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replacement: every field is set, and omitted fields are cleared.
    ///
    /// Clearing a required field fails validation, so a replacement must
    /// carry every required value.
    pub fn replacing(req: CreateTransaction) -> Self {
        Self {
            amount: req.amount.into(),
            transaction_date: req.transaction_date.into(),
            description: req.description.into(),
            transaction_type: req.transaction_type.into(),
            category_id: req.category_id.into(),
            property_id: req.property_id.into(),
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Patch::Set(amount);
        self
    }

    pub fn transaction_date(mut self, date: DateTime<Utc>) -> Self {
        self.transaction_date = Patch::Set(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Patch::Set(description.into());
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Patch::Set(transaction_type);
        self
    }

    pub fn category_id(mut self, id: impl Into<String>) -> Self {
        self.category_id = Patch::Set(id.into());
        self
    }

    pub fn property_id(mut self, id: impl Into<String>) -> Self {
        self.property_id = Patch::Set(id.into());
        self
    }

    pub fn clear_property(mut self) -> Self {
        self.property_id = Patch::Clear;
        self
    }
}
