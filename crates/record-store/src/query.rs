use chrono::{DateTime, Utc};

use crate::{Classification, Transaction, TransactionCategory, TransactionType};

/// Filter for listing transaction categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Only categories with this classification.
    pub classification: Option<Classification>,
}

impl CategoryFilter {
    /// Creates a filter matching every category.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by classification.
    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Returns true when `category` passes the filter.
    pub fn matches(&self, category: &TransactionCategory) -> bool {
        self.classification
            .is_none_or(|classification| category.classification == classification)
    }
}

/// Builder for transaction list filters.
///
/// Every criterion is optional; set criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Filter by property.
    pub property_id: Option<String>,

    /// Filter by income/expense type.
    pub transaction_type: Option<TransactionType>,

    /// Filter by category.
    pub category_id: Option<String>,

    /// Transactions dated at or after this instant.
    pub start_date: Option<DateTime<Utc>>,

    /// Transactions dated at or before this instant.
    pub end_date: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Creates a filter matching every transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by property.
    pub fn property_id(mut self, id: impl Into<String>) -> Self {
        self.property_id = Some(id.into());
        self
    }

    /// Filters by type.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    /// Filters by category.
    pub fn category_id(mut self, id: impl Into<String>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    /// Filters to transactions dated on or after `start`.
    pub fn start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Filters to transactions dated on or before `end`.
    pub fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Returns true when `tx` passes every set criterion.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(ref property_id) = self.property_id
            && tx.property_id.as_deref() != Some(property_id.as_str())
        {
            return false;
        }
        if let Some(transaction_type) = self.transaction_type
            && tx.transaction_type != transaction_type
        {
            return false;
        }
        if let Some(ref category_id) = self.category_id
            && &tx.category_id != category_id
        {
            return false;
        }
        if let Some(start) = self.start_date
            && tx.transaction_date < start
        {
            return false;
        }
        if let Some(end) = self.end_date
            && tx.transaction_date > end
        {
            return false;
        }
        true
    }
}

/// One page of records plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn tx_on(day: u32) -> Transaction {
        Transaction {
            id: format!("tx-{day}"),
            amount: 10.0,
            transaction_date: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            transaction_type: TransactionType::Expense,
            category_id: "cat-1".to_string(),
            property_id: Some("prop-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(TransactionFilter::new().matches(&tx_on(1)));
    }

    #[test]
    fn date_range_is_inclusive() {
        let filter = TransactionFilter::new()
            .start_date(Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap())
            .end_date(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());

        assert!(!filter.matches(&tx_on(4)));
        assert!(filter.matches(&tx_on(5)));
        assert!(filter.matches(&tx_on(10)));
        assert!(!filter.matches(&tx_on(11)));
    }

    #[test]
    fn criteria_combine_with_and() {
        let filter = TransactionFilter::new()
            .property_id("prop-1")
            .transaction_type(TransactionType::Income);
        assert!(!filter.matches(&tx_on(1)));

        let filter = TransactionFilter::new()
            .property_id("prop-1")
            .category_id("cat-1")
            .transaction_type(TransactionType::Expense);
        assert!(filter.matches(&tx_on(1)));
    }

    #[test]
    fn property_filter_skips_unassigned_transactions() {
        let mut tx = tx_on(1);
        tx.property_id = None;
        assert!(!TransactionFilter::new().property_id("prop-1").matches(&tx));
    }

    #[test]
    fn category_filter_by_classification() {
        let category = TransactionCategory {
            classification: Classification::Expense,
            ..Default::default()
        };
        assert!(CategoryFilter::new().matches(&category));
        assert!(
            CategoryFilter::new()
                .classification(Classification::Expense)
                .matches(&category)
        );
        assert!(
            !CategoryFilter::new()
                .classification(Classification::Income)
                .matches(&category)
        );
    }
}
