use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    CategoryFilter, Classification, Listing, Property, Record, Result, StoreError, Transaction,
    TransactionCategory, TransactionFilter,
    store::{
        CategoryStore, PropertyStore, TransactionStore, validate_for_write, validate_id,
        validate_limit,
    },
};

/// One keyed collection of records.
struct Collection<T> {
    records: RwLock<HashMap<String, T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Record> Collection<T> {
    async fn insert(&self, mut record: T) -> Result<String> {
        validate_for_write(&record)?;
        record.stamp_unset(Utc::now());

        let mut records = self.records.write().await;
        let id = record.id().to_string();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists {
                collection: T::COLLECTION,
                id,
            });
        }
        records.insert(id.clone(), record);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<T> {
        validate_id::<T>(id)?;
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            })
    }

    async fn replace(&self, record: T) -> Result<()> {
        validate_for_write(&record)?;
        let mut records = self.records.write().await;
        match records.get_mut(record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                collection: T::COLLECTION,
                id: record.id().to_string(),
            }),
        }
    }

    async fn remove(&self, id: &str) -> Result<()> {
        validate_id::<T>(id)?;
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn page<F, O>(&self, keep: F, order: O, limit: usize, offset: usize) -> Result<Listing<T>>
    where
        F: Fn(&T) -> bool,
        O: Fn(&T, &T) -> Ordering,
    {
        validate_limit(limit)?;

        let records = self.records.read().await;
        let mut matching: Vec<T> = records.values().filter(|r| keep(r)).cloned().collect();
        let total = matching.len() as u64;

        matching.sort_by(|a, b| order(a, b));
        let items = matching.into_iter().skip(offset).take(limit).collect();

        Ok(Listing { items, total })
    }

    async fn find<F>(&self, keep: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let records = self.records.read().await;
        let mut found: Vec<&T> = records.values().filter(|r| keep(r)).collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        found.first().map(|r| (*r).clone())
    }

    async fn count<F>(&self, keep: F) -> u64
    where
        F: Fn(&T) -> bool,
    {
        self.records.read().await.values().filter(|r| keep(r)).count() as u64
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    async fn clear(&self) {
        self.records.write().await.clear();
    }
}

fn by_name_then_id(a_name: &str, a_id: &str, b_name: &str, b_id: &str) -> Ordering {
    a_name.cmp(b_name).then_with(|| a_id.cmp(b_id))
}

fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.transaction_date
        .cmp(&a.transaction_date)
        .then_with(|| b.created_at().cmp(&a.created_at()))
        .then_with(|| a.id.cmp(&b.id))
}

/// In-memory record store for tests and local runs.
///
/// This implementation keeps every collection in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    properties: Arc<Collection<Property>>,
    categories: Arc<Collection<TransactionCategory>>,
    transactions: Arc<Collection<Transaction>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many successful creates, updates and deletes were applied.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    /// Returns the number of stored transactions.
    pub async fn transaction_count(&self) -> usize {
        self.transactions.len().await
    }

    /// Clears every collection.
    pub async fn clear(&self) {
        self.properties.clear().await;
        self.categories.clear().await;
        self.transactions.clear().await;
    }

    fn record_write<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_ok() {
            self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        }
        result
    }
}

#[async_trait]
impl PropertyStore for InMemoryStore {
    async fn create_property(&self, property: Property) -> Result<String> {
        self.record_write(self.properties.insert(property).await)
    }

    async fn get_property(&self, id: &str) -> Result<Property> {
        self.properties.get(id).await
    }

    async fn list_properties(&self, limit: usize, offset: usize) -> Result<Listing<Property>> {
        self.properties
            .page(
                |_| true,
                |a, b| by_name_then_id(&a.name, &a.id, &b.name, &b.id),
                limit,
                offset,
            )
            .await
    }

    async fn update_property(&self, property: Property) -> Result<()> {
        self.record_write(self.properties.replace(property).await)
    }

    async fn delete_property(&self, id: &str) -> Result<()> {
        self.record_write(self.properties.remove(id).await)
    }

    async fn find_property_by_name(&self, name: &str) -> Result<Option<Property>> {
        Ok(self.properties.find(|p| p.name == name).await)
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn create_category(&self, category: TransactionCategory) -> Result<String> {
        self.record_write(self.categories.insert(category).await)
    }

    async fn get_category(&self, id: &str) -> Result<TransactionCategory> {
        self.categories.get(id).await
    }

    async fn list_categories(
        &self,
        filter: &CategoryFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<TransactionCategory>> {
        self.categories
            .page(
                |c| filter.matches(c),
                |a, b| by_name_then_id(&a.name, &a.id, &b.name, &b.id),
                limit,
                offset,
            )
            .await
    }

    async fn update_category(&self, category: TransactionCategory) -> Result<()> {
        self.record_write(self.categories.replace(category).await)
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        self.record_write(self.categories.remove(id).await)
    }

    async fn find_category_by_name_and_classification(
        &self,
        name: &str,
        classification: Classification,
    ) -> Result<Option<TransactionCategory>> {
        Ok(self
            .categories
            .find(|c| c.name == name && c.classification == classification)
            .await)
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn create_transaction(&self, transaction: Transaction) -> Result<String> {
        self.record_write(self.transactions.insert(transaction).await)
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.transactions.get(id).await
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<Transaction>> {
        self.transactions
            .page(|t| filter.matches(t), newest_first, limit, offset)
            .await
    }

    async fn update_transaction(&self, transaction: Transaction) -> Result<()> {
        self.record_write(self.transactions.replace(transaction).await)
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.record_write(self.transactions.remove(id).await)
    }

    async fn count_transactions_by_category(&self, category_id: &str) -> Result<u64> {
        Ok(self
            .transactions
            .count(|t| t.category_id == category_id)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};

    use super::*;
    use crate::TransactionType;

    fn property(id: &str, name: &str) -> Property {
        Property {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn transaction(id: &str, date: DateTime<Utc>, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: 100.0,
            transaction_date: date,
            transaction_type: TransactionType::Expense,
            category_id: "cat-1".to_string(),
            created_at,
            updated_at: created_at,
            ..Default::default()
        }
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_unset_timestamps() {
        let store = InMemoryStore::new();

        let id = store.create_property(property("p1", "Flat")).await.unwrap();
        assert_eq!(id, "p1");

        let stored = store.get_property("p1").await.unwrap();
        assert_ne!(stored.created_at, DateTime::<Utc>::default());
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_zero_record() {
        let store = InMemoryStore::new();
        let result = store.create_property(Property::default()).await;
        assert!(matches!(result, Err(StoreError::NilEntity { .. })));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = InMemoryStore::new();
        store.create_property(property("p1", "Flat")).await.unwrap();
        let result = store.create_property(property("p1", "House")).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn get_missing_and_blank_ids() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_category("missing").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.get_category("").await,
            Err(StoreError::EmptyId { .. })
        ));
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update_property(property("ghost", "Gone")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();
        store.create_property(property("p1", "Flat")).await.unwrap();

        store.delete_property("p1").await.unwrap();
        store.delete_property("p1").await.unwrap();
        assert!(store.get_property("p1").await.unwrap_err().is_not_found());

        assert!(matches!(
            store.delete_property("").await,
            Err(StoreError::EmptyId { .. })
        ));
    }

    #[tokio::test]
    async fn properties_listed_by_name_with_total() {
        let store = InMemoryStore::new();
        for (id, name) in [("p3", "Cottage"), ("p1", "Apartment"), ("p2", "Bungalow")] {
            store.create_property(property(id, name)).await.unwrap();
        }

        let page = store.list_properties(2, 0).await.unwrap();
        assert_eq!(page.total, 3);
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apartment", "Bungalow"]);

        let page = store.list_properties(2, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Cottage");
    }

    #[tokio::test]
    async fn list_rejects_invalid_limit() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.list_properties(0, 0).await,
            Err(StoreError::InvalidLimit { limit: 0 })
        ));
        assert!(matches!(
            store
                .list_transactions(&TransactionFilter::new(), 101, 0)
                .await,
            Err(StoreError::InvalidLimit { limit: 101 })
        ));
    }

    #[tokio::test]
    async fn transactions_newest_first_with_created_at_tiebreak() {
        let store = InMemoryStore::new();
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        store
            .create_transaction(transaction("old", jan(1), base))
            .await
            .unwrap();
        store
            .create_transaction(transaction("tie-early", jan(5), base))
            .await
            .unwrap();
        store
            .create_transaction(transaction(
                "tie-late",
                jan(5),
                base + chrono::Duration::seconds(1),
            ))
            .await
            .unwrap();

        let page = store
            .list_transactions(&TransactionFilter::new(), 10, 0)
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["tie-late", "tie-early", "old"]);
    }

    #[tokio::test]
    async fn total_counts_filtered_set_not_page() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for day in 1..=5 {
            let mut tx = transaction(&format!("t{day}"), jan(day), now);
            if day % 2 == 0 {
                tx.transaction_type = TransactionType::Income;
            }
            store.create_transaction(tx).await.unwrap();
        }

        let filter = TransactionFilter::new().transaction_type(TransactionType::Expense);
        let page = store.list_transactions(&filter, 1, 1).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "t3");
    }

    #[tokio::test]
    async fn find_category_by_name_and_classification() {
        let store = InMemoryStore::new();
        store
            .create_category(TransactionCategory {
                id: "c1".to_string(),
                name: "Rent".to_string(),
                classification: Classification::Income,
                ..Default::default()
            })
            .await
            .unwrap();

        let found = store
            .find_category_by_name_and_classification("Rent", Classification::Income)
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some("c1".to_string()));

        let missing = store
            .find_category_by_name_and_classification("Rent", Classification::Expense)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn counts_transactions_by_category() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .create_transaction(transaction("t1", jan(1), now))
            .await
            .unwrap();
        store
            .create_transaction(transaction("t2", jan(2), now))
            .await
            .unwrap();

        assert_eq!(store.count_transactions_by_category("cat-1").await.unwrap(), 2);
        assert_eq!(store.count_transactions_by_category("cat-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn write_count_tracks_successful_writes() {
        let store = InMemoryStore::new();
        store.create_property(property("p1", "Flat")).await.unwrap();
        store.update_property(property("p1", "Flat 2")).await.unwrap();
        let _ = store.update_property(property("p9", "Nope")).await;
        store.delete_property("p1").await.unwrap();

        assert_eq!(store.write_count(), 3);
    }
}
