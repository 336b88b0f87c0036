use async_trait::async_trait;

use crate::{
    CategoryFilter, Classification, Listing, Property, Record, Result, StoreError, Transaction,
    TransactionCategory, TransactionFilter,
};

/// Largest page a list call may request.
pub const MAX_LIST_LIMIT: usize = 100;

/// Storage port for properties.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Persists a new property and returns its id.
    ///
    /// Fills in `created_at`/`updated_at` when they are unset.
    async fn create_property(&self, property: Property) -> Result<String>;

    /// Fetches a property, failing with `NotFound` if it does not exist.
    async fn get_property(&self, id: &str) -> Result<Property>;

    /// Returns a page of properties ordered by name, plus the total count.
    async fn list_properties(&self, limit: usize, offset: usize) -> Result<Listing<Property>>;

    /// Overwrites a stored property (last writer wins).
    async fn update_property(&self, property: Property) -> Result<()>;

    /// Removes a property. Removing a missing id is not an error.
    async fn delete_property(&self, id: &str) -> Result<()>;

    /// Looks up a property by exact name.
    async fn find_property_by_name(&self, name: &str) -> Result<Option<Property>>;
}

/// Storage port for transaction categories.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Persists a new category and returns its id.
    async fn create_category(&self, category: TransactionCategory) -> Result<String>;

    /// Fetches a category, failing with `NotFound` if it does not exist.
    async fn get_category(&self, id: &str) -> Result<TransactionCategory>;

    /// Returns a page of categories ordered by name, plus the filtered total.
    async fn list_categories(
        &self,
        filter: &CategoryFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<TransactionCategory>>;

    /// Overwrites a stored category (last writer wins).
    async fn update_category(&self, category: TransactionCategory) -> Result<()>;

    /// Removes a category. Removing a missing id is not an error.
    async fn delete_category(&self, id: &str) -> Result<()>;

    /// Looks up the category with this exact name and classification.
    async fn find_category_by_name_and_classification(
        &self,
        name: &str,
        classification: Classification,
    ) -> Result<Option<TransactionCategory>>;
}

/// Storage port for transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new transaction and returns its id.
    async fn create_transaction(&self, transaction: Transaction) -> Result<String>;

    /// Fetches a transaction, failing with `NotFound` if it does not exist.
    async fn get_transaction(&self, id: &str) -> Result<Transaction>;

    /// Returns a page of matching transactions, newest first, plus the
    /// filtered total.
    ///
    /// Ordered by `transaction_date` descending, ties broken by
    /// `created_at` descending.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<Transaction>>;

    /// Overwrites a stored transaction (last writer wins).
    async fn update_transaction(&self, transaction: Transaction) -> Result<()>;

    /// Removes a transaction. Removing a missing id is not an error.
    async fn delete_transaction(&self, id: &str) -> Result<()>;

    /// Counts transactions referencing a category.
    async fn count_transactions_by_category(&self, category_id: &str) -> Result<u64>;
}

/// A backend providing every storage port.
pub trait LedgerStore: PropertyStore + CategoryStore + TransactionStore {}

// Blanket implementation for anything implementing all three ports
impl<T: PropertyStore + CategoryStore + TransactionStore + ?Sized> LedgerStore for T {}

/// Validates the limit passed to a list call.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(StoreError::InvalidLimit { limit });
    }
    Ok(())
}

/// Validates an id passed to a read or delete.
pub fn validate_id<R: Record>(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(StoreError::EmptyId {
            collection: R::COLLECTION,
        });
    }
    Ok(())
}

/// Validates a record before it is written.
pub fn validate_for_write<R: Record>(record: &R) -> Result<()> {
    if record.is_zero() {
        return Err(StoreError::NilEntity {
            collection: R::COLLECTION,
        });
    }
    validate_id::<R>(record.id())
}
