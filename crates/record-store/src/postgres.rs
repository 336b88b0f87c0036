use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    PgPool, Postgres, QueryBuilder, Row,
    postgres::{PgPoolOptions, PgRow},
};

use crate::{
    CategoryFilter, Classification, Listing, Property, Record, Result, StoreError, Transaction,
    TransactionCategory, TransactionFilter,
    store::{
        CategoryStore, PropertyStore, TransactionStore, validate_for_write, validate_id,
        validate_limit,
    },
    timeout::{DEFAULT_TIMEOUT, with_timeout},
};

const PROPERTY_COLUMNS: &str = "id, name, address, created_at, updated_at";
const CATEGORY_COLUMNS: &str = "id, name, classification, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, amount, transaction_date, description, transaction_type, category_id, property_id, created_at, updated_at";

/// PostgreSQL-backed record store implementation.
///
/// Each collection lives in its own table. Every call is bounded by the
/// configured timeout.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store with the default timeout.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Opens a connection pool to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(DEFAULT_TIMEOUT)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Sets the bound applied to each store call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        with_timeout(self.timeout, operation, fut).await
    }

    fn not_found<R: Record>(id: &str) -> StoreError {
        StoreError::NotFound {
            collection: R::COLLECTION,
            id: id.to_string(),
        }
    }

    fn map_insert_error<R: Record>(id: &str, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return StoreError::AlreadyExists {
                collection: R::COLLECTION,
                id: id.to_string(),
            };
        }
        StoreError::Database(err)
    }

    fn corrupt<R: Record, E: std::fmt::Display>(err: E) -> StoreError {
        StoreError::Corrupt {
            collection: R::COLLECTION,
            message: err.to_string(),
        }
    }

    fn row_to_property(row: PgRow) -> Result<Property> {
        Ok(Property {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_category(row: PgRow) -> Result<TransactionCategory> {
        let classification: String = row.try_get("classification")?;
        Ok(TransactionCategory {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            classification: classification
                .parse()
                .map_err(Self::corrupt::<TransactionCategory, _>)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_transaction(row: PgRow) -> Result<Transaction> {
        let transaction_type: String = row.try_get("transaction_type")?;
        Ok(Transaction {
            id: row.try_get("id")?,
            amount: row.try_get("amount")?,
            transaction_date: row.try_get("transaction_date")?,
            description: row.try_get("description")?,
            transaction_type: transaction_type
                .parse()
                .map_err(Self::corrupt::<Transaction, _>)?,
            category_id: row.try_get("category_id")?,
            property_id: row.try_get("property_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn delete_row<R: Record>(&self, operation: &'static str, id: &str) -> Result<()> {
        validate_id::<R>(id)?;
        self.bounded(operation, async {
            sqlx::query(&format!("DELETE FROM {} WHERE id = $1", R::COLLECTION))
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }
}

fn push_category_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CategoryFilter) {
    if let Some(classification) = filter.classification {
        builder
            .push(" WHERE classification = ")
            .push_bind(classification.as_str());
    }
}

fn push_transaction_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    let mut separator = " WHERE ";

    if let Some(ref property_id) = filter.property_id {
        builder
            .push(separator)
            .push("property_id = ")
            .push_bind(property_id.clone());
        separator = " AND ";
    }
    if let Some(transaction_type) = filter.transaction_type {
        builder
            .push(separator)
            .push("transaction_type = ")
            .push_bind(transaction_type.as_str());
        separator = " AND ";
    }
    if let Some(ref category_id) = filter.category_id {
        builder
            .push(separator)
            .push("category_id = ")
            .push_bind(category_id.clone());
        separator = " AND ";
    }
    if let Some(start) = filter.start_date {
        builder
            .push(separator)
            .push("transaction_date >= ")
            .push_bind(start);
        separator = " AND ";
    }
    if let Some(end) = filter.end_date {
        builder
            .push(separator)
            .push("transaction_date <= ")
            .push_bind(end);
    }
}

#[async_trait]
impl PropertyStore for PostgresStore {
    async fn create_property(&self, mut property: Property) -> Result<String> {
        validate_for_write(&property)?;
        property.stamp_unset(Utc::now());

        self.bounded("create_property", async {
            sqlx::query(
                r#"
                INSERT INTO properties (id, name, address, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&property.id)
            .bind(&property.name)
            .bind(&property.address)
            .bind(property.created_at)
            .bind(property.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_insert_error::<Property>(&property.id, e))?;

            Ok(property.id.clone())
        })
        .await
    }

    async fn get_property(&self, id: &str) -> Result<Property> {
        validate_id::<Property>(id)?;
        self.bounded("get_property", async {
            let row = sqlx::query(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => Self::row_to_property(row),
                None => Err(Self::not_found::<Property>(id)),
            }
        })
        .await
    }

    async fn list_properties(&self, limit: usize, offset: usize) -> Result<Listing<Property>> {
        validate_limit(limit)?;
        self.bounded("list_properties", async {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM properties")
                .fetch_one(&self.pool)
                .await?;

            let rows = sqlx::query(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
            ))
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

            Ok(Listing {
                items: rows
                    .into_iter()
                    .map(Self::row_to_property)
                    .collect::<Result<_>>()?,
                total: total as u64,
            })
        })
        .await
    }

    async fn update_property(&self, property: Property) -> Result<()> {
        validate_for_write(&property)?;
        self.bounded("update_property", async {
            let result = sqlx::query(
                r#"
                UPDATE properties
                SET name = $2, address = $3, created_at = $4, updated_at = $5
                WHERE id = $1
                "#,
            )
            .bind(&property.id)
            .bind(&property.name)
            .bind(&property.address)
            .bind(property.created_at)
            .bind(property.updated_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(Self::not_found::<Property>(&property.id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_property(&self, id: &str) -> Result<()> {
        self.delete_row::<Property>("delete_property", id).await
    }

    async fn find_property_by_name(&self, name: &str) -> Result<Option<Property>> {
        self.bounded("find_property_by_name", async {
            let row = sqlx::query(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties WHERE name = $1 ORDER BY id LIMIT 1"
            ))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

            row.map(Self::row_to_property).transpose()
        })
        .await
    }
}

#[async_trait]
impl CategoryStore for PostgresStore {
    async fn create_category(&self, mut category: TransactionCategory) -> Result<String> {
        validate_for_write(&category)?;
        category.stamp_unset(Utc::now());

        self.bounded("create_category", async {
            sqlx::query(
                r#"
                INSERT INTO transaction_categories (id, name, classification, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.classification.as_str())
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_insert_error::<TransactionCategory>(&category.id, e))?;

            Ok(category.id.clone())
        })
        .await
    }

    async fn get_category(&self, id: &str) -> Result<TransactionCategory> {
        validate_id::<TransactionCategory>(id)?;
        self.bounded("get_category", async {
            let row = sqlx::query(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM transaction_categories WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => Self::row_to_category(row),
                None => Err(Self::not_found::<TransactionCategory>(id)),
            }
        })
        .await
    }

    async fn list_categories(
        &self,
        filter: &CategoryFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<TransactionCategory>> {
        validate_limit(limit)?;
        self.bounded("list_categories", async {
            let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transaction_categories");
            push_category_filter(&mut count, filter);
            let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

            let mut query = QueryBuilder::<Postgres>::new(format!(
                "SELECT {CATEGORY_COLUMNS} FROM transaction_categories"
            ));
            push_category_filter(&mut query, filter);
            query
                .push(" ORDER BY name ASC, id ASC LIMIT ")
                .push_bind(limit as i64)
                .push(" OFFSET ")
                .push_bind(offset as i64);
            let rows = query.build().fetch_all(&self.pool).await?;

            Ok(Listing {
                items: rows
                    .into_iter()
                    .map(Self::row_to_category)
                    .collect::<Result<_>>()?,
                total: total as u64,
            })
        })
        .await
    }

    async fn update_category(&self, category: TransactionCategory) -> Result<()> {
        validate_for_write(&category)?;
        self.bounded("update_category", async {
            let result = sqlx::query(
                r#"
                UPDATE transaction_categories
                SET name = $2, classification = $3, created_at = $4, updated_at = $5
                WHERE id = $1
                "#,
            )
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.classification.as_str())
            .bind(category.created_at)
            .bind(category.updated_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(Self::not_found::<TransactionCategory>(&category.id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        self.delete_row::<TransactionCategory>("delete_category", id)
            .await
    }

    async fn find_category_by_name_and_classification(
        &self,
        name: &str,
        classification: Classification,
    ) -> Result<Option<TransactionCategory>> {
        self.bounded("find_category_by_name_and_classification", async {
            let row = sqlx::query(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM transaction_categories \
                 WHERE name = $1 AND classification = $2 ORDER BY id LIMIT 1"
            ))
            .bind(name)
            .bind(classification.as_str())
            .fetch_optional(&self.pool)
            .await?;

            row.map(Self::row_to_category).transpose()
        })
        .await
    }
}

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn create_transaction(&self, mut transaction: Transaction) -> Result<String> {
        validate_for_write(&transaction)?;
        transaction.stamp_unset(Utc::now());

        self.bounded("create_transaction", async {
            sqlx::query(
                r#"
                INSERT INTO transactions (id, amount, transaction_date, description, transaction_type, category_id, property_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&transaction.id)
            .bind(transaction.amount)
            .bind(transaction.transaction_date)
            .bind(&transaction.description)
            .bind(transaction.transaction_type.as_str())
            .bind(&transaction.category_id)
            .bind(&transaction.property_id)
            .bind(transaction.created_at)
            .bind(transaction.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_insert_error::<Transaction>(&transaction.id, e))?;

            Ok(transaction.id.clone())
        })
        .await
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction> {
        validate_id::<Transaction>(id)?;
        self.bounded("get_transaction", async {
            let row = sqlx::query(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => Self::row_to_transaction(row),
                None => Err(Self::not_found::<Transaction>(id)),
            }
        })
        .await
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Listing<Transaction>> {
        validate_limit(limit)?;
        self.bounded("list_transactions", async {
            let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
            push_transaction_filter(&mut count, filter);
            let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

            let mut query = QueryBuilder::<Postgres>::new(format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions"
            ));
            push_transaction_filter(&mut query, filter);
            query
                .push(" ORDER BY transaction_date DESC, created_at DESC, id ASC LIMIT ")
                .push_bind(limit as i64)
                .push(" OFFSET ")
                .push_bind(offset as i64);
            let rows = query.build().fetch_all(&self.pool).await?;

            Ok(Listing {
                items: rows
                    .into_iter()
                    .map(Self::row_to_transaction)
                    .collect::<Result<_>>()?,
                total: total as u64,
            })
        })
        .await
    }

    async fn update_transaction(&self, transaction: Transaction) -> Result<()> {
        validate_for_write(&transaction)?;
        self.bounded("update_transaction", async {
            let result = sqlx::query(
                r#"
                UPDATE transactions
                SET amount = $2, transaction_date = $3, description = $4, transaction_type = $5,
                    category_id = $6, property_id = $7, created_at = $8, updated_at = $9
                WHERE id = $1
                "#,
            )
            .bind(&transaction.id)
            .bind(transaction.amount)
            .bind(transaction.transaction_date)
            .bind(&transaction.description)
            .bind(transaction.transaction_type.as_str())
            .bind(&transaction.category_id)
            .bind(&transaction.property_id)
            .bind(transaction.created_at)
            .bind(transaction.updated_at)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(Self::not_found::<Transaction>(&transaction.id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.delete_row::<Transaction>("delete_transaction", id).await
    }

    async fn count_transactions_by_category(&self, category_id: &str) -> Result<u64> {
        self.bounded("count_transactions_by_category", async {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE category_id = $1")
                    .bind(category_id)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        })
        .await
    }
}
