//! Transaction service.

use chrono::{DateTime, Utc};
use common::{EntityId, PageRequest, Paginated, Patch};
use record_store::{LedgerStore, Record, Transaction, TransactionFilter, TransactionType};

use crate::error::{AppError, FieldErrors, parse_id};
use crate::validation::{self, DESCRIPTION_MAX};

use super::{CreateTransaction, TransactionResponse, UpdateTransaction};

const ENTITY: &str = "Transaction";

/// A create request that passed field validation.
struct NewTransaction {
    amount: f64,
    transaction_date: DateTime<Utc>,
    description: Option<String>,
    transaction_type: TransactionType,
    category_id: String,
    property_id: Option<String>,
}

/// Service for recording transactions.
///
/// Reads categories to keep a transaction's type in line with its
/// category's classification, and properties to check references.
pub struct TransactionService<S> {
    store: S,
}

impl<S: LedgerStore> TransactionService<S> {
    /// Creates a transaction service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a new transaction.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, req: CreateTransaction) -> Result<TransactionResponse, AppError> {
        let new = validate_create(req)?;

        self.check_category(&new.category_id, new.transaction_type)
            .await?;
        if let Some(property_id) = &new.property_id {
            self.check_property(property_id).await?;
        }

        let now = crate::now();
        let transaction = Transaction {
            id: EntityId::new().to_string(),
            amount: new.amount,
            transaction_date: new.transaction_date,
            description: new.description,
            transaction_type: new.transaction_type,
            category_id: new.category_id,
            property_id: new.property_id,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_transaction(transaction.clone())
            .await
            .map_err(|e| AppError::internal("creating transaction", e))?;

        metrics::counter!("ledger_records_created_total", "collection" => Transaction::COLLECTION)
            .increment(1);
        tracing::info!(transaction_id = %transaction.id, "transaction created");

        Ok(transaction.into())
    }

    /// Fetches a transaction by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<TransactionResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        Ok(self.load(&id).await?.into())
    }

    /// Returns one page of matching transactions, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        mut filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<Paginated<TransactionResponse>, AppError> {
        filter.property_id = filter
            .property_id
            .as_deref()
            .map(|id| parse_filter_id("propertyId", id))
            .transpose()?;
        filter.category_id = filter
            .category_id
            .as_deref()
            .map(|id| parse_filter_id("categoryId", id))
            .transpose()?;
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
            && start > end
        {
            return Err(AppError::BadRequest(
                "'startDate' must not be after 'endDate'.".to_string(),
            ));
        }

        let listing = self
            .store
            .list_transactions(&filter, page.limit(), page.offset())
            .await
            .map_err(|e| AppError::internal("listing transactions", e))?;

        let page = Paginated {
            data: listing.items,
            pagination: page.info(listing.total),
        };
        Ok(page.map(Into::into))
    }

    /// Applies a partial update.
    ///
    /// The category/type pairing is re-checked only when one of them
    /// changes, and the property reference only when it changes.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: &str,
        req: UpdateTransaction,
    ) -> Result<TransactionResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        let mut tx = self.load(&id).await?;

        let mut errors = FieldErrors::new();
        let amount = required(&mut errors, "amount", req.amount);
        if let Some(amount) = amount {
            validation::positive_amount(&mut errors, "amount", amount);
        }
        let transaction_date = required(&mut errors, "transactionDate", req.transaction_date);
        let transaction_type = required(&mut errors, "type", req.transaction_type);
        let category_id = required(&mut errors, "categoryId", req.category_id)
            .map(|id| validation::reference_id(&mut errors, "categoryId", &id));
        let description = match req.description {
            Patch::Unset => None,
            Patch::Clear => Some(None),
            Patch::Set(description) => {
                validation::max_chars(&mut errors, "description", &description, DESCRIPTION_MAX);
                Some(Some(description))
            }
        };
        let property_id = match req.property_id {
            Patch::Unset => None,
            Patch::Clear => Some(None),
            Patch::Set(pid) if pid.trim().is_empty() => Some(None),
            Patch::Set(pid) => Some(Some(validation::reference_id(
                &mut errors,
                "propertyId",
                &pid,
            ))),
        };
        errors.into_result()?;

        let mut changed = false;
        let mut classification_relevant = false;
        let mut property_changed = false;

        if let Some(amount) = amount
            && amount != tx.amount
        {
            tx.amount = amount;
            changed = true;
        }
        if let Some(date) = transaction_date
            && date != tx.transaction_date
        {
            tx.transaction_date = date;
            changed = true;
        }
        if let Some(description) = description
            && description != tx.description
        {
            tx.description = description;
            changed = true;
        }
        if let Some(transaction_type) = transaction_type
            && transaction_type != tx.transaction_type
        {
            tx.transaction_type = transaction_type;
            changed = true;
            classification_relevant = true;
        }
        if let Some(category_id) = category_id
            && category_id != tx.category_id
        {
            tx.category_id = category_id;
            changed = true;
            classification_relevant = true;
        }
        if let Some(property_id) = property_id
            && property_id != tx.property_id
        {
            tx.property_id = property_id;
            changed = true;
            property_changed = true;
        }

        if !changed {
            tracing::debug!(transaction_id = %id, "update changed nothing");
            return Ok(tx.into());
        }

        if classification_relevant {
            self.check_category(&tx.category_id, tx.transaction_type)
                .await?;
        }
        if property_changed && let Some(property_id) = &tx.property_id {
            self.check_property(property_id).await?;
        }

        tx.updated_at = crate::now();
        self.store
            .update_transaction(tx.clone())
            .await
            .map_err(|e| AppError::from_store(ENTITY, &id, e))?;

        metrics::counter!("ledger_records_updated_total", "collection" => Transaction::COLLECTION)
            .increment(1);
        tracing::info!(transaction_id = %id, "transaction updated");

        Ok(tx.into())
    }

    /// Replaces every field of a transaction.
    pub async fn replace(
        &self,
        id: &str,
        req: CreateTransaction,
    ) -> Result<TransactionResponse, AppError> {
        self.update(id, UpdateTransaction::replacing(req)).await
    }

    /// Deletes an existing transaction.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(ENTITY, id)?;
        self.load(&id).await?;

        self.store
            .delete_transaction(&id)
            .await
            .map_err(|e| AppError::internal(format!("deleting transaction {id}"), e))?;

        metrics::counter!("ledger_records_deleted_total", "collection" => Transaction::COLLECTION)
            .increment(1);
        tracing::info!(transaction_id = %id, "transaction deleted");

        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Transaction, AppError> {
        self.store
            .get_transaction(id)
            .await
            .map_err(|e| AppError::from_store(ENTITY, id, e))
    }

    /// The category must exist and its classification must match the type.
    async fn check_category(
        &self,
        category_id: &str,
        transaction_type: TransactionType,
    ) -> Result<(), AppError> {
        let category = match self.store.get_category(category_id).await {
            Ok(category) => category,
            Err(e) if e.is_not_found() => {
                let mut details = FieldErrors::new();
                details.add("categoryId", "Category not found or invalid.");
                return Err(AppError::validation_with_message(
                    "Validation failed for categoryId.",
                    details,
                ));
            }
            Err(e) => return Err(AppError::internal("looking up category", e)),
        };

        if !transaction_type.matches(category.classification) {
            let mut details = FieldErrors::new();
            details.add("type", "Type mismatch with category classification.");
            return Err(AppError::validation_with_message(
                format!(
                    "Transaction type '{transaction_type}' does not match category classification '{}'.",
                    category.classification
                ),
                details,
            ));
        }

        Ok(())
    }

    async fn check_property(&self, property_id: &str) -> Result<(), AppError> {
        match self.store.get_property(property_id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                let mut details = FieldErrors::new();
                details.add("propertyId", "Property not found.");
                Err(AppError::validation_with_message(
                    "Validation failed for propertyId.",
                    details,
                ))
            }
            Err(e) => Err(AppError::internal("looking up property", e)),
        }
    }
}

fn validate_create(req: CreateTransaction) -> Result<NewTransaction, AppError> {
    let mut errors = FieldErrors::new();

    match req.amount {
        Some(amount) => validation::positive_amount(&mut errors, "amount", amount),
        None => validation::missing(&mut errors, "amount"),
    }
    if req.transaction_date.is_none() {
        validation::missing(&mut errors, "transactionDate");
    }
    if req.transaction_type.is_none() {
        validation::missing(&mut errors, "type");
    }
    let category_id = validation::reference_id(
        &mut errors,
        "categoryId",
        req.category_id.as_deref().unwrap_or_default(),
    );
    let property_id = req
        .property_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| validation::reference_id(&mut errors, "propertyId", &id));
    if let Some(description) = &req.description {
        validation::max_chars(&mut errors, "description", description, DESCRIPTION_MAX);
    }

    match (req.amount, req.transaction_date, req.transaction_type) {
        (Some(amount), Some(transaction_date), Some(transaction_type)) if errors.is_empty() => {
            Ok(NewTransaction {
                amount,
                transaction_date,
                description: req.description,
                transaction_type,
                category_id,
                property_id,
            })
        }
        _ => Err(AppError::validation(errors)),
    }
}

/// Resolves a patch of a non-nullable field: `Clear` is an error.
fn required<T>(errors: &mut FieldErrors, field: &str, patch: Patch<T>) -> Option<T> {
    match patch {
        Patch::Unset => None,
        Patch::Clear => {
            validation::missing(errors, field);
            None
        }
        Patch::Set(value) => Some(value),
    }
}

fn parse_filter_id(param: &str, id: &str) -> Result<String, AppError> {
    EntityId::parse(id)
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid '{param}' query parameter: {id}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use record_store::{
        CategoryStore, Classification, InMemoryStore, Property, PropertyStore,
        TransactionCategory,
    };

    use super::*;
    use crate::error::ErrorKind;

    struct Fixture {
        service: TransactionService<InMemoryStore>,
        rent: String,
        repairs: String,
        property: String,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let rent = EntityId::new().to_string();
        let repairs = EntityId::new().to_string();
        let property = EntityId::new().to_string();

        store
            .create_category(TransactionCategory {
                id: rent.clone(),
                name: "Rent".into(),
                classification: Classification::Income,
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_category(TransactionCategory {
                id: repairs.clone(),
                name: "Repairs".into(),
                classification: Classification::Expense,
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_property(Property {
                id: property.clone(),
                name: "Harbour View".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        Fixture {
            service: TransactionService::new(store),
            rent,
            repairs,
            property,
        }
    }

    fn day(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_income_against_income_category() {
        let f = fixture().await;
        let created = f
            .service
            .create(
                CreateTransaction::new(1200.0, day(3, 1), TransactionType::Income, &f.rent)
                    .with_property(&f.property)
                    .with_description("March rent"),
            )
            .await
            .unwrap();

        assert!(EntityId::is_well_formed(&created.id));
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.amount, 1200.0);
        assert_eq!(created.property_id.as_deref(), Some(f.property.as_str()));
    }

    #[tokio::test]
    async fn type_mismatch_is_rejected_without_write() {
        let f = fixture().await;
        let writes = f.service.store().write_count();

        let err = f
            .service
            .create(CreateTransaction::new(
                50.0,
                day(3, 2),
                TransactionType::Income,
                &f.repairs,
            ))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.details().unwrap().contains("type"));
        assert_eq!(f.service.store().write_count(), writes);
    }

    #[tokio::test]
    async fn unknown_category_is_a_validation_error() {
        let f = fixture().await;
        let err = f
            .service
            .create(CreateTransaction::new(
                50.0,
                day(3, 2),
                TransactionType::Expense,
                EntityId::new().to_string(),
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err.details().unwrap().get("categoryId"),
            Some("Category not found or invalid.")
        );
    }

    #[tokio::test]
    async fn unknown_property_is_a_validation_error() {
        let f = fixture().await;
        let err = f
            .service
            .create(
                CreateTransaction::new(50.0, day(3, 2), TransactionType::Expense, &f.repairs)
                    .with_property(EntityId::new().to_string()),
            )
            .await
            .unwrap_err();

        assert!(err.details().unwrap().contains("propertyId"));
    }

    #[tokio::test]
    async fn create_collects_field_errors() {
        let f = fixture().await;
        let err = f
            .service
            .create(CreateTransaction {
                amount: Some(-5.0),
                category_id: Some("rent".into()),
                description: Some("x".repeat(501)),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let details = err.details().unwrap();
        for field in ["amount", "transactionDate", "type", "categoryId", "description"] {
            assert!(details.contains(field), "missing error for {field}");
        }
    }

    #[tokio::test]
    async fn patching_type_against_category_leaves_record_unchanged() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                1200.0,
                day(3, 1),
                TransactionType::Income,
                &f.rent,
            ))
            .await
            .unwrap();

        let err = f
            .service
            .update(
                &created.id,
                UpdateTransaction::new().transaction_type(TransactionType::Expense),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let stored = f.service.get_by_id(&created.id).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn moving_type_and_category_together_succeeds() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                1200.0,
                day(3, 1),
                TransactionType::Income,
                &f.rent,
            ))
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                &created.id,
                UpdateTransaction::new()
                    .transaction_type(TransactionType::Expense)
                    .category_id(&f.repairs)
                    .amount(80.0),
            )
            .await
            .unwrap();

        assert_eq!(updated.transaction_type, TransactionType::Expense);
        assert_eq!(updated.category_id, f.repairs);
        assert_eq!(updated.amount, 80.0);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn empty_patch_skips_write() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                1200.0,
                day(3, 1),
                TransactionType::Income,
                &f.rent,
            ))
            .await
            .unwrap();
        let writes = f.service.store().write_count();

        let same = f
            .service
            .update(&created.id, UpdateTransaction::new().amount(1200.0))
            .await
            .unwrap();

        assert_eq!(same.updated_at, created.updated_at);
        assert_eq!(f.service.store().write_count(), writes);
    }

    #[tokio::test]
    async fn amount_only_patch_does_not_recheck_category() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                1200.0,
                day(3, 1),
                TransactionType::Income,
                &f.rent,
            ))
            .await
            .unwrap();
        f.service.store().delete_category(&f.rent).await.unwrap();

        let updated = f
            .service
            .update(&created.id, UpdateTransaction::new().amount(1300.0))
            .await
            .unwrap();
        assert_eq!(updated.amount, 1300.0);
    }

    #[tokio::test]
    async fn clearing_nullable_and_required_fields() {
        let f = fixture().await;
        let created = f
            .service
            .create(
                CreateTransaction::new(75.0, day(3, 4), TransactionType::Expense, &f.repairs)
                    .with_property(&f.property)
                    .with_description("Boiler"),
            )
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                &created.id,
                UpdateTransaction {
                    description: Patch::Clear,
                    property_id: Patch::Clear,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.property_id, None);

        let err = f
            .service
            .update(
                &created.id,
                UpdateTransaction {
                    amount: Patch::Clear,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.details().unwrap().get("amount"), Some("amount is required."));
    }

    #[tokio::test]
    async fn replace_overwrites_every_field() {
        let f = fixture().await;
        let created = f
            .service
            .create(
                CreateTransaction::new(75.0, day(3, 4), TransactionType::Expense, &f.repairs)
                    .with_property(&f.property)
                    .with_description("Boiler"),
            )
            .await
            .unwrap();

        let replaced = f
            .service
            .replace(
                &created.id,
                CreateTransaction::new(900.0, day(4, 1), TransactionType::Income, &f.rent),
            )
            .await
            .unwrap();

        assert_eq!(replaced.amount, 900.0);
        assert_eq!(replaced.transaction_type, TransactionType::Income);
        assert_eq!(replaced.description, None);
        assert_eq!(replaced.property_id, None);
        assert_eq!(replaced.created_at, created.created_at);
    }

    #[tokio::test]
    async fn replace_requires_every_required_field() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                75.0,
                day(3, 4),
                TransactionType::Expense,
                &f.repairs,
            ))
            .await
            .unwrap();

        let err = f
            .service
            .replace(
                &created.id,
                CreateTransaction {
                    amount: Some(10.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        let details = err.details().unwrap();
        assert!(details.contains("transactionDate"));
        assert!(details.contains("categoryId"));
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let f = fixture().await;
        let other_property = EntityId::new().to_string();
        f.service
            .store()
            .create_property(Property {
                id: other_property.clone(),
                name: "Cellar".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut matching = Vec::new();
        for d in [5, 20, 12] {
            let tx = f
                .service
                .create(
                    CreateTransaction::new(10.0, day(1, d), TransactionType::Expense, &f.repairs)
                        .with_property(&f.property),
                )
                .await
                .unwrap();
            matching.push(tx);
        }
        f.service
            .create(
                CreateTransaction::new(10.0, day(1, 8), TransactionType::Expense, &f.repairs)
                    .with_property(&other_property),
            )
            .await
            .unwrap();
        f.service
            .create(
                CreateTransaction::new(500.0, day(1, 9), TransactionType::Income, &f.rent)
                    .with_property(&f.property),
            )
            .await
            .unwrap();
        f.service
            .create(
                CreateTransaction::new(10.0, day(2, 2), TransactionType::Expense, &f.repairs)
                    .with_property(&f.property),
            )
            .await
            .unwrap();

        let filter = TransactionFilter::new()
            .property_id(f.property.as_str())
            .transaction_type(TransactionType::Expense)
            .start_date(day(1, 1))
            .end_date(day(1, 31));
        let page = f
            .service
            .list(filter, PageRequest::default())
            .await
            .unwrap();

        let dates: Vec<_> = page.data.iter().map(|t| t.transaction_date).collect();
        assert_eq!(dates, [day(1, 20), day(1, 12), day(1, 5)]);
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn list_rejects_malformed_filter_ids() {
        let f = fixture().await;
        let err = f
            .service
            .list(
                TransactionFilter::new().property_id("nope"),
                PageRequest::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn list_rejects_inverted_date_range() {
        let f = fixture().await;
        let err = f
            .service
            .list(
                TransactionFilter::new()
                    .start_date(day(2, 1))
                    .end_date(day(1, 1)),
                PageRequest::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let f = fixture().await;
        let created = f
            .service
            .create(CreateTransaction::new(
                10.0,
                day(1, 1),
                TransactionType::Expense,
                &f.repairs,
            ))
            .await
            .unwrap();

        f.service.delete(&created.id).await.unwrap();
        let err = f.service.get_by_id(&created.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
