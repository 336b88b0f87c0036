//! Category service.

use std::str::FromStr;

use common::{EntityId, PageRequest, Paginated, Patch};
use record_store::{
    CategoryFilter, CategoryStore, Classification, Record, TransactionCategory, TransactionStore,
};
use thiserror::Error;

use crate::error::{AppError, FieldErrors, parse_id};
use crate::validation::{self, CATEGORY_NAME_MAX};

use super::{CategoryResponse, CreateCategory, UpdateCategory};

const ENTITY: &str = "Category";

/// What happens to transactions when their category is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryDeletePolicy {
    /// Delete the category and leave referencing transactions as they are.
    #[default]
    Allow,
    /// Refuse to delete a category that transactions still reference.
    Restrict,
}

/// Error returned when parsing a delete policy fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delete policy '{0}': expected 'allow' or 'restrict'")]
pub struct ParsePolicyError(pub String);

impl FromStr for CategoryDeletePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(CategoryDeletePolicy::Allow),
            "restrict" => Ok(CategoryDeletePolicy::Restrict),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Service for managing transaction categories.
///
/// `(name, classification)` pairs are kept unique. The store must also
/// answer transaction counts so the delete policy can be enforced.
pub struct CategoryService<S> {
    store: S,
    delete_policy: CategoryDeletePolicy,
}

impl<S: CategoryStore + TransactionStore> CategoryService<S> {
    /// Creates a category service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            delete_policy: CategoryDeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: CategoryDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a category with a name unique within its classification.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, req: CreateCategory) -> Result<CategoryResponse, AppError> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &req.name, CATEGORY_NAME_MAX);
        if req.classification.is_none() {
            errors.add(
                "classification",
                "Classification must be 'income' or 'expense'.",
            );
        }
        errors.into_result()?;
        let classification = req.classification.unwrap_or_default();

        self.ensure_unique(&name, classification, None).await?;

        let now = crate::now();
        let category = TransactionCategory {
            id: EntityId::new().to_string(),
            name,
            classification,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_category(category.clone())
            .await
            .map_err(|e| AppError::internal("creating category", e))?;

        metrics::counter!(
            "ledger_records_created_total",
            "collection" => TransactionCategory::COLLECTION
        )
        .increment(1);
        tracing::info!(category_id = %category.id, "category created");

        Ok(category.into())
    }

    /// Fetches a category by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<CategoryResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        Ok(self.load(&id).await?.into())
    }

    /// Returns one page of categories ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        filter: CategoryFilter,
        page: PageRequest,
    ) -> Result<Paginated<CategoryResponse>, AppError> {
        let listing = self
            .store
            .list_categories(&filter, page.limit(), page.offset())
            .await
            .map_err(|e| AppError::internal("listing categories", e))?;

        let page = Paginated {
            data: listing.items,
            pagination: page.info(listing.total),
        };
        Ok(page.map(Into::into))
    }

    /// Applies a partial update, re-checking uniqueness when the name or
    /// classification changes.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: &str,
        req: UpdateCategory,
    ) -> Result<CategoryResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        let mut category = self.load(&id).await?;

        let mut errors = FieldErrors::new();
        let name = match req.name {
            Patch::Unset => None,
            Patch::Clear => {
                validation::missing(&mut errors, "name");
                None
            }
            Patch::Set(name) => Some(validation::required_text(
                &mut errors,
                "name",
                &name,
                CATEGORY_NAME_MAX,
            )),
        };
        let classification = match req.classification {
            Patch::Unset => None,
            Patch::Clear => {
                errors.add(
                    "classification",
                    "Classification must be 'income' or 'expense'.",
                );
                None
            }
            Patch::Set(classification) => Some(classification),
        };
        errors.into_result()?;

        let mut changed = false;
        if let Some(name) = name
            && name != category.name
        {
            category.name = name;
            changed = true;
        }
        if let Some(classification) = classification
            && classification != category.classification
        {
            category.classification = classification;
            changed = true;
        }

        if !changed {
            tracing::debug!(category_id = %id, "update changed nothing");
            return Ok(category.into());
        }

        self.ensure_unique(&category.name, category.classification, Some(&category.id))
            .await?;

        category.updated_at = crate::now();
        self.store
            .update_category(category.clone())
            .await
            .map_err(|e| AppError::from_store(ENTITY, &id, e))?;

        metrics::counter!(
            "ledger_records_updated_total",
            "collection" => TransactionCategory::COLLECTION
        )
        .increment(1);
        tracing::info!(category_id = %id, "category updated");

        Ok(category.into())
    }

    /// Deletes an existing category, subject to the delete policy.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(ENTITY, id)?;
        let category = self.load(&id).await?;

        if self.delete_policy == CategoryDeletePolicy::Restrict {
            let references = self
                .store
                .count_transactions_by_category(&id)
                .await
                .map_err(|e| AppError::internal(format!("counting transactions for {id}"), e))?;
            if references > 0 {
                return Err(AppError::Conflict(format!(
                    "Category '{}' is still used by {references} transaction(s).",
                    category.name
                )));
            }
        }

        self.store
            .delete_category(&id)
            .await
            .map_err(|e| AppError::internal(format!("deleting category {id}"), e))?;

        metrics::counter!(
            "ledger_records_deleted_total",
            "collection" => TransactionCategory::COLLECTION
        )
        .increment(1);
        tracing::info!(category_id = %id, "category deleted");

        Ok(())
    }

    async fn load(&self, id: &str) -> Result<TransactionCategory, AppError> {
        self.store
            .get_category(id)
            .await
            .map_err(|e| AppError::from_store(ENTITY, id, e))
    }

    async fn ensure_unique(
        &self,
        name: &str,
        classification: Classification,
        except: Option<&str>,
    ) -> Result<(), AppError> {
        let existing = self
            .store
            .find_category_by_name_and_classification(name, classification)
            .await
            .map_err(|e| AppError::internal("checking for existing category", e))?;

        match existing {
            Some(other) if Some(other.id.as_str()) != except => Err(AppError::Conflict(format!(
                "Category with name '{name}' and classification '{classification}' already exists."
            ))),
            _ => Ok(()),
        }
    }
}
