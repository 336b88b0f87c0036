//! Property service.

use common::{EntityId, PageRequest, Paginated, Patch};
use record_store::{Property, PropertyStore, Record};

use crate::error::{AppError, FieldErrors, parse_id};
use crate::validation::{self, ADDRESS_MAX, PROPERTY_NAME_MAX};

use super::{CreateProperty, PropertyResponse, UpdateProperty};

const ENTITY: &str = "Property";

/// Service for managing properties.
pub struct PropertyService<S> {
    store: S,
    unique_names: bool,
}

impl<S: PropertyStore> PropertyService<S> {
    /// Creates a property service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            unique_names: false,
        }
    }

    /// Rejects a second property with the same name when enabled.
    pub fn with_unique_names(mut self, enabled: bool) -> Self {
        self.unique_names = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers a new property.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, req: CreateProperty) -> Result<PropertyResponse, AppError> {
        let mut errors = FieldErrors::new();
        let name = validation::required_text(&mut errors, "name", &req.name, PROPERTY_NAME_MAX);
        if let Some(address) = &req.address {
            validation::max_chars(&mut errors, "address", address, ADDRESS_MAX);
        }
        errors.into_result()?;

        if self.unique_names {
            self.ensure_name_available(&name, None).await?;
        }

        let now = crate::now();
        let property = Property {
            id: EntityId::new().to_string(),
            name,
            address: req.address,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_property(property.clone())
            .await
            .map_err(|e| AppError::internal("creating property", e))?;

        metrics::counter!("ledger_records_created_total", "collection" => Property::COLLECTION)
            .increment(1);
        tracing::info!(property_id = %property.id, "property created");

        Ok(property.into())
    }

    /// Fetches a property by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<PropertyResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        Ok(self.load(&id).await?.into())
    }

    /// Returns one page of properties ordered by name.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, page: PageRequest) -> Result<Paginated<PropertyResponse>, AppError> {
        let listing = self
            .store
            .list_properties(page.limit(), page.offset())
            .await
            .map_err(|e| AppError::internal("listing properties", e))?;

        let page = Paginated {
            data: listing.items,
            pagination: page.info(listing.total),
        };
        Ok(page.map(Into::into))
    }

    /// Applies a partial update. A request that changes nothing is not
    /// written.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: &str,
        req: UpdateProperty,
    ) -> Result<PropertyResponse, AppError> {
        let id = parse_id(ENTITY, id)?;
        let mut property = self.load(&id).await?;

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
                PROPERTY_NAME_MAX,
            )),
        };
        let address = match req.address {
            Patch::Unset => None,
            Patch::Clear => Some(None),
            Patch::Set(address) => {
                validation::max_chars(&mut errors, "address", &address, ADDRESS_MAX);
                Some(Some(address))
            }
        };
        errors.into_result()?;

        let mut changed = false;
        let mut renamed = false;
        if let Some(name) = name
            && name != property.name
        {
            property.name = name;
            changed = true;
            renamed = true;
        }
        if let Some(address) = address
            && address != property.address
        {
            property.address = address;
            changed = true;
        }

        if !changed {
            tracing::debug!(property_id = %id, "update changed nothing");
            return Ok(property.into());
        }

        if renamed && self.unique_names {
            self.ensure_name_available(&property.name, Some(&property.id))
                .await?;
        }

        property.updated_at = crate::now();
        self.store
            .update_property(property.clone())
            .await
            .map_err(|e| AppError::from_store(ENTITY, &id, e))?;

        metrics::counter!("ledger_records_updated_total", "collection" => Property::COLLECTION)
            .increment(1);
        tracing::info!(property_id = %id, "property updated");

        Ok(property.into())
    }

    /// Deletes an existing property.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(ENTITY, id)?;
        self.load(&id).await?;

        self.store
            .delete_property(&id)
            .await
            .map_err(|e| AppError::internal(format!("deleting property {id}"), e))?;

        metrics::counter!("ledger_records_deleted_total", "collection" => Property::COLLECTION)
            .increment(1);
        tracing::info!(property_id = %id, "property deleted");

        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Property, AppError> {
        self.store
            .get_property(id)
            .await
            .map_err(|e| AppError::from_store(ENTITY, id, e))
    }

    async fn ensure_name_available(&self, name: &str, except: Option<&str>) -> Result<(), AppError> {
        let existing = self
            .store
            .find_property_by_name(name)
            .await
            .map_err(|e| AppError::internal("checking for existing property", e))?;

        match existing {
            Some(other) if Some(other.id.as_str()) != except => Err(AppError::Conflict(format!(
                "Property with name '{name}' already exists."
            ))),
            _ => Ok(()),
        }
    }
}
