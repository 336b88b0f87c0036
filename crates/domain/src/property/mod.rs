//! Properties: the rental units transactions can be booked against.

mod commands;
mod service;

pub use commands::{CreateProperty, UpdateProperty};
pub use service::PropertyService;

use chrono::{DateTime, Utc};
use record_store::Property;
use serde::{Deserialize, Serialize};

/// Property as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Property> for PropertyResponse {
    fn from(property: Property) -> Self {
        Self {
            id: property.id,
            name: property.name,
            address: property.address,
            created_at: property.created_at,
            updated_at: property.updated_at,
        }
    }
}
