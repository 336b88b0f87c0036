//! Property requests.

use common::Patch;
use serde::Deserialize;

/// Request to register a new property.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperty {
    /// Display name. Missing is reported as a validation error.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,
}

impl CreateProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Partial update of a property. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProperty {
    #[serde(default)]
    pub name: Patch<String>,

    /// `null` removes the address.
    #[serde(default)]
    pub address: Patch<String>,
}

impl UpdateProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Patch::Set(name.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Patch::Set(address.into());
        self
    }

    pub fn clear_address(mut self) -> Self {
        self.address = Patch::Clear;
        self
    }

    /// Returns true when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_unset() && self.address.is_unset()
    }
}
