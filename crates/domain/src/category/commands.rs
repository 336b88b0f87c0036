//! Category requests.

use common::Patch;
use record_store::Classification;
use serde::Deserialize;

/// Request to create a transaction category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[serde(default)]
    pub name: String,

    /// Missing is reported as a validation error.
    #[serde(default)]
    pub classification: Option<Classification>,
}

impl CreateCategory {
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            classification: Some(classification),
        }
    }
}

/// Partial update of a category. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Patch<String>,

    #[serde(default)]
    pub classification: Patch<Classification>,
}

impl UpdateCategory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Patch::Set(name.into());
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = Patch::Set(classification);
        self
    }
}
