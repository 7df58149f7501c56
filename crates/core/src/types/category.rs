//! Product categories.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;
use super::validation::{ValidationErrors, require_text};

/// A category as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Draft used to create or edit a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
}

impl From<Category> for MinimalCategory {
    fn from(category: Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name,
        }
    }
}

impl MinimalCategory {
    /// Validate the draft before submission.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name);
        errors.into_result()
    }
}
