//! Write and query operations over the entities.
//!
//! Every function takes the connection (or transaction) explicitly; nothing
//! here holds database state of its own.

pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;

use serde::{Deserialize, Serialize};

/// Input for the name/slug pair shared by categories and genres.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugInput {
    pub name: String,
    /// Derived from `name` when absent or blank.
    #[serde(default)]
    pub slug: Option<String>,
}

impl SlugInput {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: Some(slug.into()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    pub(crate) fn resolved_slug(&self) -> Result<String, crate::ModelError> {
        crate::validation::slug_or_derive(self.slug.as_deref(), &self.name)
    }
}
