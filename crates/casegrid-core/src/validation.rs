use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::space::CategorySpace;

/// Validate a category space before generation.
///
/// This checks:
/// - at least one category
/// - category names are non-empty and unique
/// - every category has at least one value
/// - values are unique within their category
pub fn validate_space(space: &CategorySpace) -> Result<()> {
    if space.is_empty() {
        return Err(Error::InvalidSpace("space has no categories".to_string()));
    }

    let mut names = BTreeSet::new();
    for (idx, category) in space.iter().enumerate() {
        if category.name.trim().is_empty() {
            return Err(Error::InvalidSpace(format!("category #{idx} has an empty name")));
        }

        if !names.insert(category.name.as_str()) {
            return Err(Error::InvalidSpace(format!(
                "duplicate category name: {}",
                category.name
            )));
        }

        if category.values.is_empty() {
            return Err(Error::InvalidSpace(format!(
                "category has no values: {}",
                category.name
            )));
        }

        let mut values = BTreeSet::new();
        for value in &category.values {
            if !values.insert(value.as_str()) {
                return Err(Error::InvalidSpace(format!(
                    "duplicate value in category {}: {}",
                    category.name, value
                )));
            }
        }
    }

    Ok(())
}
