use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::space::CategorySpace;

/// One selected value per category.
///
/// Cells keep insertion order (space order for generator output), while
/// equality and hashing only look at the sorted `(category, value)` content.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    cells: Vec<(String, String)>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an assignment from per-category value indices, in space order.
    ///
    /// Indices must be in range for their category.
    pub fn from_indices(space: &CategorySpace, indices: &[usize]) -> Self {
        let cells = space
            .iter()
            .zip(indices)
            .map(|(category, &idx)| (category.name.clone(), category.values[idx].clone()))
            .collect();
        Self { cells }
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite the value of `category`, appending the cell when missing.
    pub fn set(&mut self, category: &str, value: impl Into<String>) {
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| name == category) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((category.to_string(), value)),
        }
    }

    /// Builder-style variant of [`Assignment::set`].
    pub fn with(mut self, category: &str, value: impl Into<String>) -> Self {
        self.set(category, value);
        self
    }

    pub fn matches(&self, category: &str, value: &str) -> bool {
        self.get(category) == Some(value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// True when every category of `space` has exactly one cell and no
    /// foreign categories are present.
    pub fn is_complete_for(&self, space: &CategorySpace) -> bool {
        self.cells.len() == space.len() && space.names().all(|name| self.get(name).is_some())
    }

    /// Values laid out in space order; missing categories yield `None`.
    pub fn values_in_order<'a>(&'a self, space: &'a CategorySpace) -> Vec<Option<&'a str>> {
        space.names().map(|name| self.get(name)).collect()
    }

    /// Sorted content used for equality and deduplication.
    pub fn content_key(&self) -> Vec<(&str, &str)> {
        let mut key: Vec<(&str, &str)> = self.iter().collect();
        key.sort_unstable();
        key
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        self.cells.len() == other.cells.len() && self.content_key() == other.content_key()
    }
}

impl Eq for Assignment {}

impl Hash for Assignment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_key().hash(state);
    }
}

impl<K, V> FromIterator<(K, V)> for Assignment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut assignment = Assignment::new();
        for (category, value) in iter {
            let category: String = category.into();
            assignment.set(&category, value);
        }
        assignment
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (category, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{category}={value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (category, value) in &self.cells {
            map.serialize_entry(category, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Assignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AssignmentVisitor;

        impl<'de> Visitor<'de> for AssignmentVisitor {
            type Value = Assignment;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Assignment, A::Error> {
                let mut assignment = Assignment::new();
                while let Some((category, value)) = access.next_entry::<String, String>()? {
                    assignment.set(&category, value);
                }
                Ok(assignment)
            }
        }

        deserializer.deserialize_map(AssignmentVisitor)
    }
}
