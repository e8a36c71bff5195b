use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opaque positional key of a category inside a [`CategorySpace`].
///
/// Keys are only meaningful for the space that produced them; they are
/// resolved once per generation run so rules do not re-resolve names ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryKey(usize);

impl CategoryKey {
    /// Position of the category in space order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named category with its ordered list of permitted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Unique, non-empty category name.
    pub name: String,
    /// Permitted values; order drives generation order.
    pub values: Vec<String>,
}

impl Category {
    pub fn new<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `value` among the permitted values.
    pub fn value_index(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|candidate| candidate == value)
    }

    pub fn allows(&self, value: &str) -> bool {
        self.value_index(value).is_some()
    }
}

/// Ordered mapping from category name to permitted values.
///
/// Category order defines column order of generated assignments and the
/// tie-breaks of the pairwise generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySpace {
    pub categories: Vec<Category>,
}

impl CategorySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that appends a category.
    pub fn with_category<N, I, V>(mut self, name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.categories.push(Category::new(name, values));
        self
    }

    pub fn push(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Category names in space order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    /// Resolve a category name to its positional key.
    pub fn key_of(&self, name: &str) -> Option<CategoryKey> {
        self.categories
            .iter()
            .position(|category| category.name == name)
            .map(CategoryKey)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn by_key(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.get(key.0)
    }

    /// Number of values per category, in space order.
    pub fn sizes(&self) -> Vec<usize> {
        self.categories
            .iter()
            .map(|category| category.values.len())
            .collect()
    }

    /// Size of the full Cartesian product, `None` on overflow.
    ///
    /// An empty space has no combinations.
    pub fn combination_count(&self) -> Option<u64> {
        if self.categories.is_empty() {
            return Some(0);
        }
        self.categories.iter().try_fold(1_u64, |acc, category| {
            acc.checked_mul(category.values.len() as u64)
        })
    }
}

impl FromIterator<Category> for CategorySpace {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}
