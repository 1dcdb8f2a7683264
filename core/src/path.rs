//! Index-path addressing into the property tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a property in the tree, as a list of sibling indices.
///
/// `[2]` is the third root property, `[2, 0]` its first nested child. The
/// empty path addresses the root itself and is only meaningful as a parent.
///
/// # Examples
///
/// ```
/// use schema_builder_core::PropertyPath;
///
/// let child = PropertyPath::root(2).child(0);
/// assert_eq!(child.indices(), &[2, 0]);
/// assert_eq!(child.parent(), Some(PropertyPath::root(2)));
/// assert_eq!(child.to_string(), "[2][0]");
/// assert!(PropertyPath::root(2).parent().unwrap().is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(Vec<usize>);

impl PropertyPath {
    /// Path of the root property at `index`.
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    /// Path of the `index`-th child of this property.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the owning property, or `None` for the root itself.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Position among siblings, or `None` for the root itself.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns `true` for the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth; root properties have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for PropertyPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for PropertyPath {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("[]");
        }
        for index in &self.0 {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
