//! Context paths: the containers from the model root to an edit position.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::EntityOwner;
use super::id::EntityId;

/// Ordered sequence of containers from the model root to the container
/// currently being visited. The empty path is the model root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextPath(Vec<EntityId>);

impl ContextPath {
    /// The model root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if this is the model root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of containers between the root and this position.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The innermost container, if any.
    pub fn last(&self) -> Option<EntityId> {
        self.0.last().copied()
    }

    /// The path one level deeper, inside `container`.
    pub fn child(&self, container: EntityId) -> Self {
        let mut path = self.0.clone();
        path.push(container);
        Self(path)
    }

    /// The enclosing path. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut path = self.0.clone();
        path.pop();
        Self(path)
    }

    /// Owner of the entity collection active at this position.
    pub fn owner(&self) -> EntityOwner {
        match self.last() {
            Some(id) => EntityOwner::Container(id),
            None => EntityOwner::Root,
        }
    }

    /// Borrow the container ids.
    pub fn as_slice(&self) -> &[EntityId] {
        &self.0
    }
}

impl From<Vec<EntityId>> for ContextPath {
    fn from(path: Vec<EntityId>) -> Self {
        Self(path)
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for id in &self.0 {
            write!(f, "/{}", id.short())?;
        }
        Ok(())
    }
}
