//! Object tree for Trellis.
//!
//! Every widget and most support objects are nodes in an [`ObjectTree`]:
//! - Unique object identifiers via arena-based storage
//! - Parent-child ownership, where the parent's child list is the owning side
//!   and the parent link is a plain index back-reference
//! - Child order doubles as z-order (back-to-front)
//! - Per-node visibility flag and signal blocker
//!
//! Because a node only refers to its parent by [`ObjectId`], destroying a
//! subtree is a single pass over the arena with no cycle breaking.

use std::fmt;

use slotmap::{SlotMap, new_key_type};

use crate::signal::SignalBlocker;

new_key_type! {
    /// A unique identifier for a node in an [`ObjectTree`].
    ///
    /// `ObjectId`s are stable handles that remain valid even as the tree changes.
    /// They become invalid when the node is destroyed.
    pub struct ObjectId;
}

impl ObjectId {
    /// Convert the ObjectId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create an ObjectId from a raw u64 value.
    ///
    /// This does not check that the id exists in any tree.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Errors that can occur during object tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The object ID is invalid or has been destroyed.
    InvalidObjectId,
    /// Attempted to set an object as its own parent or ancestor.
    CircularParentage,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObjectId => write!(f, "Invalid or destroyed object ID"),
            Self::CircularParentage => {
                write!(f, "Cannot set an object as its own parent or ancestor")
            }
        }
    }
}

impl std::error::Error for ObjectError {}

/// Result type for object operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Per-node data held by the tree.
struct NodeData {
    name: String,
    type_name: &'static str,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    visible: bool,
    blocker: SignalBlocker,
}

impl NodeData {
    fn new(type_name: &'static str, blocker: SignalBlocker) -> Self {
        Self {
            name: String::new(),
            type_name,
            parent: None,
            children: Vec::new(),
            visible: true,
            blocker,
        }
    }
}

/// Arena holding every node of one UI instance.
///
/// Nodes without a parent are top-level windows, kept in registration order.
pub struct ObjectTree {
    nodes: SlotMap<ObjectId, NodeData>,
    top_level: Vec<ObjectId>,
}

impl Default for ObjectTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            top_level: Vec::new(),
        }
    }

    /// Create a new top-level node with its own signal blocker.
    pub fn create(&mut self, type_name: &'static str) -> ObjectId {
        self.create_with_blocker(type_name, SignalBlocker::new())
    }

    /// Create a new top-level node that shares an existing signal blocker.
    ///
    /// Widgets create their signals before they are inserted into the tree,
    /// so the tree adopts the blocker those signals already watch.
    pub fn create_with_blocker(
        &mut self,
        type_name: &'static str,
        blocker: SignalBlocker,
    ) -> ObjectId {
        let id = self.nodes.insert(NodeData::new(type_name, blocker));
        self.top_level.push(id);
        tracing::trace!(target: "trellis_core::object", ?id, type_name, "created object");
        id
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns every removed id, the node itself first, in pre-order.
    #[tracing::instrument(skip(self), target = "trellis_core::object", level = "trace")]
    pub fn destroy(&mut self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let removed = self.depth_first_preorder(id)?;
        tracing::trace!(target: "trellis_core::object", ?id, count = removed.len(), "destroying object tree");

        self.detach(id);
        for node in &removed {
            self.nodes.remove(*node);
        }
        Ok(removed)
    }

    /// Check if a node exists.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set the parent of a node.
    ///
    /// The node is detached from its previous parent first and appended to
    /// the new parent's children, making it the topmost sibling. Passing
    /// `None` registers it as a top-level window. Re-parenting to the current
    /// parent is a no-op and keeps the node's z-position.
    pub fn set_parent(&mut self, id: ObjectId, new_parent: Option<ObjectId>) -> ObjectResult<()> {
        let current = self.parent(id)?;

        if let Some(parent_id) = new_parent {
            if !self.nodes.contains_key(parent_id) {
                return Err(ObjectError::InvalidObjectId);
            }
            if self.is_ancestor_of(id, parent_id) {
                return Err(ObjectError::CircularParentage);
            }
        }

        if current == new_parent {
            return Ok(());
        }

        self.detach(id);

        if let Some(data) = self.nodes.get_mut(id) {
            data.parent = new_parent;
        }

        match new_parent {
            Some(parent_id) => {
                if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                    parent_data.children.push(id);
                }
            }
            None => self.top_level.push(id),
        }

        tracing::trace!(target: "trellis_core::object", ?id, ?new_parent, "reparented object");
        Ok(())
    }

    /// Remove `id` from whichever list currently owns it.
    fn detach(&mut self, id: ObjectId) {
        match self.nodes.get(id).and_then(|d| d.parent) {
            Some(parent_id) => {
                if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                    parent_data.children.retain(|&child| child != id);
                }
            }
            None => self.top_level.retain(|&top| top != id),
        }
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_of(&self, potential_ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.nodes
            .get(id)
            .map(|d| d.parent)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Get the children of a node, back-to-front.
    pub fn children(&self, id: ObjectId) -> ObjectResult<&[ObjectId]> {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Top-level nodes in registration order.
    pub fn top_levels(&self) -> &[ObjectId] {
        &self.top_level
    }

    /// Get the node's name.
    pub fn name(&self, id: ObjectId) -> ObjectResult<&str> {
        self.nodes
            .get(id)
            .map(|d| d.name.as_str())
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Set the node's name.
    pub fn set_name(&mut self, id: ObjectId, name: impl Into<String>) -> ObjectResult<()> {
        let data = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        data.name = name.into();
        Ok(())
    }

    /// Get the type name the node was created with.
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        self.nodes
            .get(id)
            .map(|d| d.type_name)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Find a direct child by name.
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        let data = self.nodes.get(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes.get(child).is_some_and(|c| c.name == name)))
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Set the node's own visibility flag. Returns the previous value.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> ObjectResult<bool> {
        let data = self.nodes.get_mut(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(std::mem::replace(&mut data.visible, visible))
    }

    /// The node's own visibility flag.
    pub fn is_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        self.nodes
            .get(id)
            .map(|d| d.visible)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Whether the node and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: ObjectId) -> ObjectResult<bool> {
        let data = self.nodes.get(id).ok_or(ObjectError::InvalidObjectId)?;
        if !data.visible {
            return Ok(false);
        }

        let mut current = data.parent;
        while let Some(current_id) = current {
            match self.nodes.get(current_id) {
                Some(ancestor) if !ancestor.visible => return Ok(false),
                Some(ancestor) => current = ancestor.parent,
                None => break,
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Signal Blocking
    // =========================================================================

    /// The blocker shared by every signal this node owns.
    pub fn signal_blocker(&self, id: ObjectId) -> ObjectResult<&SignalBlocker> {
        self.nodes
            .get(id)
            .map(|d| &d.blocker)
            .ok_or(ObjectError::InvalidObjectId)
    }

    /// Block or unblock every signal the node owns, returning the previous state.
    ///
    /// Children are not affected.
    pub fn block_signals(&self, id: ObjectId, blocked: bool) -> ObjectResult<bool> {
        Ok(self.signal_blocker(id)?.block(blocked))
    }

    // =========================================================================
    // Z-Order
    // =========================================================================

    /// Index of the node within its parent's children.
    pub fn sibling_index(&self, id: ObjectId) -> ObjectResult<Option<usize>> {
        let data = self.nodes.get(id).ok_or(ObjectError::InvalidObjectId)?;
        Ok(data.parent.and_then(|parent_id| {
            self.nodes
                .get(parent_id)
                .and_then(|p| p.children.iter().position(|&c| c == id))
        }))
    }

    /// Raise a node to the front (highest z-order among siblings).
    pub fn raise(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.nodes.get(id).ok_or(ObjectError::InvalidObjectId)?;
        let list = match data.parent {
            Some(parent_id) => {
                &mut self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or(ObjectError::InvalidObjectId)?
                    .children
            }
            None => &mut self.top_level,
        };
        list.retain(|&child| child != id);
        list.push(id);
        Ok(())
    }

    /// Lower a node to the back (lowest z-order among siblings).
    pub fn lower(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.nodes.get(id).ok_or(ObjectError::InvalidObjectId)?;
        let list = match data.parent {
            Some(parent_id) => {
                &mut self
                    .nodes
                    .get_mut(parent_id)
                    .ok_or(ObjectError::InvalidObjectId)?
                    .children
            }
            None => &mut self.top_level,
        };
        list.retain(|&child| child != id);
        list.insert(0, id);
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// All ancestors of a node from immediate parent to root.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        let mut result = Vec::new();
        let mut current = self.parent(id)?;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Depth-first pre-order traversal starting from (and including) `id`.
    pub fn depth_first_preorder(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        if !self.nodes.contains_key(id) {
            return Err(ObjectError::InvalidObjectId);
        }

        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(data) = self.nodes.get(current) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        Ok(result)
    }
}
