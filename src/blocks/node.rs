//! Typed identifiers for the nodes of a scope tree.
//!
//! This module provides [`BlockId`] and [`ScopeId`], strongly-typed indices into the
//! block and scope arenas of a [`ScopeTree`](crate::blocks::ScopeTree), and [`FlowNode`],
//! the closed variant set used wherever a child of a scope may be either a basic block
//! or a nested region.

use std::fmt;

/// A strongly-typed identifier for basic blocks within a scope tree.
///
/// `BlockId` wraps a `usize` index, providing type safety to prevent accidental mixing
/// of block indices with scope indices or other integer values. Block ids are assigned
/// sequentially starting from 0 as blocks are added to a tree.
///
/// # Examples
///
/// ```rust
/// use cilflow::{BlockId, ScopeTree};
///
/// let mut tree: ScopeTree = ScopeTree::new();
/// let a: BlockId = tree.add_block(tree.root(), ())?;
/// let b: BlockId = tree.add_block(tree.root(), ())?;
/// assert_ne!(a, b);
/// assert_eq!(a.index(), 0);
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Creates a new `BlockId` from a raw index value.
    ///
    /// Primarily intended for internal use and testing. Normal usage should obtain
    /// `BlockId` values from [`ScopeTree::add_block`](crate::blocks::ScopeTree::add_block).
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Returns the raw index value of this block identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A strongly-typed identifier for scopes within a scope tree.
///
/// `ScopeId` wraps a `usize` index into the scope arena. The root scope of every tree
/// is id 0; further scopes (nested bodies, protected regions, handler regions and their
/// sub-scopes) are assigned sequentially as they are created.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    /// Creates a new `ScopeId` from a raw index value.
    ///
    /// Primarily intended for internal use and testing. Normal usage should obtain
    /// `ScopeId` values from the scope-creation methods of
    /// [`ScopeTree`](crate::blocks::ScopeTree).
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        ScopeId(index)
    }

    /// Returns the raw index value of this scope identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One node at some level of a scope tree: either a basic block or a nested scope.
///
/// Scopes own an ordered sequence of `FlowNode` children, and the sorting engine
/// produces permutations of such sequences. Using a closed variant set instead of
/// runtime type inspection keeps every consumer an exhaustive `match`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowNode {
    /// A basic block.
    Block(BlockId),
    /// A nested scope (plain body, protected region, or handler region).
    Scope(ScopeId),
}

impl FlowNode {
    /// Returns the block id if this node is a block.
    #[must_use]
    pub const fn as_block(self) -> Option<BlockId> {
        match self {
            FlowNode::Block(block) => Some(block),
            FlowNode::Scope(_) => None,
        }
    }

    /// Returns the scope id if this node is a scope.
    #[must_use]
    pub const fn as_scope(self) -> Option<ScopeId> {
        match self {
            FlowNode::Block(_) => None,
            FlowNode::Scope(scope) => Some(scope),
        }
    }
}

impl From<BlockId> for FlowNode {
    fn from(block: BlockId) -> Self {
        FlowNode::Block(block)
    }
}

impl From<ScopeId> for FlowNode {
    fn from(scope: ScopeId) -> Self {
        FlowNode::Scope(scope)
    }
}

impl fmt::Debug for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNode::Block(block) => write!(f, "FlowNode::Block({})", block.0),
            FlowNode::Scope(scope) => write!(f, "FlowNode::Scope({})", scope.0),
        }
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowNode::Block(block) => write!(f, "{block}"),
            FlowNode::Scope(scope) => write!(f, "{scope}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_block_id_new_and_index() {
        let block = BlockId::new(42);
        assert_eq!(block.index(), 42);
    }

    #[test]
    fn test_block_id_ordering() {
        let mut ids = vec![BlockId::new(3), BlockId::new(1), BlockId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![BlockId::new(1), BlockId::new(2), BlockId::new(3)]);
    }

    #[test]
    fn test_id_formatting() {
        assert_eq!(format!("{}", BlockId::new(7)), "b7");
        assert_eq!(format!("{:?}", BlockId::new(7)), "BlockId(7)");
        assert_eq!(format!("{}", ScopeId::new(2)), "s2");
        assert_eq!(format!("{:?}", ScopeId::new(2)), "ScopeId(2)");
    }

    #[test]
    fn test_flow_node_accessors() {
        let block_node = FlowNode::from(BlockId::new(1));
        let scope_node = FlowNode::from(ScopeId::new(1));

        assert_eq!(block_node.as_block(), Some(BlockId::new(1)));
        assert_eq!(block_node.as_scope(), None);
        assert_eq!(scope_node.as_scope(), Some(ScopeId::new(1)));
        assert_eq!(scope_node.as_block(), None);

        // Same raw index, different variants
        assert_ne!(block_node, scope_node);
    }

    #[test]
    fn test_flow_node_hash() {
        let mut set: HashSet<FlowNode> = HashSet::new();
        set.insert(FlowNode::Block(BlockId::new(0)));
        set.insert(FlowNode::Scope(ScopeId::new(0)));
        set.insert(FlowNode::Block(BlockId::new(0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_flow_node_display() {
        assert_eq!(format!("{}", FlowNode::Block(BlockId::new(3))), "b3");
        assert_eq!(format!("{}", FlowNode::Scope(ScopeId::new(1))), "s1");
    }
}
