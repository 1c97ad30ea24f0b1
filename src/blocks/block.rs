//! Basic block representation.

use crate::blocks::{BlockId, ScopeId};

/// A basic block: a straight-line run of instructions with explicit successor and
/// predecessor edges.
///
/// The payload `N` carries whatever the embedding tool associates with the block
/// (decoded instructions, offsets, annotations). The ordering engine never inspects
/// or mutates it; blocks are ordered purely by their edges and scope membership.
///
/// Target and source lists are kept mutually consistent by
/// [`ScopeTree::add_edge`](crate::blocks::ScopeTree::add_edge): block `B` appears in
/// `A`'s sources exactly as often as `A` appears in `B`'s targets. Targets are stored
/// in control-flow-emission order (fall-through first, branch targets after, switch
/// cases in case order); sources carry no ordering guarantee.
#[derive(Debug, Clone)]
pub struct Block<N> {
    /// Caller-owned block contents, opaque to the ordering engine.
    pub(crate) data: N,
    /// Successor blocks in control-flow-emission order.
    pub(crate) targets: Vec<BlockId>,
    /// Predecessor blocks, one entry per incoming edge.
    pub(crate) sources: Vec<BlockId>,
    /// The innermost scope containing this block.
    pub(crate) parent: ScopeId,
}

impl<N> Block<N> {
    pub(crate) fn new(data: N, parent: ScopeId) -> Self {
        Self {
            data,
            targets: Vec::new(),
            sources: Vec::new(),
            parent,
        }
    }

    /// Returns a reference to the block's payload.
    #[must_use]
    pub fn data(&self) -> &N {
        &self.data
    }

    /// Returns a mutable reference to the block's payload.
    ///
    /// Only the payload is exposed mutably; edges and scope membership stay under the
    /// control of the owning [`ScopeTree`](crate::blocks::ScopeTree).
    pub fn data_mut(&mut self) -> &mut N {
        &mut self.data
    }

    /// Returns the successor blocks in control-flow-emission order.
    #[must_use]
    pub fn targets(&self) -> &[BlockId] {
        &self.targets
    }

    /// Returns the predecessor blocks, one entry per incoming edge.
    #[must_use]
    pub fn sources(&self) -> &[BlockId] {
        &self.sources
    }

    /// Returns the innermost scope containing this block.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.parent
    }
}
