//! The block-sorting engine: linearizes a scope tree into emission order.
//!
//! Obfuscators shuffle the basic blocks of a method body; after the control-flow
//! graph has been rebuilt, the blocks must be put back into an order a binary
//! writer can emit and a decompiler can read as structured code. This module
//! provides that ordering:
//!
//! - [`sort_scope`] permutes the immediate children of one scope so that the
//!   declared entry comes first, acyclic control flow reads top to bottom in
//!   fall-through order, and each loop forms one contiguous run with its likely
//!   condition-check block at the bottom (the shape `for`/`while`/`foreach`
//!   recognition expects).
//! - [`linearize`] applies [`sort_scope`] to every scope of the tree and expands
//!   protected regions and their handlers into one flat block order for the whole
//!   method.
//!
//! The engine reads the tree without mutating it, allocates all bookkeeping per
//! call, and is fully deterministic: sorting the same tree twice yields identical
//! output. The produced ordering is a permutation of the input nodes — nothing is
//! dropped, nothing duplicated — which is the contract any later adjustment pass
//! (e.g. a forward scan tightening branch placement before final emission) builds
//! on.
//!
//! # Examples
//!
//! ```rust
//! use cilflow::{sort, ScopeTree};
//!
//! // entry -> cond; loop { cond -> work -> cond }; cond -> done
//! let mut tree: ScopeTree = ScopeTree::new();
//! let entry = tree.add_block(tree.root(), ())?;
//! let cond = tree.add_block(tree.root(), ())?;
//! let work = tree.add_block(tree.root(), ())?;
//! let done = tree.add_block(tree.root(), ())?;
//! tree.add_edge(entry, cond)?;
//! tree.add_edge(cond, work)?;
//! tree.add_edge(work, cond)?;
//! tree.add_edge(cond, done)?;
//!
//! let order = sort::linearize(&tree)?;
//! assert_eq!(order, vec![entry, cond, work, done]);
//! # Ok::<(), cilflow::Error>(())
//! ```

mod loops;
mod resolver;
mod tarjan;

use crate::{
    blocks::{BlockId, FlowNode, ScopeId, ScopeKind, ScopeTree},
    Error::GraphError,
    Result,
};

/// Sorts the immediate children of a scope into emission order.
///
/// Returns a permutation of the scope's child sequence (blocks and nested region
/// nodes) satisfying:
///
/// - **entry first**: the declared first child leads the result;
/// - **fall-through order**: outside of loops, a node's successors tend to follow
///   it, with the first-declared successor placed directly after it;
/// - **loops contiguous**: the members of each strongly connected component form
///   one uninterrupted run, internally ordered with the likely condition check at
///   the end.
///
/// # Errors
///
/// Returns [`GraphError`] if `scope` does not exist, and
/// [`SortState`](crate::Error::SortState) / [`MissingNode`](crate::Error::MissingNode)
/// if an internal invariant is violated. A failed sort yields no usable order.
pub fn sort_scope<N>(tree: &ScopeTree<N>, scope: ScopeId) -> Result<Vec<FlowNode>> {
    let children = tree
        .scope(scope)
        .ok_or_else(|| GraphError(format!("scope {scope} does not exist")))?
        .children()
        .to_vec();
    tarjan::Sorter::new(tree, scope, children, false).sort()
}

/// Produces a full emission order for every block of the method.
///
/// Sorts each scope with [`sort_scope`], then expands nested regions in place:
/// a protected region contributes its own sorted content followed by its handlers
/// in declaration order, each handler contributing its filter sub-scope (when
/// present) before its body sub-scope.
///
/// The result is a permutation of all blocks in the tree.
///
/// # Errors
///
/// Propagates any error from sorting the involved scopes.
pub fn linearize<N>(tree: &ScopeTree<N>) -> Result<Vec<BlockId>> {
    let mut order = Vec::with_capacity(tree.block_count());
    emit_scope(tree, tree.root(), &mut order)?;
    Ok(order)
}

fn emit_scope<N>(tree: &ScopeTree<N>, scope: ScopeId, order: &mut Vec<BlockId>) -> Result<()> {
    for node in sort_scope(tree, scope)? {
        match node {
            FlowNode::Block(block) => order.push(block),
            FlowNode::Scope(nested) => emit_region(tree, nested, order)?,
        }
    }
    Ok(())
}

fn emit_region<N>(tree: &ScopeTree<N>, region: ScopeId, order: &mut Vec<BlockId>) -> Result<()> {
    emit_scope(tree, region, order)?;
    for handler in tree.scopes[region.index()].handlers() {
        if let ScopeKind::Handler { filter, body, .. } = &tree.scopes[handler.index()].kind {
            if let Some(filter) = *filter {
                emit_scope(tree, filter, order)?;
            }
            emit_scope(tree, *body, order)?;
        }
    }
    Ok(())
}
