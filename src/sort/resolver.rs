//! Per-kind computation of the nodes a child can transfer control to.
//!
//! Targets are collected for one node at a time, as seen from the node's own level:
//! the caller resolves each collected target to the current scope's immediate child
//! (or drops it) with [`ScopeTree::child_of`]. The lists produced here are deliberate
//! about order, because the depth-first traversal visits them front to back and the
//! final emission order depends on it:
//!
//! - a block's successors are emitted in **reverse** of control-flow order, so the
//!   traversal explores the last-declared branch target first and the stack-based
//!   component collapse reproduces compiler-style fall-through sequencing;
//! - a protected region contributes its guarded blocks' targets first, then each
//!   attached handler (the handler node itself plus everything it can reach), in
//!   declaration order;
//! - a handler region contributes its blocks' targets, then its filter sub-scope and
//!   the filter's reach, then its body sub-scope and the body's reach.
//!
//! Duplicate entries are fine; the traversal ignores nodes it has already visited.

use crate::blocks::{BlockId, FlowNode, ScopeId, ScopeKind, ScopeTree};

/// Returns the ordered target list of one node, before scope-level resolution.
pub(crate) fn targets_of<N>(tree: &ScopeTree<N>, node: FlowNode) -> Vec<FlowNode> {
    let mut dest = Vec::new();
    match node {
        FlowNode::Block(block) => add_block_targets(tree, block, &mut dest),
        FlowNode::Scope(scope) => match &tree.scopes[scope.index()].kind {
            ScopeKind::Protected { handlers } => {
                add_contained_targets(tree, scope, &mut dest);
                for handler in handlers {
                    dest.push(FlowNode::Scope(*handler));
                    add_handler_targets(tree, *handler, &mut dest);
                }
            }
            ScopeKind::Handler { .. } => add_handler_targets(tree, scope, &mut dest),
            ScopeKind::Body => add_contained_targets(tree, scope, &mut dest),
        },
    }
    dest
}

/// Appends a block's successors in reverse of control-flow order.
fn add_block_targets<N>(tree: &ScopeTree<N>, block: BlockId, dest: &mut Vec<FlowNode>) {
    for target in tree.blocks[block.index()].targets().iter().rev() {
        dest.push(FlowNode::Block(*target));
    }
}

/// Appends the targets of every block transitively contained in a scope's children.
fn add_contained_targets<N>(tree: &ScopeTree<N>, scope: ScopeId, dest: &mut Vec<FlowNode>) {
    for block in tree.flatten_blocks(scope) {
        add_block_targets(tree, block, dest);
    }
}

fn add_handler_targets<N>(tree: &ScopeTree<N>, handler: ScopeId, dest: &mut Vec<FlowNode>) {
    add_contained_targets(tree, handler, dest);

    let ScopeKind::Handler { filter, body, .. } = &tree.scopes[handler.index()].kind else {
        return;
    };
    if let Some(filter) = *filter {
        dest.push(FlowNode::Scope(filter));
        add_contained_targets(tree, filter, dest);
    }
    dest.push(FlowNode::Scope(*body));
    add_contained_targets(tree, *body, dest);
}
