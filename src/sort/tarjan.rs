//! The component-based depth-first sorter for one scope level.
//!
//! Uses Tarjan's strongly connected components algorithm to find all SCCs among a
//! scope's children: depth-first visitation assigns discovery indices and low-link
//! values, and a node whose low-link equals its own discovery index is the root of a
//! complete component. Singleton components are emitted directly; multi-node
//! components are loops and get re-sorted recursively as their own sort problem,
//! with the member first reached from outside fixed as that recursion's entry.
//!
//! The local order is built back to front (components finalize in reverse
//! topological order), which combined with the reversed target lists from
//! [`resolver`](super::resolver) yields compiler-style fall-through sequencing.

use std::collections::HashMap;

use crate::{
    blocks::{FlowNode, ScopeId, ScopeTree},
    sort::{loops, resolver},
    Error::{MissingNode, SortState},
    Result,
};

/// Per-node traversal bookkeeping, created for one sort call and discarded with it.
///
/// Nothing is ever stored on the graph nodes themselves, so concurrent or repeated
/// sorts of the same tree cannot interfere with each other.
#[derive(Default)]
struct VisitState {
    /// Discovery index, `None` until the node is first visited.
    index: Option<usize>,
    /// Smallest discovery index reachable from this node's subtree and back edges.
    low: usize,
    /// Whether the node is currently on the component stack.
    on_stack: bool,
}

impl VisitState {
    fn discovered(&self) -> bool {
        self.index.is_some()
    }
}

/// Sorts one set of sibling nodes at a single scope level.
///
/// `valid` is the node set being ordered: a scope's immediate children at the top of
/// the recursion, or a loop's member set below it. With `skip_entry`, the first
/// element is treated as the designated entry: it is excluded from traversal (edges
/// into it become dead ends, so it can never be folded into a cycle with the rest)
/// and prepended to the result unchanged.
pub(crate) struct Sorter<'a, N> {
    tree: &'a ScopeTree<N>,
    scope: ScopeId,
    valid: Vec<FlowNode>,
    skip_entry: bool,
    entry: Option<FlowNode>,
    members: HashMap<FlowNode, usize>,
    state: Vec<VisitState>,
    stack: Vec<FlowNode>,
    emitted: Vec<FlowNode>,
    next_index: usize,
}

impl<'a, N> Sorter<'a, N> {
    pub(crate) fn new(
        tree: &'a ScopeTree<N>,
        scope: ScopeId,
        valid: Vec<FlowNode>,
        skip_entry: bool,
    ) -> Self {
        Self {
            tree,
            scope,
            valid,
            skip_entry,
            entry: None,
            members: HashMap::new(),
            state: Vec::new(),
            stack: Vec::new(),
            emitted: Vec::new(),
            next_index: 0,
        }
    }

    /// Runs the sort and returns the ordered node set.
    pub(crate) fn sort(mut self) -> Result<Vec<FlowNode>> {
        if self.valid.is_empty() {
            return Ok(Vec::new());
        }
        if self.skip_entry {
            self.entry = Some(self.valid[0]);
        }

        for &node in &self.valid {
            if Some(node) == self.entry {
                continue;
            }
            self.members.insert(node, self.state.len());
            self.state.push(VisitState::default());
        }

        let mut ordered = Vec::with_capacity(self.valid.len());

        // The entry's own successors are explored first, so they come before the
        // rest of the non-entry content. Scopes used as entry contribute nothing.
        if let Some(FlowNode::Block(entry)) = self.entry {
            for target in resolver::targets_of(self.tree, FlowNode::Block(entry)) {
                self.visit(target)?;
                ordered.append(&mut self.emitted);
            }
        }
        for root in 0..self.valid.len() {
            let node = self.valid[root];
            self.visit(node)?;
            ordered.append(&mut self.emitted);
        }

        if !self.stack.is_empty() {
            return Err(SortState(format!(
                "{} unfinished nodes left on the component stack",
                self.stack.len()
            )));
        }

        if let Some(entry) = self.entry {
            ordered.insert(0, entry);
        } else {
            ensure_first(&mut ordered, self.valid[0])?;
        }
        Ok(ordered)
    }

    /// Visits one node if it resolves to an unvisited member at this level.
    fn visit(&mut self, node: FlowNode) -> Result<()> {
        let Some(node) = self.tree.child_of(self.scope, node) else {
            return Ok(());
        };
        if Some(node) == self.entry {
            return Ok(());
        }
        let Some(&slot) = self.members.get(&node) else {
            return Ok(());
        };
        if self.state[slot].discovered() {
            return Ok(());
        }
        self.connect(node, slot)
    }

    /// The recursive heart of Tarjan's algorithm.
    fn connect(&mut self, node: FlowNode, slot: usize) -> Result<()> {
        if Some(node) == self.entry {
            return Err(SortState(format!(
                "designated entry {node} reached during traversal"
            )));
        }

        self.stack.push(node);
        let discovery = self.next_index;
        self.next_index += 1;
        {
            let state = &mut self.state[slot];
            state.index = Some(discovery);
            state.low = discovery;
            state.on_stack = true;
        }

        for target in resolver::targets_of(self.tree, node) {
            let Some(target) = self.tree.child_of(self.scope, target) else {
                continue;
            };
            if Some(target) == self.entry {
                continue;
            }
            let Some(&target_slot) = self.members.get(&target) else {
                continue;
            };

            if !self.state[target_slot].discovered() {
                self.connect(target, target_slot)?;
                self.state[slot].low = self.state[slot].low.min(self.state[target_slot].low);
            } else if self.state[target_slot].on_stack {
                // Standard Tarjan tie-break: the target's discovery index, not its low-link
                if let Some(target_index) = self.state[target_slot].index {
                    self.state[slot].low = self.state[slot].low.min(target_index);
                }
            }
        }

        if self.state[slot].low != discovery {
            return Ok(());
        }

        // This node roots a complete component: pop down to and including it
        let mut component = Vec::new();
        loop {
            let Some(popped) = self.stack.pop() else {
                return Err(MissingNode(format!(
                    "component root {node} not found on the component stack"
                )));
            };
            if let Some(&popped_slot) = self.members.get(&popped) {
                self.state[popped_slot].on_stack = false;
            }
            component.push(popped);
            if popped == node {
                break;
            }
        }

        if component.len() > 1 {
            // A genuine loop. Re-sort its members with the first-reached member as
            // the fixed entry, then move the likely condition check to the end of
            // the interior.
            component.reverse();
            let mut looped = Sorter::new(self.tree, self.scope, component, true).sort()?;
            loops::reorder_interior(self.tree, &mut looped[1..]);
            self.emitted.splice(0..0, looped);
        } else {
            self.emitted.insert(0, component[0]);
        }
        Ok(())
    }
}

/// Moves `declared` to the front of `ordered`, leaving all other positions alone.
///
/// Idempotent: an already-entry-first list is returned unchanged.
pub(crate) fn ensure_first(ordered: &mut Vec<FlowNode>, declared: FlowNode) -> Result<()> {
    if ordered.first() == Some(&declared) {
        return Ok(());
    }
    let Some(position) = ordered.iter().position(|&node| node == declared) else {
        return Err(MissingNode(format!(
            "declared first child {declared} absent from the sorted result"
        )));
    };
    ordered.remove(position);
    ordered.insert(0, declared);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BlockId;

    fn chain(count: usize) -> (ScopeTree, Vec<BlockId>) {
        let mut tree: ScopeTree = ScopeTree::new();
        let ids: Vec<BlockId> = (0..count)
            .map(|_| tree.add_block(tree.root(), ()).unwrap())
            .collect();
        for pair in ids.windows(2) {
            tree.add_edge(pair[0], pair[1]).unwrap();
        }
        (tree, ids)
    }

    fn sort_root(tree: &ScopeTree) -> Vec<FlowNode> {
        let children = tree.scope(tree.root()).unwrap().children().to_vec();
        Sorter::new(tree, tree.root(), children, false).sort().unwrap()
    }

    #[test]
    fn test_empty_input_sorts_to_empty() {
        let tree: ScopeTree = ScopeTree::new();
        assert!(sort_root(&tree).is_empty());
    }

    #[test]
    fn test_linear_chain_keeps_order() {
        let (tree, ids) = chain(3);
        let expected: Vec<FlowNode> = ids.iter().map(|&b| FlowNode::Block(b)).collect();
        assert_eq!(sort_root(&tree), expected);
    }

    #[test]
    fn test_diamond_orders_fall_through_first() {
        let mut tree: ScopeTree = ScopeTree::new();
        let a = tree.add_block(tree.root(), ()).unwrap();
        let b = tree.add_block(tree.root(), ()).unwrap();
        let c = tree.add_block(tree.root(), ()).unwrap();
        let d = tree.add_block(tree.root(), ()).unwrap();
        tree.add_edge(a, b).unwrap();
        tree.add_edge(a, c).unwrap();
        tree.add_edge(b, d).unwrap();
        tree.add_edge(c, d).unwrap();

        // The first-declared target of a reads as the fall-through and lands first
        assert_eq!(
            sort_root(&tree),
            vec![
                FlowNode::Block(a),
                FlowNode::Block(b),
                FlowNode::Block(c),
                FlowNode::Block(d),
            ]
        );
    }

    #[test]
    fn test_self_contained_loop_reorders_interior() {
        let mut tree: ScopeTree = ScopeTree::new();
        let a = tree.add_block(tree.root(), ()).unwrap();
        let b = tree.add_block(tree.root(), ()).unwrap();
        let c = tree.add_block(tree.root(), ()).unwrap();
        tree.add_edge(a, b).unwrap();
        tree.add_edge(b, c).unwrap();
        tree.add_edge(c, a).unwrap();

        // {a, b, c} is one component; a is fixed as the loop entry, and b (entered
        // from a, outside the interior {b, c}) moves to the interior's end
        assert_eq!(
            sort_root(&tree),
            vec![FlowNode::Block(a), FlowNode::Block(c), FlowNode::Block(b)]
        );
    }

    #[test]
    fn test_embedded_loop_stays_contiguous() {
        let mut tree: ScopeTree = ScopeTree::new();
        let pre = tree.add_block(tree.root(), ()).unwrap();
        let head = tree.add_block(tree.root(), ()).unwrap();
        let body = tree.add_block(tree.root(), ()).unwrap();
        let exit = tree.add_block(tree.root(), ()).unwrap();
        tree.add_edge(pre, head).unwrap();
        tree.add_edge(head, body).unwrap();
        tree.add_edge(body, head).unwrap();
        tree.add_edge(head, exit).unwrap();

        let sorted = sort_root(&tree);
        assert_eq!(sorted[0], FlowNode::Block(pre));
        assert_eq!(sorted.last(), Some(&FlowNode::Block(exit)));

        // The two loop members are adjacent
        let head_at = sorted.iter().position(|&n| n == FlowNode::Block(head)).unwrap();
        let body_at = sorted.iter().position(|&n| n == FlowNode::Block(body)).unwrap();
        assert_eq!(head_at.abs_diff(body_at), 1);
    }

    #[test]
    fn test_component_stack_drains() {
        // Two overlapping cycles stress the pop logic
        let mut tree: ScopeTree = ScopeTree::new();
        let ids: Vec<BlockId> = (0..5)
            .map(|_| tree.add_block(tree.root(), ()).unwrap())
            .collect();
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[1], ids[2]).unwrap();
        tree.add_edge(ids[2], ids[1]).unwrap();
        tree.add_edge(ids[2], ids[3]).unwrap();
        tree.add_edge(ids[3], ids[4]).unwrap();
        tree.add_edge(ids[4], ids[3]).unwrap();

        let sorted = sort_root(&tree);
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn test_sort_is_deterministic() {
        let mut tree: ScopeTree = ScopeTree::new();
        let ids: Vec<BlockId> = (0..6)
            .map(|_| tree.add_block(tree.root(), ()).unwrap())
            .collect();
        tree.add_edge(ids[0], ids[2]).unwrap();
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[1], ids[3]).unwrap();
        tree.add_edge(ids[2], ids[3]).unwrap();
        tree.add_edge(ids[3], ids[4]).unwrap();
        tree.add_edge(ids[4], ids[3]).unwrap();
        tree.add_edge(ids[4], ids[5]).unwrap();

        assert_eq!(sort_root(&tree), sort_root(&tree));
    }

    #[test]
    fn test_ensure_first_moves_entry() {
        let a = FlowNode::Block(BlockId::new(0));
        let b = FlowNode::Block(BlockId::new(1));
        let c = FlowNode::Block(BlockId::new(2));

        let mut ordered = vec![b, c, a];
        ensure_first(&mut ordered, a).unwrap();
        assert_eq!(ordered, vec![a, b, c]);
    }

    #[test]
    fn test_ensure_first_is_idempotent() {
        let a = FlowNode::Block(BlockId::new(0));
        let b = FlowNode::Block(BlockId::new(1));

        let mut ordered = vec![a, b];
        ensure_first(&mut ordered, a).unwrap();
        ensure_first(&mut ordered, a).unwrap();
        assert_eq!(ordered, vec![a, b]);
    }

    #[test]
    fn test_ensure_first_missing_entry_is_fatal() {
        let a = FlowNode::Block(BlockId::new(0));
        let b = FlowNode::Block(BlockId::new(1));

        let mut ordered = vec![b];
        assert!(ensure_first(&mut ordered, a).is_err());
    }
}
