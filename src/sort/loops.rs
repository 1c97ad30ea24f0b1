//! Loop-interior reordering.
//!
//! Some popular decompilers produce bad output unless the loop condition checker
//! block sits at the end of the loop body. Eg., they may emit a while loop when it's
//! really a for/foreach loop. After a loop's interior has been sorted, the block most
//! likely to be the condition check is relocated to the end of the interior.

use std::collections::HashSet;

use crate::blocks::{BlockId, FlowNode, ScopeTree};

/// Moves the likely loop-start block to the end of an already-sorted loop interior.
///
/// The interior excludes the loop's entry; the entry stays fixed at the front of the
/// loop and is never relocated. When no interior block has a predecessor outside the
/// interior, the order is left unchanged.
pub(crate) fn reorder_interior<N>(tree: &ScopeTree<N>, interior: &mut [FlowNode]) {
    if let Some(position) = loop_start_position(tree, interior) {
        interior[position..].rotate_left(1);
    }
}

/// Finds the interior block with the most predecessors outside the interior.
///
/// Candidates are scanned in the interior's own sorted order and a strictly greater
/// count is required to displace an earlier candidate, so ties keep the first block
/// encountered. Each incoming edge counts separately.
fn loop_start_position<N>(tree: &ScopeTree<N>, interior: &[FlowNode]) -> Option<usize> {
    let members: HashSet<BlockId> = interior
        .iter()
        .filter_map(|node| node.as_block())
        .collect();

    let mut position = None;
    let mut best = 0;
    for (candidate, node) in interior.iter().enumerate() {
        let Some(block) = node.as_block() else {
            continue;
        };
        let external = tree.blocks[block.index()]
            .sources()
            .iter()
            .filter(|source| !members.contains(source))
            .count();
        if external > best {
            best = external;
            position = Some(candidate);
        }
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a tree whose root holds `count` blocks with no edges.
    fn blocks(count: usize) -> (ScopeTree, Vec<BlockId>) {
        let mut tree: ScopeTree = ScopeTree::new();
        let ids = (0..count)
            .map(|_| tree.add_block(tree.root(), ()).unwrap())
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_no_external_predecessor_keeps_order() {
        let (mut tree, ids) = blocks(3);
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[1], ids[2]).unwrap();
        tree.add_edge(ids[2], ids[0]).unwrap();

        let mut interior: Vec<FlowNode> = ids.iter().map(|&b| FlowNode::Block(b)).collect();
        let before = interior.clone();
        reorder_interior(&tree, &mut interior);
        assert_eq!(interior, before);
    }

    #[test]
    fn test_externally_entered_block_moves_to_end() {
        let (mut tree, ids) = blocks(4);
        // ids[0] enters the loop {1, 2, 3} at ids[1]
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[1], ids[2]).unwrap();
        tree.add_edge(ids[2], ids[3]).unwrap();
        tree.add_edge(ids[3], ids[1]).unwrap();

        let mut interior = vec![
            FlowNode::Block(ids[1]),
            FlowNode::Block(ids[2]),
            FlowNode::Block(ids[3]),
        ];
        reorder_interior(&tree, &mut interior);
        assert_eq!(
            interior,
            vec![
                FlowNode::Block(ids[2]),
                FlowNode::Block(ids[3]),
                FlowNode::Block(ids[1]),
            ]
        );
    }

    #[test]
    fn test_highest_external_count_wins() {
        let (mut tree, ids) = blocks(5);
        // Two outside blocks target ids[3]; one targets ids[2]
        tree.add_edge(ids[0], ids[2]).unwrap();
        tree.add_edge(ids[0], ids[3]).unwrap();
        tree.add_edge(ids[1], ids[3]).unwrap();
        tree.add_edge(ids[2], ids[3]).unwrap();
        tree.add_edge(ids[3], ids[4]).unwrap();
        tree.add_edge(ids[4], ids[2]).unwrap();

        let mut interior = vec![
            FlowNode::Block(ids[2]),
            FlowNode::Block(ids[3]),
            FlowNode::Block(ids[4]),
        ];
        reorder_interior(&tree, &mut interior);
        assert_eq!(
            interior,
            vec![
                FlowNode::Block(ids[2]),
                FlowNode::Block(ids[4]),
                FlowNode::Block(ids[3]),
            ]
        );
    }

    #[test]
    fn test_tie_keeps_first_in_sorted_order() {
        let (mut tree, ids) = blocks(4);
        // One external edge into ids[1] and one into ids[2]
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[0], ids[2]).unwrap();
        tree.add_edge(ids[1], ids[2]).unwrap();
        tree.add_edge(ids[2], ids[1]).unwrap();
        let _ = ids[3];

        let mut interior = vec![FlowNode::Block(ids[2]), FlowNode::Block(ids[1])];
        reorder_interior(&tree, &mut interior);
        // ids[2] came first in the sorted interior and stays the winner
        assert_eq!(
            interior,
            vec![FlowNode::Block(ids[1]), FlowNode::Block(ids[2])]
        );
    }

    #[test]
    fn test_parallel_external_edges_count_separately() {
        let (mut tree, ids) = blocks(3);
        // Two parallel edges into ids[2], one into ids[1]
        tree.add_edge(ids[0], ids[1]).unwrap();
        tree.add_edge(ids[0], ids[2]).unwrap();
        tree.add_edge(ids[0], ids[2]).unwrap();
        tree.add_edge(ids[1], ids[2]).unwrap();
        tree.add_edge(ids[2], ids[1]).unwrap();

        let mut interior = vec![FlowNode::Block(ids[2]), FlowNode::Block(ids[1])];
        reorder_interior(&tree, &mut interior);
        // ids[2] has two external edges against ids[1]'s one
        assert_eq!(
            interior,
            vec![FlowNode::Block(ids[1]), FlowNode::Block(ids[2])]
        );
    }
}
