//! The scope tree: the owning arena for one method body's blocks and scopes.

use std::fmt::Write;

use crate::{
    blocks::{Block, BlockId, FlowNode, HandlerFlags, Scope, ScopeId, ScopeKind},
    sort,
    Error::GraphError,
    Result,
};

/// The decoded basic-block graph of one method body, organized as a tree of scopes.
///
/// A `ScopeTree` owns every block and scope of the method. The root scope is created
/// by [`new`](Self::new); blocks, nested scopes, protected regions, and handlers are
/// appended through the construction API, which maintains the structural invariants
/// the sorting engine relies on:
///
/// - target/source lists are mutually consistent (updated together by
///   [`add_edge`](Self::add_edge)),
/// - scope containment forms a tree (every node has exactly one parent),
/// - a handler's content lives in its filter/body sub-scopes, never directly in the
///   handler scope.
///
/// # Construction
///
/// ```rust
/// use cilflow::ScopeTree;
///
/// // if (..) { b } else { c }  followed by d
/// let mut tree: ScopeTree = ScopeTree::new();
/// let a = tree.add_block(tree.root(), ())?;
/// let b = tree.add_block(tree.root(), ())?;
/// let c = tree.add_block(tree.root(), ())?;
/// let d = tree.add_block(tree.root(), ())?;
/// tree.add_edge(a, b)?;
/// tree.add_edge(a, c)?;
/// tree.add_edge(b, d)?;
/// tree.add_edge(c, d)?;
///
/// let order = tree.linearize()?;
/// assert_eq!(order.first(), Some(&a));
/// assert_eq!(order.last(), Some(&d));
/// # Ok::<(), cilflow::Error>(())
/// ```
///
/// # Payloads
///
/// The type parameter `N` is the per-block payload (decoded instructions or any other
/// caller data). The ordering engine never reads it; `ScopeTree<()>` is the natural
/// choice when only the structure matters, and is the default.
///
/// # Sorting
///
/// The tree itself is read-only for the sorting engine: [`sorted_children`](Self::sorted_children)
/// and [`linearize`](Self::linearize) take `&self` and allocate their bookkeeping
/// per call, so repeated sorts of the same tree are independent and deterministic.
#[derive(Debug, Clone)]
pub struct ScopeTree<N = ()> {
    pub(crate) blocks: Vec<Block<N>>,
    pub(crate) scopes: Vec<Scope>,
    root: ScopeId,
}

impl<N> Default for ScopeTree<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> ScopeTree<N> {
    /// Creates an empty tree containing only the root (method-level) scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            scopes: vec![Scope::new(ScopeKind::Body, None)],
            root: ScopeId(0),
        }
    }

    /// Returns the root scope of the tree.
    #[must_use]
    pub const fn root(&self) -> ScopeId {
        self.root
    }

    /// Returns the number of blocks in the tree.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the number of scopes in the tree, including the root.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Returns the block with the given id, or `None` if the id is invalid.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block<N>> {
        self.blocks.get(id.index())
    }

    /// Returns a mutable reference to the block with the given id.
    ///
    /// Exposes the payload for in-place updates; edges and scope membership remain
    /// under the tree's control.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block<N>> {
        self.blocks.get_mut(id.index())
    }

    /// Returns the scope with the given id, or `None` if the id is invalid.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// Appends a new block to a scope's child sequence and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if `parent` does not exist or is a handler region
    /// (handler content belongs in the handler's filter/body sub-scope).
    pub fn add_block(&mut self, parent: ScopeId, data: N) -> Result<BlockId> {
        self.check_container(parent)?;
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block::new(data, parent));
        self.scopes[parent.index()].children.push(FlowNode::Block(id));
        Ok(id)
    }

    /// Appends a new plain nested scope to a scope's child sequence.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if `parent` does not exist or is a handler region.
    pub fn add_body_scope(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.check_container(parent)?;
        Ok(self.push_child_scope(ScopeKind::Body, parent))
    }

    /// Appends a new protected region to a scope's child sequence.
    ///
    /// The region starts without handlers; attach them with [`add_handler`](Self::add_handler).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if `parent` does not exist or is a handler region.
    pub fn add_protected(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.check_container(parent)?;
        Ok(self.push_child_scope(
            ScopeKind::Protected {
                handlers: Vec::new(),
            },
            parent,
        ))
    }

    /// Attaches a new handler region to a protected region and returns its id.
    ///
    /// The handler's body sub-scope is created along with it; retrieve it with
    /// [`handler_body`](Self::handler_body) and populate it like any other scope.
    /// Handlers apply in the order they are attached.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if `protected` does not exist or is not a protected
    /// region.
    pub fn add_handler(&mut self, protected: ScopeId, flags: HandlerFlags) -> Result<ScopeId> {
        match self.scopes.get(protected.index()) {
            Some(scope) if matches!(scope.kind, ScopeKind::Protected { .. }) => {}
            Some(_) => {
                return Err(GraphError(format!(
                    "scope {protected} is not a protected region"
                )))
            }
            None => return Err(GraphError(format!("scope {protected} does not exist"))),
        }

        let handler = ScopeId(self.scopes.len());
        let body = ScopeId(self.scopes.len() + 1);
        self.scopes.push(Scope::new(
            ScopeKind::Handler {
                flags,
                filter: None,
                body,
            },
            Some(protected),
        ));
        self.scopes.push(Scope::new(ScopeKind::Body, Some(handler)));
        self.scopes[handler.index()].children.push(FlowNode::Scope(body));

        if let ScopeKind::Protected { handlers } = &mut self.scopes[protected.index()].kind {
            handlers.push(handler);
        }
        Ok(handler)
    }

    /// Creates the filter sub-scope of a handler region and returns its id.
    ///
    /// The filter precedes the body in the handler's child sequence and in any
    /// linearized output.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if `handler` does not exist, is not a handler region,
    /// or already has a filter sub-scope.
    pub fn add_filter(&mut self, handler: ScopeId) -> Result<ScopeId> {
        match self.scopes.get(handler.index()) {
            Some(scope) => match &scope.kind {
                ScopeKind::Handler { filter: Some(_), .. } => {
                    return Err(GraphError(format!(
                        "handler {handler} already has a filter sub-scope"
                    )))
                }
                ScopeKind::Handler { .. } => {}
                _ => {
                    return Err(GraphError(format!(
                        "scope {handler} is not a handler region"
                    )))
                }
            },
            None => return Err(GraphError(format!("scope {handler} does not exist"))),
        }

        let filter = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(ScopeKind::Body, Some(handler)));
        let scope = &mut self.scopes[handler.index()];
        scope.children.insert(0, FlowNode::Scope(filter));
        if let ScopeKind::Handler { filter: slot, .. } = &mut scope.kind {
            *slot = Some(filter);
        }
        Ok(filter)
    }

    /// Returns the body sub-scope of a handler region.
    #[must_use]
    pub fn handler_body(&self, handler: ScopeId) -> Option<ScopeId> {
        match &self.scope(handler)?.kind {
            ScopeKind::Handler { body, .. } => Some(*body),
            _ => None,
        }
    }

    /// Returns the filter sub-scope of a handler region, if one exists.
    #[must_use]
    pub fn handler_filter(&self, handler: ScopeId) -> Option<ScopeId> {
        match &self.scope(handler)?.kind {
            ScopeKind::Handler { filter, .. } => *filter,
            _ => None,
        }
    }

    /// Records a control transfer from one block to another.
    ///
    /// Appends `to` to `from`'s target list and `from` to `to`'s source list, keeping
    /// the two mutually consistent. Targets accumulate in call order, which is the
    /// control-flow-emission order the sorting engine depends on. Parallel edges are
    /// allowed and counted separately.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if either block id does not exist.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<()> {
        if from.index() >= self.blocks.len() {
            return Err(GraphError(format!("block {from} does not exist")));
        }
        if to.index() >= self.blocks.len() {
            return Err(GraphError(format!("block {to} does not exist")));
        }
        self.blocks[from.index()].targets.push(to);
        self.blocks[to.index()].sources.push(from);
        Ok(())
    }

    /// Returns every block transitively contained in a scope's child sequence, in
    /// depth-first child order.
    ///
    /// A protected region's handlers are not part of its child sequence and are
    /// therefore not included; control routed into them is resolved separately.
    #[must_use]
    pub fn flatten_blocks(&self, scope: ScopeId) -> Vec<BlockId> {
        let mut blocks = Vec::new();
        self.collect_blocks(scope, &mut blocks);
        blocks
    }

    fn collect_blocks(&self, scope: ScopeId, blocks: &mut Vec<BlockId>) {
        let Some(scope) = self.scope(scope) else {
            return;
        };
        for child in &scope.children {
            match child {
                FlowNode::Block(block) => blocks.push(*block),
                FlowNode::Scope(nested) => self.collect_blocks(*nested, blocks),
            }
        }
    }

    /// Resolves an arbitrary node to the immediate child of `scope` that contains it.
    ///
    /// Walks the node's parent chain upward. Returns the node itself when it is
    /// already an immediate child, the containing child scope when the node lives
    /// deeper in the subtree, and `None` when the node is outside `scope` entirely
    /// (including `scope` itself).
    #[must_use]
    pub fn child_of(&self, scope: ScopeId, node: FlowNode) -> Option<FlowNode> {
        let mut current = node;
        loop {
            let parent = match current {
                FlowNode::Block(block) => Some(self.block(block)?.parent),
                FlowNode::Scope(nested) => self.scope(nested)?.parent,
            };
            match parent {
                Some(parent) if parent == scope => return Some(current),
                Some(parent) => current = FlowNode::Scope(parent),
                None => return None,
            }
        }
    }

    /// Sorts the immediate children of a scope into emission order.
    ///
    /// See [`sort::sort_scope`] for the ordering contract.
    ///
    /// # Errors
    ///
    /// Returns an error if `scope` does not exist or if a sorting invariant is
    /// violated.
    pub fn sorted_children(&self, scope: ScopeId) -> Result<Vec<FlowNode>> {
        sort::sort_scope(self, scope)
    }

    /// Produces a full emission order for every block of the method.
    ///
    /// See [`sort::linearize`] for the ordering contract.
    ///
    /// # Errors
    ///
    /// Returns an error if a sorting invariant is violated in any scope.
    pub fn linearize(&self) -> Result<Vec<BlockId>> {
        sort::linearize(self)
    }

    /// Generates a DOT format representation of this scope tree.
    ///
    /// Scopes are rendered as nested clusters, blocks as boxes, and control-flow
    /// edges as arrows; the method entry block is highlighted. The output can be
    /// rendered with Graphviz tools like `dot`.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph (e.g., method name)
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph ScopeTree {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    compound=true;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");

        let entry = self.scopes[self.root.index()]
            .children
            .first()
            .and_then(|node| node.as_block());
        self.render_scope(self.root, entry, &mut dot, 1);

        dot.push('\n');
        for (index, block) in self.blocks.iter().enumerate() {
            for target in &block.targets {
                let _ = writeln!(dot, "    b{index} -> b{};", target.index());
            }
        }

        dot.push_str("}\n");
        dot
    }

    fn render_scope(&self, scope: ScopeId, entry: Option<BlockId>, dot: &mut String, depth: usize) {
        let indent = "    ".repeat(depth);
        let current = &self.scopes[scope.index()];
        let label = match &current.kind {
            ScopeKind::Body => "scope",
            ScopeKind::Protected { .. } => "try",
            ScopeKind::Handler { flags, .. } => flags.clause_name(),
        };

        let _ = writeln!(dot, "{indent}subgraph cluster_s{} {{", scope.index());
        let _ = writeln!(dot, "{indent}    label=\"{label} {scope}\";");
        for child in &current.children {
            match child {
                FlowNode::Block(block) => {
                    let style = if Some(*block) == entry {
                        " [style=filled, fillcolor=lightgreen]"
                    } else {
                        ""
                    };
                    let _ = writeln!(dot, "{indent}    b{}{style};", block.index());
                }
                FlowNode::Scope(nested) => self.render_scope(*nested, entry, dot, depth + 1),
            }
        }
        for handler in current.handlers() {
            self.render_scope(*handler, entry, dot, depth + 1);
        }
        let _ = writeln!(dot, "{indent}}}");
    }

    fn check_container(&self, parent: ScopeId) -> Result<()> {
        match self.scopes.get(parent.index()) {
            Some(scope) if matches!(scope.kind, ScopeKind::Handler { .. }) => Err(GraphError(
                format!("scope {parent} is a handler region; use its filter or body sub-scope"),
            )),
            Some(_) => Ok(()),
            None => Err(GraphError(format!("scope {parent} does not exist"))),
        }
    }

    fn push_child_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, Some(parent)));
        self.scopes[parent.index()].children.push(FlowNode::Scope(id));
        id
    }
}

/// Escapes a string for safe use in DOT format labels.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}
