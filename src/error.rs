use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is either a construction-time misuse of the graph model or a violated
/// internal invariant of the sorting engine. The sorter is deterministic and pure, so a
/// failed sort reproduces identically on retry; callers must treat sort failures as fatal
/// for the method body being processed and must not consume partial output.
///
/// # Error Categories
///
/// ## Model Construction Errors
/// - [`Error::GraphError`] - Invalid node id, wrong scope kind for an operation, or a
///   duplicate filter sub-scope
///
/// ## Sorting Invariant Violations
/// - [`Error::SortState`] - The traversal stack or the designated-entry exclusion was
///   found in an impossible state
/// - [`Error::MissingNode`] - A node the algorithm is told must exist could not be found
///
/// # Examples
///
/// ```rust
/// use cilflow::{Error, ScopeTree};
///
/// let mut tree: ScopeTree = ScopeTree::new();
/// let a = tree.add_block(tree.root(), ())?;
///
/// // Wiring an edge to a block that does not exist is a construction error
/// match tree.add_edge(a, cilflow::BlockId::new(99)) {
///     Err(Error::GraphError(message)) => eprintln!("rejected: {}", message),
///     other => panic!("expected a graph error, got {:?}", other),
/// }
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The graph model was used inconsistently during construction.
    ///
    /// Raised when an operation references a block or scope id that does not exist in
    /// the tree, when a node is attached to a scope kind that cannot hold it (e.g. a
    /// block added directly to a handler region instead of its filter/body sub-scope),
    /// or when a handler is given a second filter sub-scope.
    #[error("Graph construction error - {0}")]
    GraphError(String),

    /// The sorting traversal reached an inconsistent state.
    ///
    /// Raised when the component stack is non-empty after the traversal believes it has
    /// finished, or when a designated-entry node is visited even though it was excluded
    /// from traversal. Both indicate a bug in target resolution or an upstream violation
    /// of the scope-tree invariants, not a property of the input method.
    #[error("Sort state corrupted - {0}")]
    SortState(String),

    /// A node that must be present could not be located.
    ///
    /// Raised when the declared first child of a scope is absent from the sorted result
    /// during the entry fix-up, or when a component pop exhausts the traversal stack
    /// before reaching the component root.
    #[error("Missing required node - {0}")]
    MissingNode(String),
}

/// Specialized [`Result`](std::result::Result) type for this crate, using [`Error`] as the
/// error variant.
pub type Result<T> = std::result::Result<T, Error>;
