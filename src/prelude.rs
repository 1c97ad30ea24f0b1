//! # cilflow Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! library. Import it to get quick access to everything needed to build a scope tree
//! and sort it.
//!
//! # Examples
//!
//! ```rust
//! use cilflow::prelude::*;
//!
//! let mut tree: ScopeTree = ScopeTree::new();
//! let entry = tree.add_block(tree.root(), ())?;
//! let exit = tree.add_block(tree.root(), ())?;
//! tree.add_edge(entry, exit)?;
//! assert_eq!(tree.linearize()?, vec![entry, exit]);
//! # Ok::<(), cilflow::Error>(())
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilflow operations
pub use crate::Error;

/// The result type used throughout cilflow
pub use crate::Result;

// ================================================================================================
// Graph Model
// ================================================================================================

/// The owning arena for one method body's blocks and scopes
pub use crate::blocks::ScopeTree;

/// Basic blocks and their typed identifiers
pub use crate::blocks::{Block, BlockId};

/// Scopes, scope kinds, handler clause flags, and scope identifiers
pub use crate::blocks::{HandlerFlags, Scope, ScopeId, ScopeKind};

/// A scope child: block or nested scope
pub use crate::blocks::FlowNode;

// ================================================================================================
// Sorting Engine
// ================================================================================================

/// Per-scope sorting and whole-method linearization
pub use crate::sort::{linearize, sort_scope};
