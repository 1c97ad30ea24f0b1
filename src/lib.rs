// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # cilflow
//!
//! Control-flow reconstruction for .NET method bodies: scope-aware basic block
//! reordering for deobfuscation tooling and binary re-emission.
//!
//! Obfuscators scramble the basic blocks of a method so that the emitted order has
//! nothing to do with the structure of the code. Once a deobfuscator has rebuilt the
//! control-flow graph — blocks, branch edges, and the try/filter/handler nesting —
//! the blocks still need to be put back into a *linear* order before the method can
//! be written out or fed to a decompiler. `cilflow` computes that order.
//!
//! ## What it does
//!
//! Given a [`ScopeTree`] (the decoded block graph of one method body, organized into
//! exception-handling scopes), the sorting engine produces an ordering in which:
//!
//! - the method's entry block comes first,
//! - acyclic control flow reads top to bottom in fall-through order,
//! - every loop is a single contiguous run with its likely condition-check block at
//!   the bottom, the shape decompilers expect when recognizing `for`/`while`/
//!   `foreach` statements,
//! - protected regions stay intact, each followed by its handlers in declaration
//!   order.
//!
//! The engine is a strongly-connected-components sort (Tarjan's algorithm) adapted
//! to a hierarchical graph: children of one scope are ordered at a time, cross-scope
//! edges are resolved to the containing child region, and each discovered loop is
//! re-sorted recursively as its own problem with the loop entry held fixed.
//!
//! ## Quick Start
//!
//! ```rust
//! use cilflow::ScopeTree;
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
//! assert_eq!(tree.linearize()?, vec![entry, cond, work, done]);
//! # Ok::<(), cilflow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`blocks`] - the graph model: [`blocks::Block`], [`blocks::Scope`], and the
//!   owning [`ScopeTree`] arena with its construction API
//! - [`sort`] - the ordering engine: [`sort::sort_scope`] for one scope level and
//!   [`sort::linearize`] for a whole method
//! - [`prelude`] - convenient re-exports of the commonly used types
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Scope of the crate
//!
//! `cilflow` orders a *given* set of blocks. It does not decode instructions, never
//! mutates block contents, and never invents or removes blocks; building the graph
//! (and any later emission-time adjustment of the produced order) belongs to the
//! embedding tool. Block payloads are generic and opaque, so any decoder's output
//! can ride along.
//!
//! ## Determinism
//!
//! Sorting is pure and deterministic: the tree is read-only during a sort, all
//! traversal state is allocated per call, and every tie in the ordering rules is
//! broken by declared child order. Identical input yields identical output, which
//! downstream passes and tests rely on.

pub mod blocks;
pub mod prelude;
pub mod sort;

mod error;

pub use blocks::{Block, BlockId, FlowNode, HandlerFlags, Scope, ScopeId, ScopeKind, ScopeTree};
pub use error::{Error, Result};
