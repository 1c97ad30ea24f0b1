//! Scope representation: method bodies, protected regions, and exception handlers.
//!
//! A scope owns an ordered sequence of children (blocks and nested scopes) and
//! represents one level of exception-handling nesting. Scope containment forms a
//! tree: every block belongs to exactly one innermost scope, and no scope is shared.

use bitflags::bitflags;

use crate::blocks::{FlowNode, ScopeId};

bitflags! {
    /// Exception handler flags defining the type of exception handling clause.
    ///
    /// These follow the ECMA-335 clause encoding, so values decoded from a method
    /// body's exception-handler table can be carried over unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HandlerFlags: u16 {
        /// A typed exception clause (catch).
        const EXCEPTION = 0x0000;

        /// An exception filter and handler clause.
        ///
        /// The filter code runs first to decide whether the handler applies.
        const FILTER = 0x0001;

        /// A finally clause.
        const FINALLY = 0x0002;

        /// A fault clause (finally that executes only on exception).
        const FAULT = 0x0004;
    }
}

impl HandlerFlags {
    /// Returns the conventional source-level name of this clause kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilflow::HandlerFlags;
    ///
    /// assert_eq!(HandlerFlags::EXCEPTION.clause_name(), "catch");
    /// assert_eq!(HandlerFlags::FINALLY.clause_name(), "finally");
    /// ```
    #[must_use]
    pub const fn clause_name(self) -> &'static str {
        if self.contains(HandlerFlags::FILTER) {
            "filter"
        } else if self.contains(HandlerFlags::FINALLY) {
            "finally"
        } else if self.contains(HandlerFlags::FAULT) {
            "fault"
        } else {
            "catch"
        }
    }
}

/// The kind of a scope, carrying the per-kind structure.
#[derive(Debug, Clone)]
pub enum ScopeKind {
    /// A plain block container: the top-level method scope, a handler's filter or
    /// body sub-scope, or any other nested grouping.
    Body,

    /// A guarded section with one or more attached handlers.
    ///
    /// Handlers are listed in declaration order. They are attached to the region but
    /// are not part of its ordered child sequence; control routed into them is
    /// resolved explicitly during sorting and linearization.
    Protected {
        /// Handler regions guarding this section, in declaration order.
        handlers: Vec<ScopeId>,
    },

    /// One catch/filter/finally/fault handler.
    ///
    /// A handler's content lives in its sub-scopes: an optional filter sub-scope
    /// (evaluated to decide whether the handler applies) followed by the body
    /// sub-scope (the executed handler code). The child sequence holds exactly
    /// those sub-scopes, filter first when present.
    Handler {
        /// The clause kind of this handler.
        flags: HandlerFlags,
        /// The filter sub-scope, if this is a filter clause.
        filter: Option<ScopeId>,
        /// The body sub-scope.
        body: ScopeId,
    },
}

/// One scope of a method body.
///
/// Owns an ordered sequence of immediate children, each either a block or a nested
/// scope. The first child of the top-level scope is the method's designated entry
/// and is guaranteed to come first in any sorted ordering.
#[derive(Debug, Clone)]
pub struct Scope {
    pub(crate) kind: ScopeKind,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<FlowNode>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
        }
    }

    /// Returns the kind of this scope.
    #[must_use]
    pub const fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    /// Returns the parent scope, or `None` for the root scope.
    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Returns the ordered immediate children of this scope.
    #[must_use]
    pub fn children(&self) -> &[FlowNode] {
        &self.children
    }

    /// Returns the handlers attached to this scope, in declaration order.
    ///
    /// Empty for scopes that are not protected regions.
    #[must_use]
    pub fn handlers(&self) -> &[ScopeId] {
        match &self.kind {
            ScopeKind::Protected { handlers } => handlers,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_flags_ecma_values() {
        assert_eq!(HandlerFlags::EXCEPTION.bits(), 0x0000);
        assert_eq!(HandlerFlags::FILTER.bits(), 0x0001);
        assert_eq!(HandlerFlags::FINALLY.bits(), 0x0002);
        assert_eq!(HandlerFlags::FAULT.bits(), 0x0004);
    }

    #[test]
    fn test_handler_flags_clause_names() {
        assert_eq!(HandlerFlags::EXCEPTION.clause_name(), "catch");
        assert_eq!(HandlerFlags::FILTER.clause_name(), "filter");
        assert_eq!(HandlerFlags::FINALLY.clause_name(), "finally");
        assert_eq!(HandlerFlags::FAULT.clause_name(), "fault");
    }

    #[test]
    fn test_scope_handlers_empty_for_body() {
        let scope = Scope::new(ScopeKind::Body, None);
        assert!(scope.handlers().is_empty());
        assert!(scope.children().is_empty());
        assert!(scope.parent().is_none());
    }
}
