//! Minimal syntax node model of the service bundle.
//!
//! Building the tree is the job of an external JavaScript parser, plugged
//! in through [`ProgramParser`]. The model only distinguishes the node
//! kinds the registry pattern looks at; everything else is `Other`.

use crate::error::Result;
use std::ops::Range;

/// Kind of a syntax node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `left = right`
    Assignment,
    /// `object[property]` or `object.property`
    Member,
    /// A bare identifier
    Identifier(String),
    /// A string literal, already unescaped
    StringLiteral(String),
    /// An object literal `{ ... }`
    Object,
    /// A call expression
    Call,
    /// Any other node, tagged with the parser's type name
    Other(String),
}

/// Slot a node occupies in its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// The tree root
    Root,
    /// Left operand of an assignment or binary expression
    Left,
    /// Right operand of an assignment or binary expression
    Right,
    /// Object of a member expression
    Object,
    /// Property of a member expression
    Property,
    /// Callee of a call expression
    Callee,
    /// Argument of a call expression
    Argument,
    /// Any other slot, tagged with the parser's key name
    Other(String),
}

/// One node of the service bundle's syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// What the node is
    pub kind: NodeKind,
    /// Where the node sits in its parent
    pub role: Role,
    /// Byte range of the node in the program source
    pub span: Range<usize>,
    /// Child nodes in source order
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Creates a root-role node without children
    pub fn new(kind: NodeKind, span: Range<usize>) -> Self {
        Self {
            kind,
            role: Role::Root,
            span,
            children: Vec::new(),
        }
    }

    /// Appends `child` in the given role
    pub fn with_child(mut self, role: Role, mut child: SyntaxNode) -> Self {
        child.role = role;
        self.children.push(child);
        self
    }

    /// First child in the given role
    pub fn child(&self, role: &Role) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| &c.role == role)
    }

    /// Pre-order iterator over this node and all its descendants
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Pre-order iterator over descendants only
    pub fn descendants(&self) -> Walk<'_> {
        Walk {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order traversal returned by [`SyntaxNode::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Seam for the external JavaScript parser
pub trait ProgramParser: Send + Sync {
    /// Parse program source into a syntax tree with byte spans
    fn parse(&self, source: &str) -> Result<SyntaxNode>;
}
