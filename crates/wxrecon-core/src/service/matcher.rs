//! Registry assignment pattern.
//!
//! The service bundle registers every page and component configuration
//! with an assignment of the form
//!
//! ```text
//! __wxAppCode__["pages/index/index.json"] = { ... };
//! ```
//!
//! often wrapped in helper calls. For each such assignment, every object
//! literal in the assignment's subtree that itself occupies a `Right` slot
//! is reported together with its exact source text.

use super::node::{NodeKind, Role, SyntaxNode};
use super::{MatchSender, ServiceMatch};
use crate::error::{Error, Result};
use crate::path::CONFIG_SUFFIX;
use tracing::{debug, warn};

/// Finds registry assignments in a service bundle syntax tree
#[derive(Debug, Clone)]
pub struct ServiceMatcher {
    registry: String,
}

impl ServiceMatcher {
    /// Creates a matcher for the given registry identifier
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// Returns the registry key if `node` is an assignment to
    /// `<registry>["<...>.json"]`
    fn registry_key<'t>(&self, node: &'t SyntaxNode) -> Option<&'t str> {
        if node.kind != NodeKind::Assignment {
            return None;
        }
        let left = node.child(&Role::Left)?;
        if left.kind != NodeKind::Member {
            return None;
        }
        match &left.child(&Role::Object)?.kind {
            NodeKind::Identifier(name) if *name == self.registry => {}
            _ => return None,
        }
        match &left.child(&Role::Property)?.kind {
            NodeKind::StringLiteral(key) if key.ends_with(CONFIG_SUFFIX) => Some(key.as_str()),
            _ => None,
        }
    }

    /// Collects every match in `tree`, in source order of discovery
    pub fn find(&self, tree: &SyntaxNode, source: &str) -> Vec<ServiceMatch> {
        let mut matches = Vec::new();
        for node in tree.walk() {
            let Some(key) = self.registry_key(node) else {
                continue;
            };
            for object in node
                .descendants()
                .filter(|n| n.kind == NodeKind::Object && n.role == Role::Right)
            {
                match source.get(object.span.clone()) {
                    Some(text) => matches.push(ServiceMatch::new(key, text)),
                    None => warn!(
                        "Span {:?} for {} is outside the program source",
                        object.span, key
                    ),
                }
            }
        }
        matches
    }

    /// Sends every match in `tree` to `tx`, returning the number sent
    pub fn scan(&self, tree: &SyntaxNode, source: &str, tx: &MatchSender) -> Result<usize> {
        let matches = self.find(tree, source);
        let count = matches.len();
        for m in matches {
            debug!("Service config match: {}", m.path);
            tx.send(m).map_err(|_| Error::ChannelClosed)?;
        }
        Ok(count)
    }
}
