//! Service bundle configuration recovery.
//!
//! The compiled service bundle re-registers each page's and component's
//! configuration as an object literal. Those literals keep formatting and
//! numeric forms the manifest's `page` table has lost, so they are
//! preferred whenever they can be found.
//!
//! ## Data flow
//!
//! 1. An external parser builds a [`SyntaxNode`] tree ([`ProgramParser`])
//! 2. [`ServiceMatcher`] pushes every registry literal into a channel
//! 3. [`merge`] drains the channel, then falls back to the page table
//!
//! Channel close is the completion signal; the fallback flush never starts
//! before the last match has been written.

pub mod matcher;
pub mod merger;
pub mod node;

use crate::error::Result;
use tokio::sync::mpsc;
use tracing::debug;

pub use matcher::ServiceMatcher;
pub use merger::{merge, MergeStats};
pub use node::{NodeKind, ProgramParser, Role, SyntaxNode};

/// One configuration literal recovered from the service bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMatch {
    /// Registry key, e.g. `pages/index/index.json`
    pub path: String,
    /// Exact source text of the object literal
    pub source: String,
}

impl ServiceMatch {
    /// Creates a new match
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Producer half of the match stream
pub type MatchSender = mpsc::UnboundedSender<ServiceMatch>;

/// Consumer half of the match stream
pub type MatchReceiver = mpsc::UnboundedReceiver<ServiceMatch>;

/// Creates a match stream
pub fn channel() -> (MatchSender, MatchReceiver) {
    mpsc::unbounded_channel()
}

/// Parses `source` with `parser` and scans it for registry literals.
///
/// The returned receiver already holds every match and is closed.
pub fn scan_source(
    parser: &dyn ProgramParser,
    source: &str,
    registry: &str,
) -> Result<MatchReceiver> {
    let tree = parser.parse(source)?;
    let (tx, rx) = channel();
    let count = ServiceMatcher::new(registry).scan(&tree, source, &tx)?;
    debug!("Scanned service source: {} config literals", count);
    Ok(rx)
}
