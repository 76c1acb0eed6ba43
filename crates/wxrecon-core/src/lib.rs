//! # wxrecon-core
//!
//! A library for reconstructing the declarative configuration of unpacked
//! mini-program packages.
//!
//! This crate provides the core functionality for:
//! - Rebuilding `app.json` from the runtime-registered manifest
//! - Re-linking tab-bar icons that were inlined as base64 data
//! - Resolving the page/component usage graph
//! - Recovering per-page configuration literals from the service bundle
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`manifest`]: Root manifest ingest and transformation
//! - [`service`]: Service bundle pattern matching and merge
//! - [`output`]: Output trees and the write-once sink
//! - [`parser`]: Run orchestration
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use wxrecon_core::{channel, AppConfigParser, FsOutputTree, WriteOnceSink};
//!
//! # async fn run() -> wxrecon_core::Result<()> {
//! let mut parser = AppConfigParser::new();
//! parser.set_sources(std::fs::read_to_string("app-config.json").unwrap_or_default());
//! parser.set_service_source(std::fs::read_to_string("app-service.js").unwrap_or_default());
//!
//! let mut sink = WriteOnceSink::new(FsOutputTree::new("./out"));
//! let (tx, rx) = channel();
//! // hand `tx` to the syntax tree scanner, then drop it when done
//! drop(tx);
//! let summary = parser.parse(&mut sink, rx).await?;
//! println!("{} pages", summary.pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Extensibility
//!
//! - [`OutputTree`]: Customize where reconstructed files go
//! - [`ProgramParser`]: Plug in a JavaScript parser for the service bundle
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod path;
pub mod service;

// Re-export primary types for convenience
pub use config::{DefaultPolicy, ParserConfig};
pub use error::{Error, Result};
pub use manifest::{Manifest, PageEntry, PageTable};
pub use output::{Content, FsOutputTree, MemoryOutputTree, OutputTree, WriteOnceSink};
pub use parser::{AppConfigParser, RunState, RunSummary};
pub use path::PageKey;
pub use service::{channel, ProgramParser, ServiceMatch, ServiceMatcher, SyntaxNode};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
