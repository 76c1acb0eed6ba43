//! Reconstruction run orchestration.
//!
//! [`AppConfigParser`] drives one run over one package:
//!
//! ```text
//! Idle -> SyncPhase -> AsyncPhase -> Done
//!             |             |
//!             +---> Fatal <-+
//! ```
//!
//! The synchronous phase rebuilds `app.json` from the manifest. The
//! asynchronous phase drains the service match stream and flushes the page
//! table. Any failure in either phase is reported as
//! [`Error::ParseFailed`]; files written before the failure stay written.

mod game;

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::manifest::{
    ext_config, order_entry_page, partition_subpackages, resolve_components, resolve_tab_bar,
    type_name, ComponentStats, ContentHashIndex, IconStats, Manifest, PageTable,
};
use crate::output::{Content, OutputTree, WriteOnceSink};
use crate::service::{merge, scan_source, MatchReceiver, MergeStats, ProgramParser};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Lifecycle of a parser instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Idle,
    /// Rebuilding the root manifest
    SyncPhase,
    /// Draining the service match stream
    AsyncPhase,
    /// Finished successfully
    Done,
    /// Aborted by an error
    Fatal,
}

/// What a run produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The package was a game package
    pub game: bool,
    /// Pages left in the root package
    pub pages: usize,
    /// Subpackages declared
    pub subpackages: usize,
    /// Whether `ext.json` was written
    pub ext_written: bool,
    /// Tab-bar icon resolution
    pub icons: IconStats,
    /// Component graph resolution
    pub components: ComponentStats,
    /// Service config merge
    pub merge: MergeStats,
}

/// Where the asynchronous phase gets its matches from
enum MatchSource<'p> {
    Stream(MatchReceiver),
    Program(&'p dyn ProgramParser),
}

/// Rebuilds the manifest and page configuration of one package
#[derive(Debug)]
pub struct AppConfigParser {
    config: ParserConfig,
    sources: Option<String>,
    service_source: Option<String>,
    is_game: bool,
    state: RunState,
}

impl Default for AppConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigParser {
    /// Creates a parser with default configuration
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            sources: None,
            service_source: None,
            is_game: false,
            state: RunState::Idle,
        }
    }

    /// Sets the raw manifest source text
    pub fn set_sources(&mut self, sources: impl Into<String>) {
        self.sources = Some(sources.into());
    }

    /// Sets the compiled service bundle source text
    pub fn set_service_source(&mut self, source: impl Into<String>) {
        self.service_source = Some(source.into());
    }

    /// Marks the package as a game package
    pub fn set_game(&mut self, is_game: bool) {
        self.is_game = is_game;
    }

    /// Returns the current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns the configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Runs reconstruction, taking service matches from `matches`.
    ///
    /// Resolves once the stream has closed and the page table has been
    /// flushed.
    pub async fn parse<T: OutputTree>(
        &mut self,
        sink: &mut WriteOnceSink<T>,
        matches: MatchReceiver,
    ) -> Result<RunSummary> {
        self.run(sink, MatchSource::Stream(matches)).await
    }

    /// Runs reconstruction, scanning the service source with `program`
    pub async fn parse_program<T: OutputTree>(
        &mut self,
        sink: &mut WriteOnceSink<T>,
        program: &dyn ProgramParser,
    ) -> Result<RunSummary> {
        self.run(sink, MatchSource::Program(program)).await
    }

    async fn run<T: OutputTree>(
        &mut self,
        sink: &mut WriteOnceSink<T>,
        matches: MatchSource<'_>,
    ) -> Result<RunSummary> {
        if self.state != RunState::Idle {
            return Err(Error::AlreadyRun);
        }
        let result = self.run_phases(sink, matches).await;
        self.state = match result {
            Ok(_) => RunState::Done,
            Err(_) => RunState::Fatal,
        };
        let summary = result.map_err(Error::parse_failed)?;
        info!(
            "Reconstruction complete: {} pages, {} subpackages, {} streamed configs, {} fallback configs",
            summary.pages, summary.subpackages, summary.merge.streamed, summary.merge.fallback
        );
        Ok(summary)
    }

    async fn run_phases<T: OutputTree>(
        &mut self,
        sink: &mut WriteOnceSink<T>,
        matches: MatchSource<'_>,
    ) -> Result<RunSummary> {
        self.state = RunState::SyncPhase;
        let sources = self
            .sources
            .as_deref()
            .ok_or(Error::MissingManifestSource)?;

        if self.is_game {
            let subpackages = game::parse_game(&self.config, sources, sink)?;
            return Ok(RunSummary {
                game: true,
                subpackages,
                ..RunSummary::default()
            });
        }

        let (table, mut summary) = build_app_json(&self.config, sources, sink)?;

        let service_source = self
            .service_source
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingServiceSource)?;
        let matches = match matches {
            MatchSource::Stream(rx) => rx,
            MatchSource::Program(program) => {
                scan_source(program, service_source, &self.config.registry_identifier)?
            }
        };

        self.state = RunState::AsyncPhase;
        debug!("Entering service merge over {} page entries", table.len());
        summary.merge = merge(sink, &table, matches).await?;
        Ok(summary)
    }
}

/// Synchronous phase: consume the manifest and write `app.json`.
///
/// Returns the resolved page table for the merge phase.
fn build_app_json<T: OutputTree>(
    config: &ParserConfig,
    source: &str,
    sink: &mut WriteOnceSink<T>,
) -> Result<(PageTable, RunSummary)> {
    let mut summary = RunSummary::default();
    let mut manifest = Manifest::parse(source, config.default_policy)?;

    let entry_page_path = manifest.take_string("entryPagePath")?;
    let mut pages = manifest
        .take_string_list("pages")?
        .ok_or_else(|| Error::malformed("pages", "missing page list"))?;
    let global = manifest.take("global");

    match &entry_page_path {
        Some(entry) => {
            order_entry_page(&mut pages, entry);
        }
        None => debug!("No entryPagePath, keeping page order"),
    }

    let mut sub_packages = manifest.take("subPackages");
    if let Some(value) = sub_packages.as_mut() {
        let Value::Array(descriptors) = value else {
            return Err(Error::malformed("subPackages", "expected an array"));
        };
        partition_subpackages(&mut pages, descriptors)?;
        summary.subpackages = descriptors.len();
        info!("Detected {} subpackages", summary.subpackages);
    }

    let ext_appid = manifest.take("extAppid");
    let ext = manifest.take("ext");
    if let Some(body) = ext_config(ext_appid, ext) {
        summary.ext_written = sink.save(&config.ext_json, Content::Json(body))?;
        info!("Ext config saved to {}", config.ext_json);
    }

    let mut tab_bar = manifest.take("tabBar");
    if let Some(tab_bar) = tab_bar.as_mut() {
        if tab_bar.get("list").is_some_and(Value::is_array) {
            let index = ContentHashIndex::build(sink.tree(), config)?;
            summary.icons = resolve_tab_bar(tab_bar, &index);
        }
    }

    let mut table = match manifest.take("page") {
        Some(page) => PageTable::from_value(page)?,
        None => PageTable::new(),
    };
    manifest.take("renderer");
    summary.components = resolve_components(&mut table);

    let mut app = manifest.into_remaining();
    if let Some(tab_bar) = tab_bar {
        app.insert("tabBar".to_string(), tab_bar);
    }
    if let Some(sub_packages) = sub_packages {
        app.insert("subPackages".to_string(), sub_packages);
    }
    match global {
        Some(Value::Object(global)) => app.extend(global),
        Some(other) => warn!("Ignoring non-object global ({})", type_name(&other)),
        None => {}
    }
    summary.pages = pages.len();
    app.insert(
        "pages".to_string(),
        Value::Array(pages.into_iter().map(Value::String).collect()),
    );

    sink.save(&config.app_json, Content::Json(Value::Object(app)))?;
    Ok((table, summary))
}
