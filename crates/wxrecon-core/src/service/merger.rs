//! Reconciles streamed service configs with the static page table.

use super::MatchReceiver;
use crate::error::Result;
use crate::manifest::PageTable;
use crate::output::{Content, OutputTree, WriteOnceSink};
use crate::path::config_path;
use serde_json::Value;
use tracing::{debug, trace};

/// Outcome of a merge
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Configs written verbatim from the service bundle
    pub streamed: usize,
    /// Configs written from the static page table
    pub fallback: usize,
    /// Writes dropped because the path was already written
    pub skipped: usize,
}

/// Drains `matches`, then flushes the page table.
///
/// Streamed configs are written verbatim as they arrive. Once the channel
/// closes, every page's window is written as JSON; pages already satisfied
/// by the stream keep the streamed text.
pub async fn merge<T: OutputTree>(
    sink: &mut WriteOnceSink<T>,
    pages: &PageTable,
    mut matches: MatchReceiver,
) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    while let Some(m) = matches.recv().await {
        let path = config_path(&m.path);
        if sink.save(&path, Content::Text(m.source))? {
            stats.streamed += 1;
        } else {
            stats.skipped += 1;
        }
    }
    debug!("Service stream complete, {} configs streamed", stats.streamed);

    for (key, entry) in pages.iter() {
        let window = Value::Object(entry.window.clone());
        if sink.save(&key.config_path(), Content::Json(window))? {
            stats.fallback += 1;
        } else {
            trace!("Keeping streamed config for {}", key);
            stats.skipped += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutputTree;
    use crate::service::{channel, ServiceMatch};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table() -> PageTable {
        PageTable::from_value(json!({
            "pages/index": {"window": {"title": "static"}},
            "pages/other": {"window": {"title": "other"}},
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_stream_wins_over_fallback() {
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());
        let (tx, rx) = channel();
        tx.send(ServiceMatch::new("pages/index", "{a:1}")).unwrap();
        drop(tx);

        let stats = merge(&mut sink, &table(), rx).await.unwrap();

        assert_eq!(stats, MergeStats { streamed: 1, fallback: 1, skipped: 1 });
        let tree = sink.into_inner();
        assert_eq!(tree.get_str("pages/index.json"), Some("{a:1}"));
        assert_eq!(tree.get_json("pages/other.json"), Some(json!({"title": "other"})));
    }

    #[tokio::test]
    async fn test_streamed_json_path_matches_page_key() {
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());
        let (tx, rx) = channel();
        tx.send(ServiceMatch::new("pages/other.json", "{ b : 2 }")).unwrap();
        drop(tx);

        merge(&mut sink, &table(), rx).await.unwrap();

        assert_eq!(sink.tree().get_str("pages/other.json"), Some("{ b : 2 }"));
    }

    #[tokio::test]
    async fn test_fallback_waits_for_producer() {
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());
        let (tx, rx) = channel();

        let producer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.send(ServiceMatch::new("pages/index.json", "{late:true}"))
                .unwrap();
        });

        merge(&mut sink, &table(), rx).await.unwrap();
        producer.await.unwrap();

        assert_eq!(sink.tree().get_str("pages/index.json"), Some("{late:true}"));
    }

    #[tokio::test]
    async fn test_component_only_match() {
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());
        let (tx, rx) = channel();
        tx.send(ServiceMatch::new("comp/x.json", "{component:true}"))
            .unwrap();
        drop(tx);

        let stats = merge(&mut sink, &PageTable::new(), rx).await.unwrap();

        assert_eq!(stats.streamed, 1);
        assert_eq!(stats.fallback, 0);
    }
}
