//! Game package variant.
//!
//! Game packages have no pages, components or tab bar. The manifest is
//! written back exactly as it was found.

use crate::config::ParserConfig;
use crate::error::Result;
use crate::output::{Content, OutputTree, WriteOnceSink};
use serde_json::Value;
use tracing::info;

/// Writes the raw game manifest, returning the number of subpackages it
/// declares
pub(crate) fn parse_game<T: OutputTree>(
    config: &ParserConfig,
    source: &str,
    sink: &mut WriteOnceSink<T>,
) -> Result<usize> {
    let manifest: Value = serde_json::from_str(source)?;
    let subpackages = match manifest.get("subPackages") {
        Some(Value::Array(subs)) => {
            info!("Detected {} subpackages", subs.len());
            subs.len()
        }
        _ => 0,
    };

    sink.save(&config.game_json, Content::Text(source.to_string()))?;
    Ok(subpackages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutputTree;

    #[test]
    fn test_game_manifest_is_verbatim() {
        let source = "{\n  \"subPackages\": [{\"root\": \"x\"}, {\"root\": \"y\"}],\n  \"deviceOrientation\" : \"portrait\"\n}";
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());

        let count = parse_game(&ParserConfig::default(), source, &mut sink).unwrap();

        assert_eq!(count, 2);
        let tree = sink.into_inner();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get_str("game.json"), Some(source));
    }

    #[test]
    fn test_game_manifest_must_be_json() {
        let mut sink = WriteOnceSink::new(MemoryOutputTree::new());
        assert!(parse_game(&ParserConfig::default(), "not json", &mut sink).is_err());
        assert!(sink.tree().is_empty());
    }
}
