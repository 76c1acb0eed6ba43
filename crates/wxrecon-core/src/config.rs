//! Run configuration.

/// Default registry identifier the service bundle assigns page configs to
pub const DEFAULT_REGISTRY_IDENTIFIER: &str = "__wxAppCode__";

/// Extensions that are never valid tab-bar icon sources
pub const DEFAULT_IGNORED_ICON_EXTENSIONS: &[&str] = &["wxml", "wxs", "wxss", "html", "json"];

/// How [`Manifest::take`](crate::manifest::Manifest::take) decides that a
/// stored value counts as absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultPolicy {
    /// Falsy values (`null`, `false`, `0`, `""`) are treated as absent
    #[default]
    Truthy,
    /// Only missing keys and `null` are treated as absent
    Presence,
}

/// Configuration for a reconstruction run
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Absent-value policy for manifest fields
    pub default_policy: DefaultPolicy,
    /// Global identifier the service bundle registers configs on
    pub registry_identifier: String,
    /// Output extensions excluded from the content hash index
    pub ignored_icon_extensions: Vec<String>,
    /// Output path of the root manifest
    pub app_json: String,
    /// Output path of the game-mode manifest
    pub game_json: String,
    /// Output path of the extension side file
    pub ext_json: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_policy: DefaultPolicy::default(),
            registry_identifier: DEFAULT_REGISTRY_IDENTIFIER.to_string(),
            ignored_icon_extensions: DEFAULT_IGNORED_ICON_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            app_json: "app.json".to_string(),
            game_json: "game.json".to_string(),
            ext_json: "ext.json".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the absent-value policy
    pub fn default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Sets the registry identifier matched in the service bundle
    pub fn registry_identifier(mut self, ident: impl Into<String>) -> Self {
        self.registry_identifier = ident.into();
        self
    }

    /// Replaces the set of extensions excluded from icon matching
    pub fn ignored_icon_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_icon_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the root manifest output path
    pub fn app_json(mut self, path: impl Into<String>) -> Self {
        self.app_json = path.into();
        self
    }

    /// Sets the game manifest output path
    pub fn game_json(mut self, path: impl Into<String>) -> Self {
        self.game_json = path.into();
        self
    }

    /// Sets the extension side file output path
    pub fn ext_json(mut self, path: impl Into<String>) -> Self {
        self.ext_json = path.into();
        self
    }

    /// Returns true if files with this extension are never icon sources
    pub fn is_ignored_icon_extension(&self, ext: &str) -> bool {
        self.ignored_icon_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_config_builder() {
        let config = ParserConfig::new()
            .default_policy(DefaultPolicy::Presence)
            .registry_identifier("__appCode__")
            .ignored_icon_extensions(["json"])
            .app_json("out/app.json");

        assert_eq!(config.default_policy, DefaultPolicy::Presence);
        assert_eq!(config.registry_identifier, "__appCode__");
        assert!(config.is_ignored_icon_extension("JSON"));
        assert!(!config.is_ignored_icon_extension("wxml"));
        assert_eq!(config.app_json, "out/app.json");
    }

    #[test]
    fn test_default_ignores_text_assets() {
        let config = ParserConfig::default();
        for ext in ["wxml", "wxs", "wxss", "html", "json"] {
            assert!(config.is_ignored_icon_extension(ext));
        }
        assert!(!config.is_ignored_icon_extension("png"));
    }
}
