//! Editor configuration and file storage.
//!
//! The config mirrors the options a host sets on the toolbar widget: which
//! buttons appear in what order, the shortcut map, indentation and view
//! flags. It can be loaded from and saved to `.json` or `.toml` files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actions::{LayoutItem, ToolbarAction};
use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::error::{ConfigError, ToolbarError};
use crate::keymap::{KeyCombo, convert_shortcut};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    /// Toolbar layout: action names, `|` for separators.
    pub toolbar: Vec<String>,
    /// Action name to shortcut, e.g. `strong = "Cmd-B"`.
    pub shortcuts: BTreeMap<String, String>,
    /// Tab inserts a tab char rather than spaces.
    pub indent_with_tabs: bool,
    pub tab_size: usize,
    pub split_view: bool,
    pub fullscreen: bool,
    /// Whether an empty value fails validation.
    pub required: bool,
    pub name: Option<String>,
    pub line_numbers: bool,
    pub auto_focus: bool,
    /// Quiet period before the value-changed event fires.
    pub debounce_ms: u64,
    /// Undo steps kept by the reference surface.
    pub history_limit: usize,
    /// Keep `Cmd` in shortcuts instead of rewriting it to `Ctrl`.
    pub mac_shortcuts: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let toolbar = [
            "undo",
            "redo",
            "|",
            "header",
            "strong",
            "italic",
            "strikethrough",
            "|",
            "quote",
            "hr",
            "table",
            "code",
            "|",
            "unordered-list",
            "ordered-list",
            "|",
            "fullscreen",
            "split-view",
        ];
        let shortcuts = [
            ("undo", "Cmd-Z"),
            ("redo", "Cmd-Y"),
            ("strong", "Cmd-B"),
            ("italic", "Cmd-I"),
            ("quote", "Cmd-'"),
            ("unordered-list", "Cmd-Alt-L"),
            ("ordered-list", "Cmd-L"),
            ("split-view", "F9"),
            ("fullscreen", "F11"),
        ];

        Self {
            toolbar: toolbar.iter().map(|s| s.to_string()).collect(),
            shortcuts: shortcuts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            indent_with_tabs: true,
            tab_size: 2,
            split_view: true,
            fullscreen: false,
            required: false,
            name: None,
            line_numbers: false,
            auto_focus: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            history_limit: 100,
            mac_shortcuts: cfg!(target_os = "macos"),
        }
    }
}

impl EditorConfig {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self, ConfigError> {
        loader.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<(), ConfigError> {
        saver.save(self)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse the toolbar layout. Unknown names are an error.
    pub fn layout(&self) -> Result<Vec<LayoutItem>, ToolbarError> {
        self.toolbar.iter().map(|name| name.parse()).collect()
    }

    /// Resolve the shortcut map into key combos, rewriting `Cmd` for the
    /// platform. Empty shortcuts are skipped.
    pub fn keymap(&self) -> Result<Vec<(KeyCombo, ToolbarAction)>, ToolbarError> {
        self.shortcuts
            .iter()
            .filter(|(_, shortcut)| !shortcut.is_empty())
            .map(|(name, shortcut)| {
                let action: ToolbarAction = name.parse()?;
                let combo: KeyCombo = convert_shortcut(shortcut, self.mac_shortcuts).parse()?;
                Ok((combo, action))
            })
            .collect()
    }

    /// The text a Tab keypress inserts outside of lists.
    pub fn indent_unit(&self) -> String {
        if self.indent_with_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.tab_size)
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(&self) -> Result<EditorConfig, ConfigError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(&self, config: &EditorConfig) -> Result<(), ConfigError>;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`EditorConfig`] data will be serialized and deserialized using the file
    /// extension: `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, contents: String) -> Result<(), ConfigError> {
        std::fs::write(&self.path, contents).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn unsupported(&self) -> ConfigError {
        ConfigError::UnsupportedFormat {
            path: self.path.clone(),
        }
    }
}

impl Loader for FileStore {
    fn load(&self) -> Result<EditorConfig, ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&self.read()?)?),
            Some("toml") => Ok(toml::from_str(&self.read()?)?),
            _ => Err(self.unsupported()),
        }
    }
}

impl Saver for FileStore {
    fn save(&self, config: &EditorConfig) -> Result<(), ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => self.write(serde_json::to_string_pretty(config)?),
            Some("toml") => self.write(toml::to_string_pretty(config)?),
            _ => Err(self.unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Key;

    #[test]
    fn test_default_layout_parses() {
        let layout = EditorConfig::default().layout().unwrap();
        assert_eq!(layout.len(), 18);
        assert_eq!(layout[0], LayoutItem::Action(ToolbarAction::Undo));
        assert_eq!(layout[2], LayoutItem::Separator);
        assert_eq!(layout[17], LayoutItem::Action(ToolbarAction::SplitView));
    }

    #[test]
    fn test_keymap_rewrites_cmd_off_mac() {
        let config = EditorConfig {
            mac_shortcuts: false,
            ..EditorConfig::default()
        };
        let keymap = config.keymap().unwrap();
        let bold = keymap
            .iter()
            .find(|(_, action)| *action == ToolbarAction::Strong)
            .map(|(combo, _)| combo.clone());
        assert_eq!(bold, Some(KeyCombo::ctrl(Key::character("b"))));
    }

    #[test]
    fn test_keymap_keeps_cmd_on_mac() {
        let config = EditorConfig {
            mac_shortcuts: true,
            ..EditorConfig::default()
        };
        let keymap = config.keymap().unwrap();
        assert!(keymap.contains(&(KeyCombo::meta(Key::character("z")), ToolbarAction::Undo)));
        assert!(keymap.contains(&(KeyCombo::new(Key::F(11)), ToolbarAction::Fullscreen)));
    }

    #[test]
    fn test_bad_names_are_errors() {
        let mut config = EditorConfig::default();
        config.toolbar.push("bold".into());
        assert!(config.layout().is_err());

        let mut config = EditorConfig::default();
        config.shortcuts.insert("strong".into(), "Hyper-B".into());
        assert!(config.keymap().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"tab-size": 4, "indent-with-tabs": false}"#).unwrap();
        assert_eq!(config.tab_size, 4);
        assert_eq!(config.indent_unit(), "    ");
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.toolbar, EditorConfig::default().toolbar);
    }

    #[test]
    fn test_toml_round_trip_through_file_store() {
        let path = std::env::temp_dir().join(format!(
            "markdown-toolbar-config-{}.toml",
            std::process::id()
        ));
        let store = FileStore::new(&path);
        let config = EditorConfig {
            required: true,
            name: Some("body".into()),
            ..EditorConfig::default()
        };
        config.save(&store).unwrap();
        let loaded = EditorConfig::load(&store).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let store = FileStore::new("editor.yaml");
        assert!(matches!(
            EditorConfig::load(&store),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }
}
