//! Error types for the toolbar engine and editor shell

use miette::Diagnostic;
use std::path::PathBuf;

/// Errors from parsing toolbar names, key specs and positions
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ToolbarError {
    #[error("unknown toolbar action: {0}")]
    #[diagnostic(
        code(markdown_toolbar::unknown_action),
        help("valid actions are undo, redo, header, strong, italic, strikethrough, quote, hr, table, code, unordered-list, ordered-list, fullscreen, split-view")
    )]
    UnknownAction(String),

    #[error("invalid shortcut: {0}")]
    #[diagnostic(
        code(markdown_toolbar::invalid_shortcut),
        help("shortcuts look like `Cmd-B`, `Cmd-Alt-L` or `F9`")
    )]
    InvalidShortcut(String),

    #[error("invalid position: {0}")]
    #[diagnostic(
        code(markdown_toolbar::invalid_position),
        help("positions are zero-based `LINE:COLUMN`, selections `LINE:COLUMN-LINE:COLUMN`")
    )]
    InvalidPosition(String),
}

/// Errors from constructing or configuring a `MarkdownEditor`
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EditorError {
    /// The editor was built without a preview collaborator.
    #[error("missing preview renderer")]
    #[diagnostic(
        code(markdown_toolbar::missing_preview),
        help("the editor mirrors its text into a preview; supply one to MarkdownEditor::new")
    )]
    MissingPreview,

    #[error(transparent)]
    #[diagnostic_source]
    Toolbar(#[from] ToolbarError),

    #[error(transparent)]
    #[diagnostic_source]
    Config(#[from] ConfigError),
}

/// Errors from loading or saving an editor config file
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    #[diagnostic(code(markdown_toolbar::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config")]
    #[diagnostic(code(markdown_toolbar::config::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config")]
    #[diagnostic(code(markdown_toolbar::config::toml))]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to serialize TOML config")]
    #[diagnostic(code(markdown_toolbar::config::toml))]
    TomlSer(#[from] toml::ser::Error),

    #[error("unsupported config format: {}", path.display())]
    #[diagnostic(
        code(markdown_toolbar::config::format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat { path: PathBuf },
}
