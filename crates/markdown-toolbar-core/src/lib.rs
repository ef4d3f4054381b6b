//! markdown-toolbar-core: Markdown toolbar transforms without framework dependencies.
//!
//! This crate provides:
//! - `EditSurface` trait for the host editing widget
//! - `PlainSurface<T>` - field-based surface over an undoable `TextBuffer`
//! - A markdown tokenizer and the context classifier built on it
//! - Wrap, line-prefix and literal-insert transforms, all generic over EditSurface
//! - `MarkdownEditor` - toolbar, shortcut, preview and change-notification shell

pub mod actions;
pub mod classify;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod execute;
pub mod keymap;
pub mod surface;
pub mod text;
pub mod tokenize;
pub mod types;
pub mod undo;

pub use actions::{InsertBlock, LayoutItem, LinePrefix, Operation, ToolbarAction, WrapStyle};
pub use classify::{ClassifyAt, State, StateSet, classify};
pub use config::{EditorConfig, FileStore, Loader, Saver};
pub use debounce::Debouncer;
pub use editor::{EditorEvent, MarkdownEditor, PreviewRenderer, ToolbarItem};
pub use error::{ConfigError, EditorError, ToolbarError};
pub use execute::{apply, insert_literal, toggle_code};
pub use keymap::{Key, KeyCombo, KeydownResult, Modifiers};
pub use smol_str::SmolStr;
pub use surface::{EditSurface, PlainSurface};
pub use text::{EditorRope, TextBuffer};
pub use types::{HistorySize, HistoryState, Position, Selection};
pub use undo::{UndoManager, UndoableBuffer};
