//! The markdown editor shell.
//!
//! `MarkdownEditor` owns an edit surface and a preview collaborator and wires
//! toolbar actions, keyboard shortcuts, history flags and change notification
//! around the transform engine. Hosts feed it actions and key presses, call
//! `sync` after edits they make themselves, call `tick` periodically, and drain
//! `EditorEvent`s.

use tracing::{debug, warn};
use web_time::Instant;

use crate::actions::{LayoutItem, ToolbarAction};
use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::error::EditorError;
use crate::execute::{apply, in_list, indent_lines, outdent_lines, toggle_code};
use crate::keymap::{Key, KeyCombo, KeydownResult, Modifiers};
use crate::surface::EditSurface;
use crate::types::HistoryState;

/// The preview collaborator. It receives the raw markdown and renders it
/// however the host likes.
pub trait PreviewRenderer {
    fn render(&mut self, markdown: &str);

    /// Markdown the preview already holds when the editor is set up.
    fn initial_markdown(&self) -> Option<String> {
        None
    }
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The value settled after the debounce window. Carries the full text.
    ValueChanged(String),
    /// Fullscreen was entered or left.
    Fullscreen(bool),
}

/// One rendered toolbar slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarItem {
    Separator,
    Button {
        action: ToolbarAction,
        title: &'static str,
        class_name: &'static str,
        icon: &'static str,
        disabled: bool,
        /// Pressed state for the fullscreen and split-view toggles.
        active: bool,
    },
}

pub struct MarkdownEditor<S: EditSurface, P: PreviewRenderer> {
    surface: S,
    preview: P,
    config: EditorConfig,
    layout: Vec<LayoutItem>,
    keymap: Vec<(KeyCombo, ToolbarAction)>,
    history: HistoryState,
    debouncer: Debouncer,
    seen_version: u64,
    fullscreen: bool,
    split_view: bool,
    initialized: bool,
    events: Vec<EditorEvent>,
}

impl<S: EditSurface, P: PreviewRenderer> MarkdownEditor<S, P> {
    /// Set up an editor over `surface`, mirroring into `preview`.
    ///
    /// If the preview already holds markdown it becomes the surface value.
    /// Fails without a preview or when the config names unknown actions or
    /// unparseable shortcuts.
    pub fn new(surface: S, preview: Option<P>, config: EditorConfig) -> Result<Self, EditorError> {
        let preview = preview.ok_or(EditorError::MissingPreview)?;
        let layout = config.layout()?;
        let keymap = config.keymap()?;

        let mut editor = Self {
            surface,
            preview,
            layout,
            keymap,
            history: HistoryState::default(),
            debouncer: Debouncer::new(config.debounce()),
            seen_version: 0,
            fullscreen: false,
            split_view: config.split_view,
            initialized: false,
            events: Vec::new(),
            config,
        };

        if let Some(markdown) = editor.preview.initial_markdown() {
            if markdown != editor.surface.value() {
                editor.surface.set_value(&markdown);
            }
            editor.surface.clear_history();
        }
        if editor.config.auto_focus {
            editor.surface.focus();
        }
        editor.set_fullscreen(editor.config.fullscreen);

        editor.render_preview();
        editor.refresh_history();
        editor.seen_version = editor.surface.change_version();
        editor.initialized = true;
        debug!(
            name = editor.config.name.as_deref().unwrap_or_default(),
            "markdown editor initialized"
        );

        Ok(editor)
    }

    /// Run a toolbar action. Returns whether it did anything.
    pub fn execute(&mut self, action: ToolbarAction) -> bool {
        self.execute_at(action, Instant::now())
    }

    /// Run a toolbar action, timestamping the resulting change with `now`.
    pub fn execute_at(&mut self, action: ToolbarAction, now: Instant) -> bool {
        debug!(%action, "execute");
        let handled = match action {
            ToolbarAction::Undo => {
                let undone = self.surface.undo();
                self.surface.focus();
                undone
            }
            ToolbarAction::Redo => {
                let redone = self.surface.redo();
                self.surface.focus();
                redone
            }
            ToolbarAction::Code => {
                toggle_code(&mut self.surface);
                true
            }
            ToolbarAction::Fullscreen => {
                self.toggle_fullscreen();
                true
            }
            ToolbarAction::SplitView => {
                self.toggle_split_view();
                true
            }
            other => match other.operation() {
                Some(operation) => {
                    apply(&mut self.surface, operation);
                    true
                }
                None => false,
            },
        };

        if action.is_edit() {
            self.sync(now);
        }
        handled
    }

    /// Run a toolbar action by name. Unknown names are logged and ignored.
    pub fn execute_named(&mut self, name: &str) -> bool {
        match name.parse::<ToolbarAction>() {
            Ok(action) => self.execute(action),
            Err(err) => {
                warn!(%err, "ignoring toolbar action");
                false
            }
        }
    }

    /// Replace the value from outside, e.g. a host property binding.
    pub fn set_markdown(&mut self, markdown: &str) {
        self.set_markdown_at(markdown, Instant::now());
    }

    pub fn set_markdown_at(&mut self, markdown: &str, now: Instant) {
        if self.surface.value() != markdown {
            self.surface.set_value(markdown);
        }
        if !self.sync(now) {
            self.render_preview();
            self.refresh_history();
        }
    }

    /// Pick up changes made on the surface since the last sync.
    ///
    /// Re-renders the preview, refreshes the history flags and restarts the
    /// value-changed window. Returns whether anything changed.
    pub fn sync(&mut self, now: Instant) -> bool {
        let version = self.surface.change_version();
        if version == self.seen_version {
            return false;
        }
        self.seen_version = version;
        self.render_preview();
        self.refresh_history();
        self.debouncer.schedule(now);
        true
    }

    /// Emit `ValueChanged` if the quiet window has passed. Returns whether an
    /// event was queued.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            self.events.push(EditorEvent::ValueChanged(self.surface.value()));
            true
        } else {
            false
        }
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.fullscreen == fullscreen {
            return;
        }
        self.fullscreen = fullscreen;
        if self.initialized {
            self.events.push(EditorEvent::Fullscreen(fullscreen));
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(!self.fullscreen);
    }

    pub fn toggle_split_view(&mut self) {
        self.split_view = !self.split_view;
    }

    /// Handle a keydown. Shortcuts win over built-in keys.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> KeydownResult {
        self.handle_key_at(combo, Instant::now())
    }

    pub fn handle_key_at(&mut self, combo: &KeyCombo, now: Instant) -> KeydownResult {
        if let Some(action) = self.shortcut(combo) {
            self.execute_at(action, now);
            return KeydownResult::Handled;
        }

        let plain = combo.modifiers == Modifiers::NONE;
        match &combo.key {
            Key::Escape if plain => {
                if self.fullscreen {
                    self.set_fullscreen(false);
                    KeydownResult::Handled
                } else {
                    KeydownResult::PassThrough
                }
            }
            Key::Tab if plain || combo.modifiers == Modifiers::SHIFT => {
                self.handle_tab(combo.modifiers.shift);
                self.sync(now);
                KeydownResult::Handled
            }
            key if key.is_navigation() => KeydownResult::PassThrough,
            _ => KeydownResult::NotHandled,
        }
    }

    fn handle_tab(&mut self, shift: bool) {
        if in_list(&self.surface) {
            if shift {
                outdent_lines(&mut self.surface, self.config.tab_size);
            } else {
                indent_lines(&mut self.surface, &self.config.indent_unit());
            }
        } else {
            self.surface.replace_selection(&self.config.indent_unit());
        }
    }

    fn shortcut(&self, combo: &KeyCombo) -> Option<ToolbarAction> {
        self.keymap
            .iter()
            .find(|(bound, _)| bound == combo)
            .map(|(_, action)| *action)
    }

    /// The toolbar as configured, with current enablement.
    pub fn toolbar(&self) -> Vec<ToolbarItem> {
        self.layout
            .iter()
            .map(|item| match item {
                LayoutItem::Separator => ToolbarItem::Separator,
                LayoutItem::Action(action) => ToolbarItem::Button {
                    action: *action,
                    title: action.title(),
                    class_name: action.class_name(),
                    icon: action.icon(),
                    disabled: match action {
                        ToolbarAction::Undo => !self.history.can_undo,
                        ToolbarAction::Redo => !self.history.can_redo,
                        _ => false,
                    },
                    active: match action {
                        ToolbarAction::Fullscreen => self.fullscreen,
                        ToolbarAction::SplitView => self.split_view,
                        _ => false,
                    },
                },
            })
            .collect()
    }

    /// A required editor must hold some text.
    pub fn validate(&self) -> bool {
        !self.config.required || !self.surface.value().is_empty()
    }

    /// Cancel the pending value-changed notification. Also runs on drop.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
    }

    pub fn value(&self) -> String {
        self.surface.value()
    }

    pub fn history(&self) -> HistoryState {
        self.history
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_split_view(&self) -> bool {
        self.split_view
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn has_pending_change(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for host-driven edits. Call `sync` afterwards.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn render_preview(&mut self) {
        let value = self.surface.value();
        self.preview.render(&value);
    }

    fn refresh_history(&mut self) {
        self.history = HistoryState::from(self.surface.history_size());
    }
}

impl<S: EditSurface, P: PreviewRenderer> Drop for MarkdownEditor<S, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::surface::PlainSurface;
    use crate::types::Position;
    use crate::{EditorRope, UndoableBuffer};

    #[derive(Default)]
    struct RecordingPreview {
        initial: Option<String>,
        renders: Vec<String>,
    }

    impl PreviewRenderer for RecordingPreview {
        fn render(&mut self, markdown: &str) {
            self.renders.push(markdown.to_string());
        }

        fn initial_markdown(&self) -> Option<String> {
            self.initial.clone()
        }
    }

    type TestEditor = MarkdownEditor<PlainSurface<UndoableBuffer<EditorRope>>, RecordingPreview>;

    fn pc_config() -> EditorConfig {
        EditorConfig {
            mac_shortcuts: false,
            ..EditorConfig::default()
        }
    }

    fn make_editor(text: &str) -> TestEditor {
        let preview = RecordingPreview {
            initial: Some(text.to_string()),
            renders: Vec::new(),
        };
        MarkdownEditor::new(PlainSurface::default(), Some(preview), pc_config()).unwrap()
    }

    fn select(editor: &mut TestEditor, anchor: (usize, usize), head: (usize, usize)) {
        editor.surface_mut().set_selection(
            Position::new(anchor.0, anchor.1),
            Position::new(head.0, head.1),
        );
    }

    #[test]
    fn test_missing_preview_is_fatal() {
        let result: Result<TestEditor, _> =
            MarkdownEditor::new(PlainSurface::default(), None, EditorConfig::default());
        assert!(matches!(result, Err(EditorError::MissingPreview)));
    }

    #[test]
    fn test_bad_layout_is_rejected() {
        let mut config = EditorConfig::default();
        config.toolbar = vec!["strong".into(), "blink".into()];
        let result: Result<TestEditor, _> = MarkdownEditor::new(
            PlainSurface::default(),
            Some(RecordingPreview::default()),
            config,
        );
        assert!(matches!(result, Err(EditorError::Toolbar(_))));
    }

    #[test]
    fn test_initial_markdown_loads_into_surface() {
        let editor = make_editor("# Hello");
        assert_eq!(editor.value(), "# Hello");
        assert_eq!(editor.preview().renders, vec!["# Hello".to_string()]);
        assert!(editor.is_initialized());
        // Loading the initial value is not a pending user change
        assert!(!editor.has_pending_change());
    }

    #[test]
    fn test_execute_renders_and_debounces() {
        let mut editor = make_editor("hello");
        select(&mut editor, (0, 0), (0, 5));
        let t0 = Instant::now();

        assert!(editor.execute_at(ToolbarAction::Strong, t0));
        assert_eq!(editor.value(), "**hello**");
        assert_eq!(editor.preview().renders.last().map(String::as_str), Some("**hello**"));
        assert!(editor.history().can_undo);

        assert!(!editor.tick(t0 + Duration::from_millis(100)));
        assert!(editor.tick(t0 + Duration::from_millis(300)));
        assert_eq!(
            editor.drain_events(),
            vec![EditorEvent::ValueChanged("**hello**".into())]
        );
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_rapid_actions_emit_one_change() {
        let mut editor = make_editor("a b");
        let t0 = Instant::now();
        select(&mut editor, (0, 0), (0, 1));
        editor.execute_at(ToolbarAction::Italic, t0);
        editor.execute_at(ToolbarAction::Header, t0 + Duration::from_millis(200));

        assert!(!editor.tick(t0 + Duration::from_millis(400)));
        assert!(editor.tick(t0 + Duration::from_millis(500)));
        assert_eq!(
            editor.drain_events(),
            vec![EditorEvent::ValueChanged("# *a* b".into())]
        );
    }

    #[test]
    fn test_undo_redo_restore_in_one_step() {
        let mut editor = make_editor("a\nb\nc");
        select(&mut editor, (0, 0), (2, 1));
        editor.execute(ToolbarAction::OrderedList);
        assert_eq!(editor.value(), "1. a\n2. b\n3. c");

        assert!(editor.execute(ToolbarAction::Undo));
        assert_eq!(editor.value(), "a\nb\nc");
        assert!(editor.history().can_redo);

        assert!(editor.execute(ToolbarAction::Redo));
        assert_eq!(editor.value(), "1. a\n2. b\n3. c");
        assert!(editor.surface().is_focused());
    }

    #[test]
    fn test_toolbar_history_flags() {
        let mut editor = make_editor("text");
        let disabled = |editor: &TestEditor, wanted: ToolbarAction| {
            editor.toolbar().into_iter().find_map(|item| match item {
                ToolbarItem::Button {
                    action, disabled, ..
                } if action == wanted => Some(disabled),
                _ => None,
            })
        };

        assert_eq!(disabled(&editor, ToolbarAction::Undo), Some(true));
        assert_eq!(disabled(&editor, ToolbarAction::Redo), Some(true));

        select(&mut editor, (0, 0), (0, 4));
        editor.execute(ToolbarAction::Strikethrough);
        assert_eq!(disabled(&editor, ToolbarAction::Undo), Some(false));

        editor.execute(ToolbarAction::Undo);
        assert_eq!(disabled(&editor, ToolbarAction::Undo), Some(true));
        assert_eq!(disabled(&editor, ToolbarAction::Redo), Some(false));
    }

    #[test]
    fn test_toolbar_layout() {
        let editor = make_editor("");
        let toolbar = editor.toolbar();
        assert_eq!(toolbar.len(), 18);
        assert_eq!(toolbar[2], ToolbarItem::Separator);
        assert_eq!(
            toolbar[4],
            ToolbarItem::Button {
                action: ToolbarAction::Strong,
                title: "Bold",
                class_name: "btn-bold",
                icon: "format-bold",
                disabled: false,
                active: false,
            }
        );
    }

    #[test]
    fn test_execute_named() {
        let mut editor = make_editor("x");
        select(&mut editor, (0, 0), (0, 1));
        assert!(editor.execute_named("quote"));
        assert_eq!(editor.value(), "> x");
        assert!(!editor.execute_named("blink"));
        assert_eq!(editor.value(), "> x");
    }

    #[test]
    fn test_fullscreen_events() {
        let mut config = pc_config();
        config.fullscreen = true;
        let mut editor: TestEditor = MarkdownEditor::new(
            PlainSurface::default(),
            Some(RecordingPreview::default()),
            config,
        )
        .unwrap();

        // Not emitted during setup
        assert!(editor.is_fullscreen());
        assert!(editor.drain_events().is_empty());

        assert_eq!(
            editor.handle_key(&KeyCombo::new(Key::Escape)),
            KeydownResult::Handled
        );
        assert!(!editor.is_fullscreen());
        assert_eq!(
            editor.handle_key(&KeyCombo::new(Key::Escape)),
            KeydownResult::PassThrough
        );

        editor.handle_key(&KeyCombo::new(Key::F(11)));
        assert_eq!(
            editor.drain_events(),
            vec![EditorEvent::Fullscreen(false), EditorEvent::Fullscreen(true)]
        );
    }

    #[test]
    fn test_split_view_shortcut() {
        let mut editor = make_editor("");
        assert!(editor.is_split_view());
        editor.handle_key(&KeyCombo::new(Key::F(9)));
        assert!(!editor.is_split_view());
        // Chrome toggles are not edits
        assert!(!editor.has_pending_change());
    }

    #[test]
    fn test_shortcuts_use_ctrl_off_mac() {
        let mut editor = make_editor("word");
        select(&mut editor, (0, 0), (0, 4));

        let meta_b = KeyCombo::meta(Key::character("b"));
        assert_eq!(editor.handle_key(&meta_b), KeydownResult::NotHandled);
        assert_eq!(editor.value(), "word");

        let ctrl_b = KeyCombo::ctrl(Key::character("B"));
        assert_eq!(editor.handle_key(&ctrl_b), KeydownResult::Handled);
        assert_eq!(editor.value(), "**word**");

        let ctrl_alt_l: KeyCombo = "Ctrl-Alt-L".parse().unwrap();
        editor.handle_key(&ctrl_alt_l);
        assert_eq!(editor.value(), "* **word**");
    }

    #[test]
    fn test_tab_outside_list_inserts_indent() {
        let mut editor = make_editor("ab");
        select(&mut editor, (0, 1), (0, 1));
        assert_eq!(
            editor.handle_key(&KeyCombo::new(Key::Tab)),
            KeydownResult::Handled
        );
        assert_eq!(editor.value(), "a\tb");

        let mut config = pc_config();
        config.indent_with_tabs = false;
        config.tab_size = 4;
        let preview = RecordingPreview {
            initial: Some("ab".into()),
            renders: Vec::new(),
        };
        let mut editor: TestEditor =
            MarkdownEditor::new(PlainSurface::default(), Some(preview), config).unwrap();
        select(&mut editor, (0, 1), (0, 1));
        editor.handle_key(&KeyCombo::shift(Key::Tab));
        assert_eq!(editor.value(), "a    b");
    }

    #[test]
    fn test_tab_in_list_indents_and_outdents() {
        let mut editor = make_editor("* item");
        select(&mut editor, (0, 3), (0, 3));
        editor.handle_key(&KeyCombo::new(Key::Tab));
        assert_eq!(editor.value(), "\t* item");
        editor.handle_key(&KeyCombo::shift(Key::Tab));
        assert_eq!(editor.value(), "* item");
    }

    #[test]
    fn test_navigation_passes_through() {
        let mut editor = make_editor("x");
        assert_eq!(
            editor.handle_key(&KeyCombo::new(Key::ArrowLeft)),
            KeydownResult::PassThrough
        );
        assert_eq!(
            editor.handle_key(&KeyCombo::new(Key::character("q"))),
            KeydownResult::NotHandled
        );
    }

    #[test]
    fn test_set_markdown_and_host_sync() {
        let mut editor = make_editor("one");
        let t0 = Instant::now();
        editor.set_markdown_at("two", t0);
        assert_eq!(editor.value(), "two");
        assert_eq!(editor.preview().renders.last().map(String::as_str), Some("two"));
        assert!(editor.has_pending_change());

        // Same value: nothing new to announce
        editor.tick(t0 + Duration::from_secs(1));
        editor.drain_events();
        editor.set_markdown_at("two", t0 + Duration::from_secs(2));
        assert!(!editor.has_pending_change());

        // Host edits straight on the surface
        let at = Position::new(0, 3);
        editor.surface_mut().replace_range("!", at, at);
        assert!(editor.sync(t0 + Duration::from_secs(3)));
        assert!(!editor.sync(t0 + Duration::from_secs(3)));
        assert_eq!(editor.preview().renders.last().map(String::as_str), Some("two!"));
    }

    #[test]
    fn test_shutdown_cancels_pending_change() {
        let mut editor = make_editor("x");
        let t0 = Instant::now();
        select(&mut editor, (0, 0), (0, 1));
        editor.execute_at(ToolbarAction::Strong, t0);
        editor.shutdown();
        assert!(!editor.tick(t0 + Duration::from_secs(1)));
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_validate_required() {
        let mut config = pc_config();
        config.required = true;
        let mut editor: TestEditor = MarkdownEditor::new(
            PlainSurface::default(),
            Some(RecordingPreview::default()),
            config,
        )
        .unwrap();
        assert!(!editor.validate());
        editor.set_markdown("content");
        assert!(editor.validate());
        assert!(make_editor("").validate());
    }
}
