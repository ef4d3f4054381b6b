use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use markdown_toolbar_core::{
    EditSurface, EditorConfig, EditorRope, FileStore, KeyCombo, KeydownResult, MarkdownEditor,
    PlainSurface, PreviewRenderer, Selection, ToolbarAction, UndoableBuffer,
};
use miette::{IntoDiagnostic, Result};

#[derive(Parser)]
#[command(version, about = "Apply markdown toolbar actions to a document", long_about = None)]
struct Cli {
    /// Markdown file to edit. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Selection to act on, as `line:col` or `line:col-line:col` (zero-based)
    #[arg(short, long, default_value = "0:0")]
    select: Selection,

    /// Toolbar action to run, e.g. `strong` or `ordered-list`. Repeatable.
    #[arg(short, long = "action")]
    actions: Vec<ToolbarAction>,

    /// Key press to feed the editor after the actions, e.g. `Ctrl-B`. Repeatable.
    #[arg(short, long = "key")]
    keys: Vec<KeyCombo>,

    /// Editor config file (.toml or .json)
    #[arg(short, long, env = "MDTOOLBAR_CONFIG")]
    config: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the final selection to stderr
    #[arg(long)]
    show_selection: bool,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Keeps the last rendered markdown so the result can be written out.
struct CapturePreview {
    initial: String,
    rendered: String,
}

impl PreviewRenderer for CapturePreview {
    fn render(&mut self, markdown: &str) {
        self.rendered = markdown.to_string();
    }

    fn initial_markdown(&self) -> Option<String> {
        Some(self.initial.clone())
    }
}

fn main() -> Result<()> {
    init_miette();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EditorConfig::load(&FileStore::new(path))?,
        None => EditorConfig::default(),
    };

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config).into_diagnostic()?);
        return Ok(());
    }

    let initial = match &cli.input {
        Some(path) => std::fs::read_to_string(path).into_diagnostic()?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
            text
        }
    };

    let surface = PlainSurface::new(UndoableBuffer::new(EditorRope::new(), config.history_limit));
    let preview = CapturePreview {
        initial,
        rendered: String::new(),
    };
    let mut editor = MarkdownEditor::new(surface, Some(preview), config)?;
    editor
        .surface_mut()
        .set_selection(cli.select.anchor, cli.select.head);

    for action in &cli.actions {
        if !editor.execute(*action) {
            tracing::warn!(%action, "action had no effect");
        }
    }
    for key in &cli.keys {
        if editor.handle_key(key) != KeydownResult::Handled {
            tracing::warn!(%key, "key press not handled");
        }
    }
    editor.shutdown();

    let result = &editor.preview().rendered;
    match &cli.output {
        Some(path) => std::fs::write(path, result).into_diagnostic()?,
        None => std::io::stdout()
            .write_all(result.as_bytes())
            .into_diagnostic()?,
    }

    if cli.show_selection {
        let selection = editor.surface().selection();
        eprintln!("selection: {}-{}", selection.anchor, selection.head);
    }

    Ok(())
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
