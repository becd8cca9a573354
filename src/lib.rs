pub mod board;
pub mod codegen;
pub mod context;
pub mod definitions;
pub mod generators;
pub mod order;
pub mod workspace;
pub mod xml;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

pub use board::Board;
pub use codegen::{generate_program, GeneratedProgram, GeneratorOptions};

use anyhow::{Context, Result};
use context::Diagnostic;
use log::{info, warn};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    let total_stages = 4 + usize::from(args.diagnostics_json.is_some());
    let progress = CliProgress::new("Compile", total_stages);
    let mut stage = 0usize;

    stage += 1;
    progress.emit(stage, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    stage += 1;
    progress.emit(stage, "Loading workspace");
    let document = xml::read_workspace_file(&input)?;
    let board = args.board.or(document.board).unwrap_or_default();
    info!(
        "Loaded {} blocks for board '{}'",
        document.workspace.len(),
        board
    );

    stage += 1;
    progress.emit(stage, "Generating C source");
    let program = generate_program(&document.workspace, GeneratorOptions { board });
    for diagnostic in &program.diagnostics {
        warn!("{}", diagnostic);
    }

    if let Some(path) = &args.diagnostics_json {
        stage += 1;
        progress.emit(stage, "Writing diagnostics");
        let text = serde_json::to_string_pretty(&diagnostics_json(&program.diagnostics))?;
        std::fs::write(path, text.as_bytes())
            .with_context(|| format!("Failed to write '{}'.", path.display()))?;
    }

    stage += 1;
    match &args.output {
        Some(output) => {
            progress.emit(stage, "Writing program");
            std::fs::write(output, program.source.as_bytes())
                .with_context(|| format!("Failed to write '{}'.", output.display()))?;
        }
        None => {
            progress.emit(stage, "Printing program");
            print!("{}", program.source);
        }
    }

    if args.strict && !program.diagnostics.is_empty() {
        anyhow::bail!(
            "{} diagnostic(s) reported; failing because of --strict.",
            program.diagnostics.len()
        );
    }
    Ok(())
}

/// Generates the program for a workspace XML document. `board` overrides
/// the board named in the document.
pub fn compile_workspace_xml(source: &str, board: Option<Board>) -> Result<GeneratedProgram> {
    let document = xml::load_workspace_xml(source)?;
    let board = board.or(document.board).unwrap_or_default();
    Ok(generate_program(&document.workspace, GeneratorOptions { board }))
}

pub fn compile_workspace_file(input: &Path, board: Option<Board>) -> Result<GeneratedProgram> {
    let input = canonicalize_file(input)?;
    let document = xml::read_workspace_file(&input)?;
    let board = board.or(document.board).unwrap_or_default();
    Ok(generate_program(&document.workspace, GeneratorOptions { board }))
}

pub fn diagnostics_json(diagnostics: &[Diagnostic]) -> Value {
    json!({
        "count": diagnostics.len(),
        "diagnostics": diagnostics.iter().map(Diagnostic::to_json).collect::<Vec<_>>(),
    })
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend((0..width).map(|i| if i < filled { '=' } else { '-' }));
    bar.push(']');
    bar
}
