use crate::board::Board;
use crate::context::{CType, CompilationContext, Diagnostic, Severity, DEFAULT_TEXT_LENGTH};
use crate::definitions::{self, BlockDefinition, PinSource, Shape};
use crate::generators;
use crate::order::{wrap, Order};
use crate::workspace::{Block, BlockId, Workspace};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOptions {
    pub board: Board,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Statement(String),
    Expression(String, Order),
}

impl Output {
    pub fn statement(code: impl Into<String>) -> Self {
        Output::Statement(code.into())
    }

    pub fn expression(code: impl Into<String>, order: Order) -> Self {
        Output::Expression(code.into(), order)
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedProgram {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

pub fn generate_program(workspace: &Workspace, options: GeneratorOptions) -> GeneratedProgram {
    let mut generator = Generator::new(workspace, options);
    generator
        .ctx
        .add_include("simpletools", "#include \"simpletools.h\"");

    let mut body = String::new();
    for id in workspace.top_blocks() {
        let block = workspace.block(id);
        match generator.shape_of(&block.kind) {
            Some(Shape::Definition) if !block.disabled => {
                debug!("Registering definition block '{}' ({})", block.id, block.kind);
                if let Output::Statement(text) = generator.block_to_code(id) {
                    body.push_str(&text);
                }
            }
            Some(Shape::Value) => {
                debug!(
                    "Skipping free-floating value block '{}' ({})",
                    block.id, block.kind
                );
            }
            _ => {
                debug!("Generating stack starting at '{}' ({})", block.id, block.kind);
                body.push_str(&generator.chain_to_code(id));
            }
        }
    }

    let source = generator.render(&body);
    GeneratedProgram {
        source,
        diagnostics: generator.ctx.take_diagnostics(),
    }
}

pub struct Generator<'a> {
    workspace: &'a Workspace,
    options: GeneratorOptions,
    pub ctx: CompilationContext,
    definitions: HashMap<String, Option<BlockDefinition>>,
    active: HashSet<BlockId>,
    temp_counter: usize,
}

impl<'a> Generator<'a> {
    pub fn new(workspace: &'a Workspace, options: GeneratorOptions) -> Self {
        Self {
            workspace,
            options,
            ctx: CompilationContext::new(),
            definitions: HashMap::new(),
            active: HashSet::new(),
            temp_counter: 0,
        }
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn board(&self) -> Board {
        self.options.board
    }

    pub fn definition(&mut self, kind: &str) -> Option<&BlockDefinition> {
        let board = self.options.board;
        self.definitions
            .entry(kind.to_string())
            .or_insert_with(|| definitions::definition(kind, board))
            .as_ref()
    }

    fn shape_of(&mut self, kind: &str) -> Option<Shape> {
        self.definition(kind).map(|d| d.shape)
    }

    pub fn field(&mut self, block: &Block, name: &str) -> String {
        if let Some(value) = block.field(name) {
            return value.to_string();
        }
        self.definition(&block.kind)
            .and_then(|d| d.field_default(name))
            .unwrap_or_default()
            .to_string()
    }

    pub fn block_to_code(&mut self, id: BlockId) -> Output {
        let workspace = self.workspace;
        let block = workspace.block(id);
        if !self.active.insert(id) {
            let line = self.warning(block, "Block is connected to itself; skipped.");
            return Output::Statement(line);
        }
        trace!("Generating block '{}' ({})", block.id, block.kind);
        let output = match generators::generate(self, block) {
            Some(output) => output,
            None => {
                warn!("No generator for block type '{}'", block.kind);
                let message = format!("Unknown block type \"{}\"", block.kind);
                Output::Statement(self.warning(block, message))
            }
        };
        self.active.remove(&id);
        output
    }

    /// Text and precedence of the expression plugged into `socket`, or
    /// `None` when the socket is empty. A block that produced a diagnostic
    /// instead of a value comes back as that comment followed by the socket
    /// default.
    pub fn expression(&mut self, block: &Block, socket: &str) -> Option<(String, Order)> {
        let workspace = self.workspace;
        let child_id = *block.values.get(socket)?;
        let child = workspace.block(child_id);
        if child.disabled {
            return None;
        }
        match self.block_to_code(child_id) {
            Output::Expression(code, order) => Some((code, order)),
            Output::Statement(text) => {
                let head = text.trim_start();
                let line = if head.starts_with("// WARNING:") || head.starts_with("// ERROR:") {
                    text
                } else {
                    warn!(
                        "Statement block '{}' plugged into value socket {} of '{}'",
                        child.id, socket, block.id
                    );
                    self.warning(child, "A statement block cannot be used as a value.")
                };
                let fallback = self.socket_default(block, socket);
                Some((
                    generators::commented_value(&line, &fallback),
                    Order::Atomic,
                ))
            }
        }
    }

    pub fn value_to_code(&mut self, block: &Block, socket: &str, outer: Order) -> Option<String> {
        self.expression(block, socket)
            .map(|(code, inner)| wrap(code, inner, outer))
    }

    pub fn value_or_default(&mut self, block: &Block, socket: &str, outer: Order) -> String {
        if let Some(code) = self.value_to_code(block, socket, outer) {
            return code;
        }
        self.socket_default(block, socket)
    }

    pub fn socket_default(&mut self, block: &Block, socket: &str) -> String {
        self.definition(&block.kind)
            .and_then(|d| d.value_default(socket))
            .unwrap_or("0")
            .to_string()
    }

    /// Value of `socket`, clamped to `[min, max]` when it is a literal.
    /// Non-literal values are passed through for the runtime to handle.
    pub fn clamped_value(
        &mut self,
        block: &Block,
        socket: &str,
        min: i64,
        max: i64,
        outer: Order,
    ) -> String {
        let (code, order) = match self.expression(block, socket) {
            Some(found) => found,
            None => (self.socket_default(block, socket), Order::Atomic),
        };
        match int_literal(&code) {
            Some(n) => clamp(n, min, max).to_string(),
            None => wrap(code, order, outer),
        }
    }

    pub fn pin(&mut self, block: &Block, name: &str) -> String {
        match PinSource::of(block, name) {
            PinSource::Programmable => self.value_or_default(block, name, Order::None),
            PinSource::Fixed => {
                let value = self.field(block, name);
                if value.is_empty() {
                    "0".to_string()
                } else {
                    value
                }
            }
        }
    }

    pub fn statement_to_code(&mut self, block: &Block, socket: &str) -> String {
        let Some(head) = block.statements.get(socket).copied() else {
            return String::new();
        };
        indent_lines(&self.chain_to_code(head), INDENT)
    }

    pub fn chain_to_code(&mut self, start: BlockId) -> String {
        let workspace = self.workspace;
        let mut code = String::new();
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            let block = workspace.block(id);
            if !visited.insert(id) {
                code.push_str(&self.warning(block, "Cyclic statement chain; stopped here."));
                break;
            }
            if !block.disabled {
                match self.block_to_code(id) {
                    Output::Statement(text) => code.push_str(&text),
                    Output::Expression(text, _) => {
                        debug!("Dropping expression '{}' found in a statement chain", text);
                    }
                }
            }
            current = block.next;
        }
        code
    }

    pub fn warning(&mut self, block: &Block, message: impl Into<String>) -> String {
        self.ctx
            .diagnose(Severity::Warning, &block.id, &block.kind, message)
    }

    pub fn error(&mut self, block: &Block, message: impl Into<String>) -> String {
        self.ctx
            .diagnose(Severity::Error, &block.id, &block.kind, message)
    }

    pub fn temp_name(&mut self, prefix: &str) -> String {
        let name = format!("_{}{}", prefix, self.temp_counter);
        self.temp_counter += 1;
        name
    }

    fn render(&self, body: &str) -> String {
        let mut sections: Vec<String> = Vec::new();

        let includes = self.ctx.includes().collect::<Vec<_>>();
        sections.push(section(
            "Libraries and Definitions",
            &includes.join("\n"),
        ));

        let mut globals = self
            .ctx
            .globals()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        globals.extend(self.variable_declarations());
        if !globals.is_empty() {
            sections.push(section("Global Variables and Objects", &globals.join("\n")));
        }

        let declarations = self.ctx.method_declarations().collect::<Vec<_>>();
        if !declarations.is_empty() {
            sections.push(section("Function Declarations", &declarations.join("\n")));
        }

        let methods = self
            .ctx
            .methods()
            .map(|m| m.trim_end().to_string())
            .collect::<Vec<_>>();
        if !methods.is_empty() {
            sections.push(section("Functions", &methods.join("\n\n")));
        }

        let mut main = String::from("int main() {\n");
        for setup in self.ctx.setups() {
            main.push_str(&indent_lines(&ensure_newline(setup), INDENT));
        }
        main.push_str(&indent_lines(body, INDENT));
        main.push('}');
        sections.push(section("Main Program", &main));

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    /// Declarations for every program variable: typed ones in the order they
    /// were first assigned, then editor variables nothing assigned as `int`.
    fn variable_declarations(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut declared = HashSet::new();
        for (name, ty) in self.ctx.typed_variables() {
            declared.insert(name.to_string());
            out.push(declare(name, ty, self.ctx.var_length(name)));
        }
        for raw in self.workspace.variables() {
            let name = generators::variables::c_identifier(raw);
            if self.ctx.has_global(&generators::arrays::global_key(&name)) {
                continue;
            }
            if declared.insert(name.clone()) {
                out.push(declare(&name, CType::Int, None));
            }
        }
        out
    }
}

fn declare(name: &str, ty: CType, length: Option<usize>) -> String {
    match ty {
        CType::Char => format!(
            "char {}[{}];",
            name,
            length.unwrap_or(DEFAULT_TEXT_LENGTH)
        ),
        CType::CharPointer => format!("char *{};", name),
        other => format!("{} {};", other.c_name(), name),
    }
}

fn section(title: &str, text: &str) -> String {
    format!("// ------ {} ------\n{}", title, text)
}

fn ensure_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

pub fn indent_lines(code: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(code.len() + prefix.len() * 4);
    for line in code.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

/// Integer value of generated text that is a plain (possibly negated,
/// possibly parenthesized) decimal literal.
pub fn int_literal(code: &str) -> Option<i64> {
    let mut text = code.trim();
    while text.starts_with('(') && text.ends_with(')') {
        text = text[1..text.len() - 1].trim();
    }
    text.parse::<i64>().ok()
}

pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}
