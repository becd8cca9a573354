use indexmap::IndexMap;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

pub const DEFAULT_TEXT_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType {
    Int,
    Float,
    /// Fixed-size `char` buffer; the length lives in the length table.
    Char,
    CharPointer,
}

impl CType {
    /// Guesses a variable's type from the text of its first assigned value.
    ///
    /// This is keyword sniffing over generated C, not type inference: a
    /// string literal that happens to contain `int` is typed as an integer.
    /// Generators that know better call `CompilationContext::set_var_type`.
    pub fn sniff(rhs: &str) -> CType {
        let quote = rhs.find('"');
        if rhs.contains("int") {
            CType::Int
        } else if rhs.contains("float") {
            CType::Float
        } else if rhs.contains("char") {
            CType::CharPointer
        } else if matches!(quote, Some(pos) if pos < 3) {
            CType::CharPointer
        } else if rhs.contains('.') {
            CType::Float
        } else {
            CType::Int
        }
    }

    pub fn c_name(self) -> &'static str {
        match self {
            CType::Int => "int",
            CType::Float => "float",
            CType::Char => "char",
            CType::CharPointer => "char *",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub block_id: String,
    pub block_type: String,
    pub message: String,
}

impl Diagnostic {
    pub fn comment(&self) -> String {
        format!("// {}: {}\n", self.severity.label(), self.message)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "severity": self.severity.label().to_lowercase(),
            "block_id": self.block_id,
            "block_type": self.block_type,
            "message": self.message,
        })
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (block '{}' of type {})",
            self.severity.label(),
            self.message,
            self.block_id,
            self.block_type
        )
    }
}

/// Everything blocks register besides their own statement text.
///
/// Each section maps a key naming the resource (a header, a pin's setup
/// call, a helper function) to its source text. Registering a key that is
/// already present keeps the first text, so N blocks sharing a resource
/// produce it once. `replace_setup` is the one overwrite path, for
/// initializer blocks that supersede a generic default.
#[derive(Debug, Clone, Default)]
pub struct CompilationContext {
    includes: IndexMap<String, String>,
    globals: IndexMap<String, String>,
    setups: IndexMap<String, String>,
    method_declarations: IndexMap<String, String>,
    methods: IndexMap<String, String>,
    var_types: IndexMap<String, CType>,
    var_lengths: IndexMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_include(&mut self, key: &str, line: impl Into<String>) -> bool {
        insert_once(&mut self.includes, key, line.into())
    }

    pub fn add_global(&mut self, key: &str, declaration: impl Into<String>) -> bool {
        insert_once(&mut self.globals, key, declaration.into())
    }

    pub fn add_setup(&mut self, key: &str, statement: impl Into<String>) -> bool {
        insert_once(&mut self.setups, key, statement.into())
    }

    pub fn add_method_declaration(&mut self, key: &str, prototype: impl Into<String>) -> bool {
        insert_once(&mut self.method_declarations, key, prototype.into())
    }

    pub fn add_method(&mut self, key: &str, body: impl Into<String>) -> bool {
        insert_once(&mut self.methods, key, body.into())
    }

    /// Last write wins; the key keeps the position of its first insertion.
    pub fn replace_setup(&mut self, key: &str, statement: impl Into<String>) {
        self.setups.insert(key.to_string(), statement.into());
    }

    pub fn has_global(&self, key: &str) -> bool {
        self.globals.contains_key(key)
    }

    /// Records the type of `name` from its first assignment. Later
    /// assignments do not retype the variable.
    pub fn infer_var_type(&mut self, name: &str, rhs: &str) -> CType {
        if let Some(existing) = self.var_types.get(name) {
            return *existing;
        }
        let sniffed = CType::sniff(rhs);
        self.var_types.insert(name.to_string(), sniffed);
        sniffed
    }

    pub fn set_var_type(&mut self, name: &str, ty: CType) {
        self.var_types.insert(name.to_string(), ty);
    }

    pub fn set_var_length(&mut self, name: &str, length: usize) {
        let slot = self.var_lengths.entry(name.to_string()).or_insert(length);
        if *slot < length {
            *slot = length;
        }
    }

    pub fn var_type(&self, name: &str) -> Option<CType> {
        self.var_types.get(name).copied()
    }

    pub fn var_length(&self, name: &str) -> Option<usize> {
        self.var_lengths.get(name).copied()
    }

    pub fn diagnose(
        &mut self,
        severity: Severity,
        block_id: &str,
        block_type: &str,
        message: impl Into<String>,
    ) -> String {
        let diagnostic = Diagnostic {
            severity,
            block_id: block_id.to_string(),
            block_type: block_type.to_string(),
            message: message.into(),
        };
        let comment = diagnostic.comment();
        self.diagnostics.push(diagnostic);
        comment
    }

    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.includes.values().map(String::as_str)
    }

    pub fn globals(&self) -> impl Iterator<Item = &str> {
        self.globals.values().map(String::as_str)
    }

    pub fn setups(&self) -> impl Iterator<Item = &str> {
        self.setups.values().map(String::as_str)
    }

    pub fn method_declarations(&self) -> impl Iterator<Item = &str> {
        self.method_declarations.values().map(String::as_str)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.values().map(String::as_str)
    }

    pub fn typed_variables(&self) -> impl Iterator<Item = (&str, CType)> {
        self.var_types.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

fn insert_once(map: &mut IndexMap<String, String>, key: &str, text: String) -> bool {
    if map.contains_key(key) {
        return false;
    }
    map.insert(key.to_string(), text);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repeated_registration_keeps_one_entry() {
        let mut ctx = CompilationContext::new();
        assert!(ctx.add_include("sound", "#include \"sound.h\""));
        assert!(!ctx.add_include("sound", "#include \"sound.h\""));
        assert!(!ctx.add_include("sound", "#include \"other.h\""));
        assert_eq!(ctx.includes().collect::<Vec<_>>(), vec!["#include \"sound.h\""]);
    }

    #[test]
    fn setups_keep_insertion_order_and_replace_in_place() {
        let mut ctx = CompilationContext::new();
        ctx.add_setup("sd_card", "sd_mount(22, 23, 24, 25);");
        ctx.add_setup("servo", "servo_setramp(12, 5);");
        ctx.replace_setup("sd_card", "sd_mount(0, 1, 2, 3);");
        assert_eq!(
            ctx.setups().collect::<Vec<_>>(),
            vec!["sd_mount(0, 1, 2, 3);", "servo_setramp(12, 5);"]
        );
    }

    #[test]
    fn first_assignment_decides_variable_type() {
        let mut ctx = CompilationContext::new();
        assert_eq!(ctx.infer_var_type("speed", "3.5"), CType::Float);
        assert_eq!(ctx.infer_var_type("speed", "7"), CType::Float);
        assert_eq!(ctx.var_type("speed"), Some(CType::Float));
    }

    #[test]
    fn sniffing_follows_keyword_heuristic() {
        assert_eq!(CType::sniff("42"), CType::Int);
        assert_eq!(CType::sniff("\"hello\""), CType::CharPointer);
        assert_eq!(CType::sniff("(float) x"), CType::Float);
        assert_eq!(CType::sniff("a.b"), CType::Float);
        // Text that mentions `int` is typed by the keyword, not the quotes.
        assert_eq!(CType::sniff("\"print\""), CType::Int);
    }

    #[test]
    fn var_length_keeps_maximum() {
        let mut ctx = CompilationContext::new();
        ctx.set_var_length("buf", 10);
        ctx.set_var_length("buf", 4);
        ctx.set_var_length("buf", 32);
        assert_eq!(ctx.var_length("buf"), Some(32));
    }

    #[test]
    fn diagnose_returns_comment_and_records() {
        let mut ctx = CompilationContext::new();
        let line = ctx.diagnose(Severity::Error, "b1", "array_fill", "bad");
        assert_eq!(line, "// ERROR: bad\n");
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].to_json()["severity"], "error");
    }
}
