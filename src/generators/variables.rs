use super::string_literal_body;
use crate::codegen::{Generator, Output};
use crate::context::CType;
use crate::order::Order;
use crate::workspace::Block;

/// C keywords plus the simpletools calls generated code relies on.
const RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "main", "high", "low", "input", "toggle",
    "reverse", "pause", "print", "CNT", "INA", "OUTA", "DIRA",
];

/// Turns an editor variable name into a legal C identifier that cannot
/// collide with a keyword or a library call.
pub fn c_identifier(raw: &str) -> String {
    let mut name: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("unnamed");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if RESERVED.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

pub fn get(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = c_identifier(&g.field(block, "VAR"));
    Output::expression(name, Order::Atomic)
}

/// Assignment. The first assignment decides the variable's declared type
/// unless some block reads text into the variable, which makes it a buffer
/// from the start. Buffers take values through `strcpy`.
pub fn set(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = c_identifier(&g.field(block, "VAR"));
    let value = g.value_or_default(block, "VALUE", Order::Assignment);
    let ty = if reads_text_into(g, &name) {
        g.ctx.set_var_type(&name, CType::Char);
        CType::Char
    } else {
        g.ctx.infer_var_type(&name, &value)
    };
    if ty == CType::Char {
        g.ctx.add_include("string", "#include <string.h>");
        if let Some(body) = string_literal_body(&value) {
            g.ctx.set_var_length(&name, super::literal_length(body) + 1);
        }
        return Output::statement(format!("strcpy({}, {});\n", name, value));
    }
    Output::statement(format!("{} = {};\n", name, value))
}

/// Whether an SD read or a text EEPROM read anywhere in the workspace fills
/// the variable `name`.
fn reads_text_into(g: &mut Generator<'_>, name: &str) -> bool {
    let workspace = g.workspace();
    let readers = workspace.find_all(|b| b.kind == "sd_read" || b.kind == "eeprom_read");
    readers.into_iter().any(|id| {
        let reader = workspace.block(id);
        if reader.kind == "eeprom_read" && g.field(reader, "TYPE") != "TEXT" {
            return false;
        }
        c_identifier(&g.field(reader, "VAR")) == name
    })
}
