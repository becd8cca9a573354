use super::string_literal_body;
use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

fn newline_requested(g: &mut Generator<'_>, block: &Block) -> bool {
    g.field(block, "NEWLINE") == "TRUE"
}

/// Prints text. A literal is passed as the format string itself, so any `%`
/// inside it is doubled; anything else goes through `%s`.
pub fn print(g: &mut Generator<'_>, block: &Block) -> Output {
    let message = g.value_or_default(block, "MESSAGE", Order::None);
    let newline = if newline_requested(g, block) { "\\r" } else { "" };
    let code = match string_literal_body(&message) {
        Some(body) => format!("print(\"{}{}\");\n", body.replace('%', "%%"), newline),
        None => format!("print(\"%s{}\", {});\n", newline, message),
    };
    Output::statement(code)
}

pub fn print_variables(g: &mut Generator<'_>, block: &Block) -> Output {
    let value = g.value_or_default(block, "VALUE", Order::None);
    let format = match g.field(block, "FORMAT").as_str() {
        "HEX" => "%x",
        "BIN" => "%b",
        "CHAR" => "%c",
        "FLOAT" => "%f",
        _ => "%d",
    };
    let newline = if newline_requested(g, block) { "\\r" } else { "" };
    Output::statement(format!("print(\"{}{}\", {});\n", format, newline, value))
}

pub fn newline(_g: &mut Generator<'_>, _block: &Block) -> Output {
    Output::statement("print(\"\\r\");\n")
}
