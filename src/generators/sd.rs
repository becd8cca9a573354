use super::variables::c_identifier;
use super::{duplicate_initializer, literal_length, string_literal_body};
use crate::codegen::{int_literal, Generator, Output};
use crate::context::CType;
use crate::order::Order;
use crate::workspace::Block;
use anyhow::{anyhow, Result};
use regex::Regex;

const CARD_SETUP: &str = "sd_card";
const FILE_HANDLE: &str = "sd_file";

/// Checks that the SD card will be mounted before `block` runs. The Activity
/// Board's built-in socket is mounted automatically; every other board needs
/// an `sd_init` block. Returns the warning line when the card is unusable.
pub(crate) fn require_card(g: &mut Generator<'_>, block: &Block) -> Option<String> {
    if g.workspace().contains_type("sd_init") {
        return None;
    }
    if g.board().has_builtin_sd() {
        g.ctx.add_setup(CARD_SETUP, "sd_mount(22, 23, 24, 25);");
        return None;
    }
    Some(g.warning(
        block,
        "You must use a SD initialize block at the beginning of your program!",
    ))
}

fn require_open_file(g: &mut Generator<'_>, block: &Block) -> Option<String> {
    if let Some(line) = require_card(g, block) {
        return Some(line);
    }
    if g.workspace().contains_type("sd_open") {
        g.ctx.add_global(FILE_HANDLE, "FILE *fp;");
        return None;
    }
    Some(g.warning(block, "You must open a file with the SD file open block first!"))
}

/// 8.3 file name for the card's FAT file system. The stem keeps its first
/// eight characters and the extension its first three.
pub fn short_filename(raw: &str, default_ext: &str) -> Result<String> {
    let pattern = Regex::new(r"^\s*([A-Za-z0-9_~-]+)(?:\.([A-Za-z0-9]+))?\s*$")?;
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| anyhow!("\"{}\" is not a valid SD card file name", raw.trim()))?;
    let stem = captures[1].chars().take(8).collect::<String>();
    let ext = captures
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or(default_ext)
        .chars()
        .take(3)
        .collect::<String>();
    Ok(format!("{}.{}", stem, ext))
}

pub fn init(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = duplicate_initializer(g, block, "SD initialize") {
        return Output::statement(line);
    }
    let pins = ["DO", "CLK", "DI", "CS"]
        .iter()
        .map(|name| g.pin(block, name))
        .collect::<Vec<_>>();
    g.ctx
        .replace_setup(CARD_SETUP, format!("sd_mount({});", pins.join(", ")));
    Output::statement("")
}

pub fn open(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = require_card(g, block) {
        return Output::statement(line);
    }
    let filename = match short_filename(&g.field(block, "FILENAME"), "txt") {
        Ok(name) => name,
        Err(e) => return Output::statement(g.warning(block, format!("{}!", e))),
    };
    let mode = match g.field(block, "MODE").as_str() {
        "w" => "w",
        "a" => "a",
        _ => "r",
    };
    g.ctx.add_global(FILE_HANDLE, "FILE *fp;");
    Output::statement(format!("fp = fopen(\"{}\", \"{}\");\n", filename, mode))
}

/// Reads SIZE bytes into a text buffer, sizing the buffer when SIZE is a
/// literal.
pub fn read(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = require_open_file(g, block) {
        return Output::statement(line);
    }
    let size = g.value_or_default(block, "SIZE", Order::None);
    let var = c_identifier(&g.field(block, "VAR"));
    g.ctx.set_var_type(&var, CType::Char);
    if let Some(n) = int_literal(&size).filter(|n| *n > 0) {
        g.ctx.set_var_length(&var, n as usize + 1);
    }
    Output::statement(format!("fread({}, 1, {}, fp);\n", var, size))
}

pub fn write(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = require_open_file(g, block) {
        return Output::statement(line);
    }
    let value = g.value_or_default(block, "VALUE", Order::None);
    let length = match string_literal_body(&value) {
        Some(body) => literal_length(body).to_string(),
        None => {
            g.ctx.add_include("string", "#include <string.h>");
            format!("strlen({})", value)
        }
    };
    Output::statement(format!("fwrite({}, 1, {}, fp);\n", value, length))
}

pub fn close(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = require_open_file(g, block) {
        return Output::statement(line);
    }
    Output::statement("fclose(fp);\n")
}
