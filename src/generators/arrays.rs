use super::failed_expression;
use super::variables::c_identifier;
use crate::codegen::{clamp, int_literal, Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

const MAX_ARRAY_SIZE: i64 = 2048;

pub fn global_key(name: &str) -> String {
    format!("array_{}", name)
}

fn array_name(g: &mut Generator<'_>, block: &Block) -> String {
    c_identifier(&g.field(block, "VAR"))
}

fn declared_size(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .map(|n| clamp(n, 1, MAX_ARRAY_SIZE))
        .unwrap_or(10)
}

/// Size of the array as its first initializer declares it, if one exists.
fn initialized_size(g: &Generator<'_>, name: &str) -> Option<i64> {
    let workspace = g.workspace();
    workspace
        .blocks_of_type_in_program_order("array_init")
        .into_iter()
        .map(|id| workspace.block(id))
        .find(|b| c_identifier(b.field_or("VAR", "list")) == name)
        .map(|b| declared_size(b.field_or("NUM", "10")))
}

fn not_initialized(g: &mut Generator<'_>, block: &Block, name: &str) -> String {
    g.error(
        block,
        format!("The array \"{}\" has not been initialized!", name),
    )
}

/// Element index. Literal indexes are kept inside the array.
fn index(g: &mut Generator<'_>, block: &Block, size: i64) -> String {
    let raw = g.value_or_default(block, "NUM", Order::None);
    match int_literal(&raw) {
        Some(n) => clamp(n, 0, size - 1).to_string(),
        None => raw,
    }
}

pub fn init(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = array_name(g, block);
    let size = declared_size(&g.field(block, "NUM"));
    let declaration = format!("int {}[{}];", name, size);
    if !g.ctx.add_global(&global_key(&name), declaration) && initialized_size(g, &name) != Some(size) {
        let line = g.warning(
            block,
            format!(
                "The array \"{}\" is initialized more than once with different sizes!",
                name
            ),
        );
        return Output::statement(line);
    }
    Output::statement("")
}

pub fn get(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = array_name(g, block);
    let Some(size) = initialized_size(g, &name) else {
        let line = not_initialized(g, block, &name);
        return failed_expression(&line, "0");
    };
    let index = index(g, block, size);
    Output::expression(format!("{}[{}]", name, index), Order::UnaryPostfix)
}

pub fn set(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = array_name(g, block);
    let Some(size) = initialized_size(g, &name) else {
        return Output::statement(not_initialized(g, block, &name));
    };
    let index = index(g, block, size);
    let value = g.value_or_default(block, "VALUE", Order::Assignment);
    Output::statement(format!("{}[{}] = {};\n", name, index, value))
}

/// Copies a literal list into the array. Values past the array's end are
/// dropped with a warning.
pub fn fill(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = array_name(g, block);
    let Some(size) = initialized_size(g, &name) else {
        return Output::statement(not_initialized(g, block, &name));
    };
    let raw = g.field(block, "NUM");
    let mut values = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| match int_literal(v) {
            Some(n) => n.to_string(),
            None => "0".to_string(),
        })
        .collect::<Vec<_>>();
    if values.is_empty() {
        return Output::statement(g.warning(block, format!("No values given to fill the array \"{}\".", name)));
    }

    let mut code = String::new();
    if values.len() as i64 > size {
        values.truncate(size as usize);
        code.push_str(&g.warning(
            block,
            format!(
                "The array \"{}\" only has {} elements; extra values were dropped.",
                name, size
            ),
        ));
    }
    g.ctx.add_include("string", "#include <string.h>");
    let temp = g.temp_name("tmpArr");
    code.push_str(&format!(
        "int {}[] = {{{}}};\nmemcpy({}, {}, {} * sizeof(int));\n",
        temp,
        values.join(", "),
        name,
        temp,
        values.len()
    ));
    Output::statement(code)
}

pub fn clear(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = array_name(g, block);
    if initialized_size(g, &name).is_none() {
        return Output::statement(not_initialized(g, block, &name));
    }
    g.ctx.add_include("string", "#include <string.h>");
    Output::statement(format!("memset({}, 0, sizeof {});\n", name, name))
}
