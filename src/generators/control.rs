use super::variables::c_identifier;
use crate::codegen::{int_literal, Generator, Output};
use crate::context::CType;
use crate::definitions::RepeatVariant;
use crate::order::Order;
use crate::workspace::Block;

pub fn controls_if(g: &mut Generator<'_>, block: &Block) -> Output {
    let branches = block.mutation_count("elseif") + 1;
    let mut code = String::new();
    for n in 0..branches {
        let condition = g.value_or_default(block, &format!("IF{}", n), Order::None);
        let body = g.statement_to_code(block, &format!("DO{}", n));
        let keyword = if n == 0 { "if" } else { "} else if" };
        code.push_str(&format!("{} ({}) {{\n{}", keyword, condition, body));
    }
    if block.mutation_count("else") > 0 || block.statements.contains_key("ELSE") {
        code.push_str("} else {\n");
        code.push_str(&g.statement_to_code(block, "ELSE"));
    }
    code.push_str("}\n");
    Output::statement(code)
}

pub fn controls_repeat(g: &mut Generator<'_>, block: &Block) -> Output {
    let variant = RepeatVariant::from_block(block);
    let socket = variant.socket().unwrap_or_default();
    let head = match variant {
        RepeatVariant::Forever => "while (1)".to_string(),
        RepeatVariant::Times => {
            let times = g.value_or_default(block, socket, Order::Relational);
            let counter = g.temp_name("n");
            format!(
                "for (int {c} = 0; {c} < {t}; {c}++)",
                c = counter,
                t = times
            )
        }
        RepeatVariant::While => {
            let condition = g.value_or_default(block, socket, Order::None);
            format!("while ({})", condition)
        }
        RepeatVariant::Until => {
            let condition = g.value_or_default(block, socket, Order::UnaryPrefix);
            format!("while (!{})", condition)
        }
    };
    let body = g.statement_to_code(block, "DO");
    Output::statement(format!("{} {{\n{}}}\n", head, body))
}

/// Counting loop. With literal bounds the direction is fixed at generation
/// time. Otherwise the bounds are evaluated once into temporaries and the
/// direction is chosen from them at run time.
pub fn controls_for(g: &mut Generator<'_>, block: &Block) -> Output {
    let var = c_identifier(&g.field(block, "VAR"));
    g.ctx.set_var_type(&var, CType::Int);
    let start = g.value_or_default(block, "START", Order::Assignment);
    let end = g.value_or_default(block, "END", Order::Assignment);
    let step = g.value_or_default(block, "STEP", Order::None);

    let head = match (int_literal(&start), int_literal(&end), int_literal(&step)) {
        (Some(from), Some(to), Some(by)) => {
            let by = by.abs().max(1);
            if from <= to {
                format!("for ({v} = {}; {v} <= {}; {v} += {})", from, to, by, v = var)
            } else {
                format!("for ({v} = {}; {v} >= {}; {v} -= {})", from, to, by, v = var)
            }
        }
        _ => {
            g.ctx.add_include("stdlib", "#include <stdlib.h>");
            let from = g.temp_name("from");
            let to = g.temp_name("to");
            let by = g.temp_name("by");
            format!(
                "int {f} = {s};\nint {t} = {e};\nint {b} = abs({st});\nfor ({v} = {f}; {f} <= {t} ? {v} <= {t} : {v} >= {t}; {v} += {f} <= {t} ? {b} : -{b})",
                v = var,
                f = from,
                t = to,
                b = by,
                s = start,
                e = end,
                st = step
            )
        }
    };
    let body = g.statement_to_code(block, "DO");
    Output::statement(format!("{} {{\n{}}}\n", head, body))
}

pub fn controls_break(_g: &mut Generator<'_>, _block: &Block) -> Output {
    Output::statement("break;\n")
}

pub fn procedure_definition(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = c_identifier(&g.field(block, "NAME"));
    let body = g.statement_to_code(block, "STACK");
    g.ctx
        .add_method_declaration(&name, format!("void {}();", name));
    if !g.ctx.add_method(&name, format!("void {}() {{\n{}}}\n", name, body)) {
        let line = g.warning(
            block,
            format!("The function \"{}\" is defined more than once!", name),
        );
        return Output::statement(line);
    }
    Output::statement("")
}

fn called_name(g: &mut Generator<'_>, block: &Block) -> String {
    let raw = match block.mutation_value("name") {
        Some(name) => name.to_string(),
        None => g.field(block, "NAME"),
    };
    c_identifier(&raw)
}

fn is_defined(g: &Generator<'_>, name: &str) -> bool {
    g.workspace()
        .contains_matching("procedures_defnoreturn", |def| {
            c_identifier(def.field_or("NAME", "my_function")) == name
        })
}

pub fn procedure_call(g: &mut Generator<'_>, block: &Block) -> Output {
    let name = called_name(g, block);
    if !is_defined(g, &name) {
        let line = g.warning(block, format!("The function \"{}\" has not been defined!", name));
        return Output::statement(line);
    }
    Output::statement(format!("{}();\n", name))
}

/// Launches a function on a new cog. The METHOD socket must hold a single
/// function call block.
pub fn cog_new(g: &mut Generator<'_>, block: &Block) -> Output {
    let workspace = g.workspace();
    let call = block
        .statements
        .get("METHOD")
        .map(|id| workspace.block(*id))
        .filter(|b| b.kind == "procedures_callnoreturn" && !b.disabled);
    let Some(call) = call else {
        let line = g.warning(block, "Put a function call block inside the new processor block!");
        return Output::statement(line);
    };
    let name = called_name(g, call);
    if !is_defined(g, &name) {
        let line = g.warning(block, format!("The function \"{}\" has not been defined!", name));
        return Output::statement(line);
    }
    let stack = g
        .field(block, "STACK_SIZE")
        .trim()
        .parse::<i64>()
        .map(|n| crate::codegen::clamp(n, 25, 6000))
        .unwrap_or(128);
    Output::statement(format!("cog_run({}, {});\n", name, stack))
}
