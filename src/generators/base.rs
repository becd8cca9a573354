use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

pub fn comment(g: &mut Generator<'_>, block: &Block) -> Output {
    let text = g.field(block, "COMMENT_TEXT");
    let single_line = text.replace(['\r', '\n'], " ");
    Output::statement(format!("// {}\n", single_line.trim_end()))
}

/// User-written C placed into the section named by LOCATION. Each block
/// registers under its own id, so two identical snippets both survive.
pub fn custom_code(g: &mut Generator<'_>, block: &Block) -> Output {
    let code = g.field(block, "CODE");
    let key = format!("custom_code_{}", block.id);
    match g.field(block, "LOCATION").as_str() {
        "includes" => {
            g.ctx.add_include(&key, code);
        }
        "globals" => {
            g.ctx.add_global(&key, code);
        }
        "setups" => {
            g.ctx.add_setup(&key, code);
        }
        "functions" => {
            g.ctx.add_method(&key, code);
        }
        _ => {
            if code.trim().is_empty() {
                return Output::statement("");
            }
            let mut line = code;
            if !line.ends_with('\n') {
                line.push('\n');
            }
            return Output::statement(line);
        }
    }
    Output::statement("")
}

pub fn pause(g: &mut Generator<'_>, block: &Block) -> Output {
    let ms = g.value_or_default(block, "PAUSE_TIME", Order::None);
    Output::statement(format!("pause({});\n", ms))
}

pub fn system_counter(_g: &mut Generator<'_>, _block: &Block) -> Output {
    Output::expression("CNT", Order::Atomic)
}
