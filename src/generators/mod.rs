//! Per-block generators.
//!
//! Each generator reads its block's fields, pulls connected expressions and
//! statement lists through the `Generator`, registers shared resources in
//! the compilation context, and returns its own fragment. Structural misuse
//! is reported by returning a diagnostic comment in place of the code.

pub mod arrays;
pub mod audio;
pub mod base;
pub mod console;
pub mod control;
pub mod eeprom;
pub mod gpio;
pub mod math;
pub mod robot;
pub mod scribbler;
pub mod sd;
pub mod servo;
pub mod variables;

use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

pub fn generate(g: &mut Generator<'_>, block: &Block) -> Option<Output> {
    let output = match block.kind.as_str() {
        "comment" => base::comment(g, block),
        "custom_code" => base::custom_code(g, block),
        "pause" => base::pause(g, block),
        "system_counter" => base::system_counter(g, block),

        "controls_if" => control::controls_if(g, block),
        "controls_repeat" => control::controls_repeat(g, block),
        "controls_for" => control::controls_for(g, block),
        "controls_break" => control::controls_break(g, block),
        "procedures_defnoreturn" => control::procedure_definition(g, block),
        "procedures_callnoreturn" => control::procedure_call(g, block),
        "cog_new" => control::cog_new(g, block),

        "math_number" => math::number(g, block),
        "math_arithmetic" => math::arithmetic(g, block),
        "math_limit" => math::limit(g, block),
        "math_crement" => math::crement(g, block),
        "math_random" => math::random(g, block),
        "logic_boolean" => math::boolean(g, block),
        "logic_compare" => math::compare(g, block),
        "logic_operation" => math::operation(g, block),
        "logic_negate" => math::negate(g, block),
        "string_type_block" => math::text(g, block),

        "variables_get" => variables::get(g, block),
        "variables_set" => variables::set(g, block),

        "array_init" => arrays::init(g, block),
        "array_get" => arrays::get(g, block),
        "array_set" => arrays::set(g, block),
        "array_fill" => arrays::fill(g, block),
        "array_clear" => arrays::clear(g, block),

        "console_print" => console::print(g, block),
        "console_print_variables" => console::print_variables(g, block),
        "console_newline" => console::newline(g, block),

        "make_pin" => gpio::make_pin(g, block),
        "make_pin_input" => gpio::make_pin(g, block),
        "check_pin" => gpio::check_pin(g, block),
        "check_pin_input" => gpio::check_pin(g, block),
        "set_pins" => gpio::set_pins(g, block),
        "pwm_start" => gpio::pwm_start(g, block),
        "pwm_set" => gpio::pwm_set(g, block),
        "pwm_stop" => gpio::pwm_stop(g, block),

        "base_freqout" => audio::freqout(g, block),
        "sound_init" => audio::sound_init(g, block),
        "sound_play" => audio::sound_play(g, block),
        "wav_play" => audio::wav_play(g, block),
        "wav_volume" => audio::wav_volume(g, block),
        "wav_stop" => audio::wav_stop(g, block),

        "sd_init" => sd::init(g, block),
        "sd_open" => sd::open(g, block),
        "sd_read" => sd::read(g, block),
        "sd_write" => sd::write(g, block),
        "sd_close" => sd::close(g, block),

        "servo_move" => servo::angle(g, block),
        "servo_speed" => servo::speed(g, block),
        "servo_set_ramp" => servo::ramp(g, block),

        "eeprom_write" => eeprom::write(g, block),
        "eeprom_read" => eeprom::read(g, block),

        "ab_drive_init" => robot::init(g, block),
        "ab_drive_goto" => robot::goto(g, block),
        "ab_drive_speed" => robot::speed(g, block),
        "ab_drive_stop" => robot::stop(g, block),

        "scribbler_drive" => scribbler::drive(g, block),
        "scribbler_stop" => scribbler::stop(g, block),
        "scribbler_led" => scribbler::led(g, block),
        "scribbler_play" => scribbler::play(g, block),
        "scribbler_simple_line" => scribbler::simple_line(g, block),
        "scribbler_simple_obstacle" => scribbler::simple_obstacle(g, block),
        _ => return None,
    };
    Some(output)
}

/// Warning for every initializer of `block.kind` after the first one the
/// program reaches. Initializers configure a single shared peripheral.
pub(crate) fn duplicate_initializer(g: &mut Generator<'_>, block: &Block, label: &str) -> Option<String> {
    let workspace = g.workspace();
    let ordered = workspace.blocks_of_type_in_program_order(&block.kind);
    let first = ordered.first().map(|id| workspace.block(*id))?;
    if std::ptr::eq(first, block) {
        return None;
    }
    Some(g.warning(
        block,
        format!("Only one {} block may be used! This one is ignored.", label),
    ))
}

/// Expression standing in for a block whose precondition failed: the
/// diagnostic as a block comment, followed by a harmless value.
pub(crate) fn failed_expression(comment_line: &str, fallback: &str) -> Output {
    Output::expression(commented_value(comment_line, fallback), Order::Atomic)
}

/// `fallback` preceded by the diagnostic lines of `comment_lines` as one
/// block comment.
pub(crate) fn commented_value(comment_lines: &str, fallback: &str) -> String {
    let text = comment_lines
        .lines()
        .map(|line| line.trim().trim_start_matches("// "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "* /");
    format!("/* {} */ {}", text, fallback)
}

pub fn quote_c_string(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}

pub fn string_literal_body(code: &str) -> Option<&str> {
    let code = code.trim();
    if code.len() < 2 || !code.starts_with('"') || !code.ends_with('"') {
        return None;
    }
    let body = &code[1..code.len() - 1];
    let mut escaped = false;
    for c in body.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return None;
        }
    }
    Some(body)
}

/// Number of bytes the literal body stands for, counting each escape once.
pub fn literal_length(body: &str) -> usize {
    let mut len = 0;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        }
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quotes_and_escapes() {
        assert_eq!(quote_c_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn literal_body_rejects_concatenations() {
        assert_eq!(string_literal_body("\"abc\""), Some("abc"));
        assert_eq!(string_literal_body("\"a\" \"b\""), None);
        assert_eq!(string_literal_body("name"), None);
    }

    #[test]
    fn literal_length_counts_escapes_once() {
        assert_eq!(literal_length("ab\\n"), 3);
        assert_eq!(literal_length(""), 0);
    }

    #[test]
    fn failed_expression_keeps_message() {
        let out = failed_expression("// ERROR: missing thing\n", "0");
        assert_eq!(out, Output::expression("/* ERROR: missing thing */ 0", Order::Atomic));
    }
}
