use super::duplicate_initializer;
use crate::codegen::{Generator, Output};
use crate::definitions::{PinsAction, SetPinsVariant};
use crate::order::Order;
use crate::workspace::Block;

pub fn make_pin(g: &mut Generator<'_>, block: &Block) -> Output {
    let pin = g.pin(block, "PIN");
    let call = match g.field(block, "ACTION").as_str() {
        "LOW" => "low",
        "TOGGLE" => "toggle",
        "INPUT" => "input",
        "REVERSE" => "reverse",
        _ => "high",
    };
    Output::statement(format!("{}({});\n", call, pin))
}

pub fn check_pin(g: &mut Generator<'_>, block: &Block) -> Output {
    let pin = g.pin(block, "PIN");
    Output::expression(format!("input({})", pin), Order::Atomic)
}

/// Writes a contiguous pin range at once, one bit per pin, highest pin
/// first.
pub fn set_pins(_g: &mut Generator<'_>, block: &Block) -> Output {
    let variant = SetPinsVariant::from_block(block);
    let bits = (variant.start..=variant.end)
        .rev()
        .map(|pin| match block.field(&SetPinsVariant::bit_field(pin)) {
            Some("1") => '1',
            _ => '0',
        })
        .collect::<String>();
    let call = match variant.action {
        PinsAction::State => "set_outputs",
        PinsAction::Direction => "set_directions",
    };
    Output::statement(format!(
        "{}({}, {}, 0b{});\n",
        call, variant.end, variant.start, bits
    ))
}

pub fn pwm_start(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = duplicate_initializer(g, block, "PWM initialize") {
        return Output::statement(line);
    }
    let period = g.clamped_value(block, "PERIOD", 1, i64::from(i32::MAX), Order::None);
    Output::statement(format!("pwm_start({});\n", period))
}

pub fn pwm_set(g: &mut Generator<'_>, block: &Block) -> Output {
    if !g.workspace().contains_type("pwm_start") {
        let line = g.warning(
            block,
            "You must use a PWM initialize block at the beginning of your program!",
        );
        return Output::statement(line);
    }
    let pin = g.pin(block, "PIN");
    let channel = match g.field(block, "CHANNEL").as_str() {
        "1" => "1",
        _ => "0",
    };
    let duty = g.clamped_value(block, "DUTY_CYCLE", 0, 100, Order::None);
    Output::statement(format!("pwm_set({}, {}, {});\n", pin, channel, duty))
}

pub fn pwm_stop(_g: &mut Generator<'_>, _block: &Block) -> Output {
    Output::statement("pwm_stop();\n")
}

#[cfg(test)]
mod tests {
    use crate::codegen::{generate_program, GeneratorOptions};
    use crate::workspace::{Block, Workspace};
    use pretty_assertions::assert_eq;

    fn compile(ws: &Workspace) -> String {
        generate_program(ws, GeneratorOptions::default()).source
    }

    #[test]
    fn make_pin_high() {
        let mut ws = Workspace::new();
        ws.add_top_block(
            Block::new("m", "make_pin")
                .with_field("PIN", "5")
                .with_field("ACTION", "HIGH"),
        );
        let source = compile(&ws);
        assert!(source.contains("int main() {\n  high(5);\n}"));
        assert_eq!(source.matches("high(5);").count(), 1);
    }

    #[test]
    fn programmable_pin_takes_expression() {
        let mut ws = Workspace::new();
        let m = ws.add_top_block(
            Block::new("m", "make_pin_input")
                .with_field("ACTION", "TOGGLE")
                .with_mutation("pinmenu", "program"),
        );
        let sum = ws.add_block(Block::new("s", "math_arithmetic").with_field("OP", "ADD"));
        let v = ws.add_block(Block::new("v", "variables_get").with_field("VAR", "base"));
        let one = ws.add_block(Block::new("o", "math_number").with_field("NUM", "1"));
        ws.connect_value(sum, "A", v);
        ws.connect_value(sum, "B", one);
        ws.connect_value(m, "PIN", sum);
        assert!(compile(&ws).contains("  toggle(base + 1);\n"));
    }

    #[test]
    fn set_pins_writes_bit_mask() {
        let mut ws = Workspace::new();
        ws.add_top_block(
            Block::new("sp", "set_pins")
                .with_field("ACTION", "STATE")
                .with_field("START_PIN", "2")
                .with_field("END_PIN", "5")
                .with_field("P2", "1")
                .with_field("P5", "1"),
        );
        assert!(compile(&ws).contains("  set_outputs(5, 2, 0b1001);\n"));
    }

    #[test]
    fn duty_cycle_is_clamped() {
        let mut ws = Workspace::new();
        let start = ws.add_top_block(Block::new("ps", "pwm_start"));
        let set = ws.add_block(Block::new("pw", "pwm_set").with_field("PIN", "3").with_field("CHANNEL", "1"));
        let duty = ws.add_block(Block::new("d", "math_number").with_field("NUM", "150"));
        ws.connect_value(set, "DUTY_CYCLE", duty);
        ws.connect_next(start, set);
        let source = compile(&ws);
        assert!(source.contains("  pwm_start(100);\n  pwm_set(3, 1, 100);\n"));
    }

    #[test]
    fn pwm_set_needs_initializer() {
        let mut ws = Workspace::new();
        ws.add_top_block(Block::new("pw", "pwm_set"));
        let program = generate_program(&ws, GeneratorOptions::default());
        assert!(program.source.contains(
            "// WARNING: You must use a PWM initialize block at the beginning of your program!"
        ));
        assert!(!program.source.contains("pwm_set("));
    }

    #[test]
    fn second_pwm_start_is_ignored() {
        let mut ws = Workspace::new();
        let a = ws.add_top_block(Block::new("a", "pwm_start"));
        let b = ws.add_block(Block::new("b", "pwm_start"));
        ws.connect_next(a, b);
        let program = generate_program(&ws, GeneratorOptions::default());
        assert_eq!(program.source.matches("pwm_start(100);").count(), 1);
        assert_eq!(program.diagnostics.len(), 1);
        assert_eq!(program.diagnostics[0].block_id, "b");
    }
}
