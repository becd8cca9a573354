use super::failed_expression;
use crate::board::Board;
use crate::codegen::{clamp, Generator, Output};
use crate::order::Order;
use crate::workspace::Block;
use anyhow::{anyhow, Result};
use regex::Regex;

/// Registers the S3 library and its startup call. Returns the warning line
/// when the target is not a Scribbler.
fn s3_library(g: &mut Generator<'_>, block: &Block) -> Option<String> {
    if g.board() != Board::Scribbler3 {
        return Some(g.warning(
            block,
            "Scribbler blocks can only be used with the Scribbler 3 robot!",
        ));
    }
    g.ctx.add_include("s3", "#include \"s3.h\"");
    g.ctx.add_setup("s3_setup", "s3_setup();\npause(100);");
    None
}

/// `#RRGGBB` from the color picker as a C hex literal.
pub fn led_color(raw: &str) -> Result<String> {
    let pattern = Regex::new(r"^\s*#?([0-9A-Fa-f]{6})\s*$")?;
    let captures = pattern
        .captures(raw)
        .ok_or_else(|| anyhow!("\"{}\" is not a #RRGGBB color", raw.trim()))?;
    Ok(format!("0x{}", captures[1].to_uppercase()))
}

fn location(raw: &str) -> &'static str {
    match raw {
        "LEFT" => "S3_LEFT",
        "RIGHT" => "S3_RIGHT",
        "DETECTED" => "S3_DETECTED",
        _ => "S3_CENTER",
    }
}

fn condition(raw: &str) -> &'static str {
    match raw {
        "IS_NOT" => "S3_IS_NOT",
        _ => "S3_IS",
    }
}

pub fn drive(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return Output::statement(line);
    }
    let left = g.clamped_value(block, "LEFT_MOTOR_SPEED", -100, 100, Order::None);
    let right = g.clamped_value(block, "RIGHT_MOTOR_SPEED", -100, 100, Order::None);
    let duration = g.clamped_value(block, "MOTOR_DURATION", 0, 15_000, Order::None);
    Output::statement(format!("s3_motorSet({}, {}, {});\n", left, right, duration))
}

pub fn stop(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return Output::statement(line);
    }
    Output::statement("s3_motorSet(0, 0, 0);\n")
}

pub fn led(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return Output::statement(line);
    }
    let which = location(&g.field(block, "LED"));
    let mut code = String::new();
    let color = match led_color(&g.field(block, "COLOR")) {
        Ok(color) => color,
        Err(e) => {
            code.push_str(&g.warning(block, format!("{}; the LED is turned off.", e)));
            "0x000000".to_string()
        }
    };
    code.push_str(&format!("s3_setLED({}, {});\n", which, color));
    Output::statement(code)
}

pub fn play(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return Output::statement(line);
    }
    let frequency = g.clamped_value(block, "FREQUENCY", 0, 20_000, Order::None);
    let duration = g.clamped_value(block, "DURATION", 0, 8_000, Order::None);
    let volume = g
        .field(block, "VOLUME")
        .trim()
        .parse::<i64>()
        .map(|v| clamp(v, 0, 100))
        .unwrap_or(50);
    Output::statement(format!(
        "s3_setVolume({});\ns3_playNote({}, 0, {});\n",
        volume, frequency, duration
    ))
}

pub fn simple_line(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return failed_expression(&line, "0");
    }
    let is = condition(&g.field(block, "LINE_CONDITION"));
    let at = location(&g.field(block, "LOCATION"));
    let color = match g.field(block, "COLOR").as_str() {
        "WHITE" => "S3_WHITE",
        _ => "S3_BLACK",
    };
    Output::expression(format!("s3_simpleLine({}, {}, {})", is, at, color), Order::Atomic)
}

pub fn simple_obstacle(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = s3_library(g, block) {
        return failed_expression(&line, "0");
    }
    let is = condition(&g.field(block, "OBSTACLE_CONDITION"));
    let at = location(&g.field(block, "LOCATION"));
    Output::expression(format!("s3_simpleObstacle({}, {})", is, at), Order::Atomic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate_program, GeneratorOptions};
    use crate::workspace::Workspace;
    use pretty_assertions::assert_eq;

    fn s3() -> GeneratorOptions {
        GeneratorOptions {
            board: Board::Scribbler3,
        }
    }

    #[test]
    fn colors_parse_to_hex_literals() {
        assert_eq!(led_color("#ff8800").unwrap(), "0xFF8800");
        assert_eq!(led_color("00ff00").unwrap(), "0x00FF00");
        assert!(led_color("red").is_err());
    }

    #[test]
    fn drive_then_led_share_setup() {
        let mut ws = Workspace::new();
        let drive = ws.add_top_block(Block::new("d", "scribbler_drive"));
        let led = ws.add_block(
            Block::new("l", "scribbler_led")
                .with_field("LED", "RIGHT")
                .with_field("COLOR", "#00ff00"),
        );
        ws.connect_next(drive, led);
        let program = generate_program(&ws, s3());
        assert_eq!(program.source.matches("#include \"s3.h\"").count(), 1);
        assert!(program.source.contains(
            "int main() {\n  s3_setup();\n  pause(100);\n  s3_motorSet(100, 100, 0);\n  s3_setLED(S3_RIGHT, 0x00FF00);\n"
        ));
    }

    #[test]
    fn wrong_board_warns() {
        let mut ws = Workspace::new();
        ws.add_top_block(Block::new("d", "scribbler_stop"));
        let program = generate_program(&ws, GeneratorOptions::default());
        assert!(program
            .source
            .contains("// WARNING: Scribbler blocks can only be used with the Scribbler 3 robot!"));
        assert!(!program.source.contains("s3.h"));
    }

    #[test]
    fn sensor_in_condition() {
        let mut ws = Workspace::new();
        let iff = ws.add_top_block(Block::new("if", "controls_if"));
        let line = ws.add_block(
            Block::new("ln", "scribbler_simple_line")
                .with_field("LINE_CONDITION", "IS_NOT")
                .with_field("LOCATION", "LEFT")
                .with_field("COLOR", "WHITE"),
        );
        ws.connect_value(iff, "IF0", line);
        let source = generate_program(&ws, s3()).source;
        assert!(source.contains("  if (s3_simpleLine(S3_IS_NOT, S3_LEFT, S3_WHITE)) {\n  }\n"));
    }
}
