use crate::codegen::{clamp, int_literal, Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

fn servo_library(g: &mut Generator<'_>) {
    g.ctx.add_include("servo", "#include \"servo.h\"");
}

/// Standard servo position. The library takes tenths of a degree, so
/// literal angles are clamped and multiplied here.
pub fn angle(g: &mut Generator<'_>, block: &Block) -> Output {
    servo_library(g);
    let pin = g.pin(block, "PIN");
    let degrees = match g.expression(block, "ANGLE") {
        Some((code, order)) => match int_literal(&code) {
            Some(n) => (clamp(n, 0, 180) * 10).to_string(),
            None => format!("{} * 10", crate::order::wrap(code, order, Order::Multiplicative)),
        },
        None => {
            let fallback = g.socket_default(block, "ANGLE");
            let n = int_literal(&fallback).unwrap_or(90);
            (clamp(n, 0, 180) * 10).to_string()
        }
    };
    Output::statement(format!("servo_angle({}, {});\n", pin, degrees))
}

pub fn speed(g: &mut Generator<'_>, block: &Block) -> Output {
    servo_library(g);
    let pin = g.pin(block, "PIN");
    let speed = g.clamped_value(block, "SPEED", -200, 200, Order::None);
    Output::statement(format!("servo_speed({}, {});\n", pin, speed))
}

pub fn ramp(g: &mut Generator<'_>, block: &Block) -> Output {
    servo_library(g);
    let pin = g.pin(block, "PIN");
    let step = g.clamped_value(block, "RAMPSTEP", 0, 100, Order::None);
    Output::statement(format!("servo_setramp({}, {});\n", pin, step))
}
