use super::quote_c_string;
use super::variables::c_identifier;
use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

/// Numeric literal from the NUM field. Anything that does not read as a
/// number becomes `0`.
pub fn number(g: &mut Generator<'_>, block: &Block) -> Output {
    let raw = g.field(block, "NUM");
    let raw = raw.trim();
    let literal = if let Ok(n) = raw.parse::<i64>() {
        n.to_string()
    } else if let Ok(value) = raw.parse::<f64>() {
        if value.is_finite() {
            let text = value.to_string();
            if text.contains('.') {
                text
            } else {
                format!("{}.0", text)
            }
        } else {
            "0".to_string()
        }
    } else if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        match i64::from_str_radix(hex, 16) {
            Ok(_) => raw.to_string(),
            Err(_) => "0".to_string(),
        }
    } else {
        "0".to_string()
    };
    let order = if literal.starts_with('-') {
        Order::UnaryPrefix
    } else {
        Order::Atomic
    };
    Output::expression(literal, order)
}

pub fn arithmetic(g: &mut Generator<'_>, block: &Block) -> Output {
    let (operator, order) = match g.field(block, "OP").as_str() {
        "MINUS" => (" - ", Order::Additive),
        "MULTIPLY" => (" * ", Order::Multiplicative),
        "DIVIDE" => (" / ", Order::Multiplicative),
        "MODULUS" => (" % ", Order::Multiplicative),
        "POWER" => {
            let base = g.value_or_default(block, "A", Order::None);
            let exponent = g.value_or_default(block, "B", Order::None);
            return Output::expression(format!("pow({}, {})", base, exponent), Order::Atomic);
        }
        _ => (" + ", Order::Additive),
    };
    let left = g.value_or_default(block, "A", order);
    let right = g.value_or_default(block, "B", order);
    Output::expression(format!("{}{}{}", left, operator, right), order)
}

pub fn limit(g: &mut Generator<'_>, block: &Block) -> Output {
    let comparison = match g.field(block, "OP").as_str() {
        "MAX" => ">",
        _ => "<",
    };
    let a = g.value_or_default(block, "A", Order::Relational);
    let b = g.value_or_default(block, "B", Order::Relational);
    Output::expression(
        format!("{a} {op} {b} ? {a} : {b}", a = a, op = comparison, b = b),
        Order::Conditional,
    )
}

pub fn crement(g: &mut Generator<'_>, block: &Block) -> Output {
    let var = c_identifier(&g.field(block, "VAR"));
    let op = match g.field(block, "OP").as_str() {
        "--" => "--",
        _ => "++",
    };
    Output::statement(format!("{}{};\n", var, op))
}

/// Random integer in `[A, B]`, seeding the generator once per program.
pub fn random(g: &mut Generator<'_>, block: &Block) -> Output {
    g.ctx.add_setup("random_seed", "srand(INA + CNT);");
    let low = g.value_or_default(block, "A", Order::Additive);
    let high = g.value_or_default(block, "B", Order::Additive);
    Output::expression(
        format!("({lo} + rand() % ({hi} - {lo} + 1))", lo = low, hi = high),
        Order::Atomic,
    )
}

pub fn boolean(g: &mut Generator<'_>, block: &Block) -> Output {
    let value = if g.field(block, "BOOL") == "FALSE" { "0" } else { "1" };
    Output::expression(value, Order::Atomic)
}

pub fn compare(g: &mut Generator<'_>, block: &Block) -> Output {
    let (operator, order) = match g.field(block, "OP").as_str() {
        "NEQ" => ("!=", Order::Equality),
        "LT" => ("<", Order::Relational),
        "LTE" => ("<=", Order::Relational),
        "GT" => (">", Order::Relational),
        "GTE" => (">=", Order::Relational),
        _ => ("==", Order::Equality),
    };
    let a = g.value_or_default(block, "A", order);
    let b = g.value_or_default(block, "B", order);
    Output::expression(format!("{} {} {}", a, operator, b), order)
}

pub fn operation(g: &mut Generator<'_>, block: &Block) -> Output {
    let (operator, order) = match g.field(block, "OP").as_str() {
        "OR" => ("||", Order::LogicalOr),
        _ => ("&&", Order::LogicalAnd),
    };
    let a = g.value_or_default(block, "A", order);
    let b = g.value_or_default(block, "B", order);
    Output::expression(format!("{} {} {}", a, operator, b), order)
}

pub fn negate(g: &mut Generator<'_>, block: &Block) -> Output {
    let value = g.value_or_default(block, "BOOL", Order::UnaryPrefix);
    Output::expression(format!("!{}", value), Order::UnaryPrefix)
}

pub fn text(g: &mut Generator<'_>, block: &Block) -> Output {
    let text = g.field(block, "TEXT");
    Output::expression(quote_c_string(&text), Order::Atomic)
}

#[cfg(test)]
mod tests {
    use crate::codegen::{generate_program, GeneratorOptions};
    use crate::workspace::{Block, BlockId, Workspace};
    use pretty_assertions::assert_eq;

    fn binary(ws: &mut Workspace, id: &str, kind: &str, op: &str, a: BlockId, b: BlockId) -> BlockId {
        let node = ws.add_block(Block::new(id, kind).with_field("OP", op));
        ws.connect_value(node, "A", a);
        ws.connect_value(node, "B", b);
        node
    }

    fn num(ws: &mut Workspace, id: &str, n: &str) -> BlockId {
        ws.add_block(Block::new(id, "math_number").with_field("NUM", n))
    }

    fn assigned(ws: &mut Workspace, value: BlockId) -> String {
        let set = ws.add_top_block(Block::new("set", "variables_set").with_field("VAR", "r"));
        ws.connect_value(set, "VALUE", value);
        let source = generate_program(ws, GeneratorOptions::default()).source;
        let line = source
            .lines()
            .find(|l| l.trim_start().starts_with("r = "))
            .unwrap();
        line.trim().to_string()
    }

    #[test]
    fn parenthesizes_looser_operands_only() {
        let mut ws = Workspace::new();
        let one = num(&mut ws, "a", "1");
        let two = num(&mut ws, "b", "2");
        let three = num(&mut ws, "c", "3");
        let sum = binary(&mut ws, "sum", "math_arithmetic", "ADD", one, two);
        let product = binary(&mut ws, "mul", "math_arithmetic", "MULTIPLY", sum, three);
        assert_eq!(assigned(&mut ws, product), "r = (1 + 2) * 3;");
    }

    #[test]
    fn tighter_operands_stay_bare() {
        let mut ws = Workspace::new();
        let one = num(&mut ws, "a", "1");
        let two = num(&mut ws, "b", "2");
        let three = num(&mut ws, "c", "3");
        let product = binary(&mut ws, "mul", "math_arithmetic", "MULTIPLY", one, two);
        let sum = binary(&mut ws, "sum", "math_arithmetic", "ADD", product, three);
        assert_eq!(assigned(&mut ws, sum), "r = 1 * 2 + 3;");
    }

    #[test]
    fn logic_nests_with_parens() {
        let mut ws = Workspace::new();
        let one = num(&mut ws, "a", "1");
        let zero = num(&mut ws, "b", "0");
        let or = binary(&mut ws, "or", "logic_operation", "OR", one, zero);
        let not = ws.add_block(Block::new("not", "logic_negate"));
        ws.connect_value(not, "BOOL", or);
        assert_eq!(assigned(&mut ws, not), "r = !(1 || 0);");
    }

    #[test]
    fn leading_zeros_do_not_make_octal() {
        let mut ws = Workspace::new();
        let eight = num(&mut ws, "a", "08");
        assert_eq!(assigned(&mut ws, eight), "r = 8;");
        let mut ws = Workspace::new();
        let ten = num(&mut ws, "b", "010");
        assert_eq!(assigned(&mut ws, ten), "r = 10;");
    }

    #[test]
    fn garbage_number_becomes_zero() {
        let mut ws = Workspace::new();
        let bad = num(&mut ws, "a", "twelve");
        assert_eq!(assigned(&mut ws, bad), "r = 0;");
    }

    #[test]
    fn random_seeds_once() {
        let mut ws = Workspace::new();
        let r1 = ws.add_block(Block::new("r1", "math_random"));
        let r2 = ws.add_block(Block::new("r2", "math_random"));
        let sum = binary(&mut ws, "sum", "math_arithmetic", "ADD", r1, r2);
        let line = assigned(&mut ws, sum);
        assert_eq!(
            line,
            "r = (1 + rand() % (100 - 1 + 1)) + (1 + rand() % (100 - 1 + 1));"
        );
        let source = generate_program(&ws, GeneratorOptions::default()).source;
        assert_eq!(source.matches("srand(INA + CNT);").count(), 1);
    }
}
