use super::string_literal_body;
use super::variables::c_identifier;
use crate::codegen::{int_literal, Generator, Output};
use crate::context::CType;
use crate::order::Order;
use crate::workspace::Block;

/// User data starts above the program image in the upper EEPROM half.
const EEPROM_BASE: i64 = 32768;
const EEPROM_LAST: i64 = 7675;
const TEXT_READ_LENGTH: usize = 128;

const CONSTRAIN_FUNCTION: &str = "int constrain(int _cVal, int _cMin, int _cMax) {
  if (_cVal < _cMin) _cVal = _cMin;
  if (_cVal > _cMax) _cVal = _cMax;
  return _cVal;
}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stored {
    Number,
    Byte,
    Text,
}

fn stored(g: &mut Generator<'_>, block: &Block) -> Stored {
    match g.field(block, "TYPE").as_str() {
        "BYTE" => Stored::Byte,
        "TEXT" => Stored::Text,
        _ => Stored::Number,
    }
}

/// Absolute EEPROM address for the user's offset, kept inside the user area
/// at run time.
fn address(g: &mut Generator<'_>, block: &Block) -> String {
    g.ctx.add_global("constrain_function", CONSTRAIN_FUNCTION);
    let offset = g.value_or_default(block, "ADDRESS", Order::None);
    format!("({} + constrain({}, 0, {}))", EEPROM_BASE, offset, EEPROM_LAST)
}

pub fn write(g: &mut Generator<'_>, block: &Block) -> Output {
    let kind = stored(g, block);
    let address = address(g, block);
    let code = match kind {
        Stored::Number => {
            let value = g.value_or_default(block, "VALUE", Order::None);
            format!("ee_putInt({}, {});\n", value, address)
        }
        Stored::Byte => {
            let (value, order) = match g.expression(block, "VALUE") {
                Some(found) => found,
                None => (g.socket_default(block, "VALUE"), Order::Atomic),
            };
            let byte = match int_literal(&value) {
                Some(n) => (n & 255).to_string(),
                None => format!("({} & 255)", crate::order::wrap(value, order, Order::BitwiseAnd)),
            };
            format!("ee_putByte({}, {});\n", byte, address)
        }
        Stored::Text => {
            let value = g
                .value_to_code(block, "VALUE", Order::None)
                .unwrap_or_else(|| "\"\"".to_string());
            let length = match string_literal_body(&value) {
                Some(body) => (super::literal_length(body) + 1).to_string(),
                None => {
                    g.ctx.add_include("string", "#include <string.h>");
                    format!("((int) strlen({}) + 1)", value)
                }
            };
            format!("ee_putStr({}, {}, {});\n", value, length, address)
        }
    };
    Output::statement(code)
}

pub fn read(g: &mut Generator<'_>, block: &Block) -> Output {
    let kind = stored(g, block);
    let address = address(g, block);
    let var = c_identifier(&g.field(block, "VAR"));
    let code = match kind {
        Stored::Number => {
            g.ctx.set_var_type(&var, CType::Int);
            format!("{} = ee_getInt({});\n", var, address)
        }
        Stored::Byte => {
            g.ctx.set_var_type(&var, CType::Int);
            format!("{} = ee_getByte({});\n", var, address)
        }
        Stored::Text => {
            g.ctx.set_var_type(&var, CType::Char);
            g.ctx.set_var_length(&var, TEXT_READ_LENGTH);
            format!("ee_getStr({}, {}, {});\n", var, TEXT_READ_LENGTH, address)
        }
    };
    Output::statement(code)
}
