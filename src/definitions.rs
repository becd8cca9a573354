//! Block definition registry.
//!
//! Declares, per block type, the sockets and fields a generator may read.
//! Generators never hardcode a socket's fallback text: an empty value socket
//! falls back to the default literal declared here.

use crate::board::Board;
use crate::workspace::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Statement,
    Value,
    /// Top-level only; registers code elsewhere and yields no body text.
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Value socket with the literal used when nothing is connected.
    Value { default: &'static str },
    Statement,
    Dummy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDef {
    pub name: String,
    pub kind: InputKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Dropdown(Vec<(String, String)>),
    Text,
    Number,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDefinition {
    pub kind: String,
    pub shape: Shape,
    pub inputs: Vec<InputDef>,
    pub fields: Vec<FieldDef>,
}

impl BlockDefinition {
    fn new(kind: &str, shape: Shape) -> Self {
        Self {
            kind: kind.to_string(),
            shape,
            inputs: Vec::new(),
            fields: Vec::new(),
        }
    }

    fn value(mut self, name: &str, default: &'static str) -> Self {
        self.inputs.push(InputDef {
            name: name.to_string(),
            kind: InputKind::Value { default },
        });
        self
    }

    fn statement(mut self, name: &str) -> Self {
        self.inputs.push(InputDef {
            name: name.to_string(),
            kind: InputKind::Statement,
        });
        self
    }

    fn dummy(mut self, name: &str) -> Self {
        self.inputs.push(InputDef {
            name: name.to_string(),
            kind: InputKind::Dummy,
        });
        self
    }

    fn dropdown(mut self, name: &str, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect::<Vec<_>>();
        let default = options.first().map(|(_, v)| v.clone()).unwrap_or_default();
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind: FieldKind::Dropdown(options),
            default,
        });
        self
    }

    fn text(mut self, name: &str, default: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind: FieldKind::Text,
            default: default.to_string(),
        });
        self
    }

    fn number(mut self, name: &str, default: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind: FieldKind::Number,
            default: default.to_string(),
        });
        self
    }

    fn variable(mut self, name: &str, default: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind: FieldKind::Variable,
            default: default.to_string(),
        });
        self
    }

    fn pin(mut self, name: &str, board: Board) -> Self {
        self.fields.push(pin_field(name, board));
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputDef> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn value_default(&self, name: &str) -> Option<&'static str> {
        match self.input(name)?.kind {
            InputKind::Value { default } => Some(default),
            _ => None,
        }
    }

    pub fn field_default(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.default.as_str())
    }
}

pub fn pin_field(name: &str, board: Board) -> FieldDef {
    let options = board
        .digital_pins()
        .into_iter()
        .map(|p| (p.to_string(), p.to_string()))
        .collect::<Vec<_>>();
    let default = options.first().map(|(_, v)| v.clone()).unwrap_or_default();
    FieldDef {
        name: name.to_string(),
        kind: FieldKind::Dropdown(options),
        default,
    }
}

/// Where a block's pin comes from. A pin starts as a dropdown; the editor can
/// swap it for a value socket so the pin is computed at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSource {
    Fixed,
    Programmable,
}

impl PinSource {
    pub fn of(block: &Block, socket: &str) -> PinSource {
        let switched = block
            .mutation_value("pinmenu")
            .map(|v| v.eq_ignore_ascii_case("program"))
            .unwrap_or(false);
        if switched || block.values.contains_key(socket) {
            PinSource::Programmable
        } else {
            PinSource::Fixed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinsAction {
    State,
    Direction,
}

/// One member of the `set_pins` family. Each variant has a fixed socket set:
/// one bit field per pin from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPinsVariant {
    pub action: PinsAction,
    pub start: u8,
    pub end: u8,
}

impl SetPinsVariant {
    pub fn from_block(block: &Block) -> SetPinsVariant {
        let action = match block.field("ACTION") {
            Some("DIRECTION") => PinsAction::Direction,
            _ => PinsAction::State,
        };
        let start = block
            .field("START_PIN")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .unwrap_or(0);
        let end = block
            .field("END_PIN")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .unwrap_or(start);
        SetPinsVariant {
            action,
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn bit_field(pin: u8) -> String {
        format!("P{}", pin)
    }

    pub fn definition(&self, board: Board) -> BlockDefinition {
        let mut def = BlockDefinition::new("set_pins", Shape::Statement)
            .dropdown("ACTION", &[("state", "STATE"), ("direction", "DIRECTION")])
            .pin("START_PIN", board)
            .pin("END_PIN", board);
        let options: &[(&str, &str)] = match self.action {
            PinsAction::State => &[("LOW", "0"), ("HIGH", "1")],
            PinsAction::Direction => &[("INPUT", "0"), ("OUTPUT", "1")],
        };
        for pin in (self.start..=self.end).rev() {
            def = def.dropdown(&Self::bit_field(pin), options);
        }
        def
    }

    /// Builds the block for this variant from `block`, keeping bits for pins
    /// both shapes share and defaulting the rest to 0.
    pub fn reshape(&self, block: &Block) -> Block {
        let mut out = Block::new(block.id.clone(), "set_pins").at(block.x, block.y);
        out.next = block.next;
        out.disabled = block.disabled;
        out.fields.insert(
            "ACTION".to_string(),
            match self.action {
                PinsAction::State => "STATE",
                PinsAction::Direction => "DIRECTION",
            }
            .to_string(),
        );
        out.fields
            .insert("START_PIN".to_string(), self.start.to_string());
        out.fields.insert("END_PIN".to_string(), self.end.to_string());
        for pin in self.start..=self.end {
            let name = Self::bit_field(pin);
            let bit = match block.field(&name) {
                Some("1") => "1",
                _ => "0",
            };
            out.fields.insert(name, bit.to_string());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatVariant {
    Forever,
    Times,
    While,
    Until,
}

impl RepeatVariant {
    pub fn from_block(block: &Block) -> RepeatVariant {
        let raw = block
            .mutation_value("type")
            .or_else(|| block.field("TYPE"))
            .unwrap_or("FOREVER");
        match raw.to_uppercase().as_str() {
            "TIMES" | "X_TIMES" => RepeatVariant::Times,
            "WHILE" => RepeatVariant::While,
            "UNTIL" => RepeatVariant::Until,
            _ => RepeatVariant::Forever,
        }
    }

    pub fn socket(self) -> Option<&'static str> {
        match self {
            RepeatVariant::Forever => None,
            RepeatVariant::Times => Some("TIMES"),
            RepeatVariant::While | RepeatVariant::Until => Some("REPEAT_CONDITION"),
        }
    }
}

const PIN_ACTIONS: &[(&str, &str)] = &[
    ("high", "HIGH"),
    ("low", "LOW"),
    ("toggle", "TOGGLE"),
    ("input", "INPUT"),
    ("reverse", "REVERSE"),
];

const EEPROM_TYPES: &[(&str, &str)] = &[
    ("number", "NUMBER"),
    ("byte", "BYTE"),
    ("text", "TEXT"),
];

const LINE_CONDITIONS: &[(&str, &str)] = &[("is", "IS"), ("is not", "IS_NOT")];

const S3_LOCATIONS: &[(&str, &str)] = &[
    ("center", "CENTER"),
    ("left", "LEFT"),
    ("right", "RIGHT"),
    ("detected", "DETECTED"),
];

pub fn definition(kind: &str, board: Board) -> Option<BlockDefinition> {
    use Shape::*;
    let def = match kind {
        "comment" => BlockDefinition::new(kind, Statement).text("COMMENT_TEXT", ""),
        "custom_code" => BlockDefinition::new(kind, Statement)
            .dropdown(
                "LOCATION",
                &[
                    ("main", "main"),
                    ("includes", "includes"),
                    ("globals", "globals"),
                    ("setups", "setups"),
                    ("functions", "functions"),
                ],
            )
            .text("CODE", ""),
        "pause" => BlockDefinition::new(kind, Statement).value("PAUSE_TIME", "500"),
        "system_counter" => BlockDefinition::new(kind, Value),

        "controls_if" => BlockDefinition::new(kind, Statement)
            .value("IF0", "0")
            .statement("DO0")
            .statement("ELSE"),
        "controls_repeat" => BlockDefinition::new(kind, Statement)
            .dropdown(
                "TYPE",
                &[
                    ("forever", "FOREVER"),
                    ("x times", "TIMES"),
                    ("while", "WHILE"),
                    ("until", "UNTIL"),
                ],
            )
            .value("TIMES", "10")
            .value("REPEAT_CONDITION", "1")
            .statement("DO"),
        "controls_for" => BlockDefinition::new(kind, Statement)
            .variable("VAR", "i")
            .value("START", "1")
            .value("END", "10")
            .value("STEP", "1")
            .statement("DO"),
        "controls_break" => BlockDefinition::new(kind, Statement),
        "procedures_defnoreturn" => BlockDefinition::new(kind, Definition)
            .text("NAME", "my_function")
            .statement("STACK"),
        "procedures_callnoreturn" => {
            BlockDefinition::new(kind, Statement).text("NAME", "my_function")
        }
        "cog_new" => BlockDefinition::new(kind, Statement)
            .number("STACK_SIZE", "128")
            .statement("METHOD"),

        "math_number" => BlockDefinition::new(kind, Value).number("NUM", "0"),
        "math_arithmetic" => BlockDefinition::new(kind, Value)
            .dropdown(
                "OP",
                &[
                    ("+", "ADD"),
                    ("-", "MINUS"),
                    ("×", "MULTIPLY"),
                    ("÷", "DIVIDE"),
                    ("%", "MODULUS"),
                    ("^", "POWER"),
                ],
            )
            .value("A", "0")
            .value("B", "0"),
        "math_limit" => BlockDefinition::new(kind, Value)
            .dropdown("OP", &[("lowest of", "MIN"), ("highest of", "MAX")])
            .value("A", "0")
            .value("B", "0"),
        "math_crement" => BlockDefinition::new(kind, Statement)
            .dropdown("OP", &[("increment", "++"), ("decrement", "--")])
            .variable("VAR", "item"),
        "math_random" => BlockDefinition::new(kind, Value)
            .value("A", "1")
            .value("B", "100"),
        "logic_boolean" => {
            BlockDefinition::new(kind, Value).dropdown("BOOL", &[("true", "TRUE"), ("false", "FALSE")])
        }
        "logic_compare" => BlockDefinition::new(kind, Value)
            .dropdown(
                "OP",
                &[
                    ("=", "EQ"),
                    ("≠", "NEQ"),
                    ("<", "LT"),
                    ("≤", "LTE"),
                    (">", "GT"),
                    ("≥", "GTE"),
                ],
            )
            .value("A", "0")
            .value("B", "0"),
        "logic_operation" => BlockDefinition::new(kind, Value)
            .dropdown("OP", &[("and", "AND"), ("or", "OR")])
            .value("A", "0")
            .value("B", "0"),
        "logic_negate" => BlockDefinition::new(kind, Value).value("BOOL", "0"),
        "string_type_block" => BlockDefinition::new(kind, Value).text("TEXT", ""),

        "variables_get" => BlockDefinition::new(kind, Value).variable("VAR", "item"),
        "variables_set" => BlockDefinition::new(kind, Statement)
            .variable("VAR", "item")
            .value("VALUE", "0"),

        "array_init" => BlockDefinition::new(kind, Statement)
            .text("VAR", "list")
            .number("NUM", "10"),
        "array_get" => BlockDefinition::new(kind, Value)
            .text("VAR", "list")
            .value("NUM", "0"),
        "array_set" => BlockDefinition::new(kind, Statement)
            .text("VAR", "list")
            .value("NUM", "0")
            .value("VALUE", "0"),
        "array_fill" => BlockDefinition::new(kind, Statement)
            .text("VAR", "list")
            .text("NUM", "0"),
        "array_clear" => BlockDefinition::new(kind, Statement).text("VAR", "list"),

        "console_print" => BlockDefinition::new(kind, Statement)
            .value("MESSAGE", "\"\"")
            .dropdown("NEWLINE", &[("no", "FALSE"), ("yes", "TRUE")]),
        "console_print_variables" => BlockDefinition::new(kind, Statement)
            .value("VALUE", "0")
            .dropdown(
                "FORMAT",
                &[
                    ("decimal", "DECIMAL"),
                    ("hexadecimal", "HEX"),
                    ("binary", "BIN"),
                    ("character", "CHAR"),
                    ("floating point", "FLOAT"),
                ],
            )
            .dropdown("NEWLINE", &[("no", "FALSE"), ("yes", "TRUE")]),
        "console_newline" => BlockDefinition::new(kind, Statement),

        "make_pin" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .dropdown("ACTION", PIN_ACTIONS),
        "make_pin_input" => BlockDefinition::new(kind, Statement)
            .value("PIN", "0")
            .dropdown("ACTION", PIN_ACTIONS),
        "check_pin" => BlockDefinition::new(kind, Value).pin("PIN", board),
        "check_pin_input" => BlockDefinition::new(kind, Value).value("PIN", "0"),
        "set_pins" => {
            let variant = SetPinsVariant {
                action: PinsAction::State,
                start: 0,
                end: 0,
            };
            return Some(variant.definition(board));
        }
        "pwm_start" => BlockDefinition::new(kind, Statement).value("PERIOD", "100"),
        "pwm_set" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .dropdown("CHANNEL", &[("A", "0"), ("B", "1")])
            .value("DUTY_CYCLE", "50"),
        "pwm_stop" => BlockDefinition::new(kind, Statement),

        "base_freqout" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .value("DURATION", "500")
            .value("FREQUENCY", "3000"),
        "sound_init" => BlockDefinition::new(kind, Statement)
            .pin("PINL", board)
            .pin("PINR", board),
        "sound_play" => BlockDefinition::new(kind, Statement)
            .dropdown(
                "ACTION",
                &[
                    ("frequency", "FREQ"),
                    ("volume", "VOLUME"),
                    ("waveform", "WAVE"),
                    ("stop", "STOP"),
                ],
            )
            .dropdown("CHANNEL", &[("0", "0"), ("1", "1"), ("2", "2"), ("3", "3")])
            .value("VALUE", "0"),
        "wav_play" => BlockDefinition::new(kind, Statement).text("FILENAME", "song"),
        "wav_volume" => BlockDefinition::new(kind, Statement).value("VOLUME", "5"),
        "wav_stop" => BlockDefinition::new(kind, Statement),

        "sd_init" => BlockDefinition::new(kind, Statement)
            .pin("DO", board)
            .pin("CLK", board)
            .pin("DI", board)
            .pin("CS", board),
        "sd_open" => BlockDefinition::new(kind, Statement)
            .text("FILENAME", "test.txt")
            .dropdown("MODE", &[("read", "r"), ("write", "w"), ("append", "a")]),
        "sd_read" => BlockDefinition::new(kind, Statement)
            .value("SIZE", "10")
            .variable("VAR", "buffer"),
        "sd_write" => BlockDefinition::new(kind, Statement).value("VALUE", "\"\""),
        "sd_close" => BlockDefinition::new(kind, Statement),

        "servo_move" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .value("ANGLE", "90"),
        "servo_speed" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .value("SPEED", "0"),
        "servo_set_ramp" => BlockDefinition::new(kind, Statement)
            .pin("PIN", board)
            .value("RAMPSTEP", "50"),

        "eeprom_write" => BlockDefinition::new(kind, Statement)
            .dropdown("TYPE", EEPROM_TYPES)
            .value("ADDRESS", "0")
            .value("VALUE", "0"),
        "eeprom_read" => BlockDefinition::new(kind, Statement)
            .dropdown("TYPE", EEPROM_TYPES)
            .value("ADDRESS", "0")
            .variable("VAR", "item"),

        "ab_drive_init" => BlockDefinition::new(kind, Statement)
            .dropdown(
                "BOT",
                &[
                    ("ActivityBot", "ACTIVITYBOT"),
                    ("Arlo", "ARLO"),
                    ("Servo differential drive", "SERVO_DIFF"),
                ],
            )
            .pin("LEFT", board)
            .pin("RIGHT", board),
        "ab_drive_goto" => BlockDefinition::new(kind, Statement)
            .value("LEFT", "64")
            .value("RIGHT", "64"),
        "ab_drive_speed" => BlockDefinition::new(kind, Statement)
            .value("LEFT", "64")
            .value("RIGHT", "64"),
        "ab_drive_stop" => BlockDefinition::new(kind, Statement),

        "scribbler_drive" => BlockDefinition::new(kind, Statement)
            .value("LEFT_MOTOR_SPEED", "100")
            .value("RIGHT_MOTOR_SPEED", "100")
            .value("MOTOR_DURATION", "0"),
        "scribbler_stop" => BlockDefinition::new(kind, Statement),
        "scribbler_led" => BlockDefinition::new(kind, Statement)
            .dropdown("LED", &[("left", "LEFT"), ("center", "CENTER"), ("right", "RIGHT")])
            .text("COLOR", "#000000"),
        "scribbler_play" => BlockDefinition::new(kind, Statement)
            .value("FREQUENCY", "440")
            .value("DURATION", "250")
            .number("VOLUME", "50"),
        "scribbler_simple_line" => BlockDefinition::new(kind, Value)
            .dropdown("LINE_CONDITION", LINE_CONDITIONS)
            .dropdown("LOCATION", S3_LOCATIONS)
            .dropdown("COLOR", &[("black", "BLACK"), ("white", "WHITE")]),
        "scribbler_simple_obstacle" => BlockDefinition::new(kind, Value)
            .dropdown("OBSTACLE_CONDITION", LINE_CONDITIONS)
            .dropdown("LOCATION", S3_LOCATIONS)
            .dummy("LABEL"),
        _ => return None,
    };
    Some(def)
}
