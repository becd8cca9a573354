use pretty_assertions::assert_eq;
use propblocks_core::{compile_workspace_xml, Board};

fn compile(xml: &str) -> propblocks_core::GeneratedProgram {
    compile_workspace_xml(xml, None).unwrap()
}

fn main_body(source: &str) -> &str {
    let start = source.find("int main() {\n").unwrap() + "int main() {\n".len();
    &source[start..source.rfind('}').unwrap()]
}

#[test]
fn make_pin_high_compiles_to_single_call() {
    let program = compile(
        r#"<xml>
  <block type="make_pin" id="a" x="10" y="10">
    <field name="PIN">5</field>
    <field name="ACTION">HIGH</field>
  </block>
</xml>"#,
    );
    assert_eq!(main_body(&program.source), "  high(5);\n");
    assert!(program.diagnostics.is_empty());
}

#[test]
fn eeprom_writes_share_their_helper() {
    let program = compile(
        r#"<xml>
  <block type="eeprom_write" id="w1">
    <field name="TYPE">NUMBER</field>
    <value name="ADDRESS"><block type="math_number"><field name="NUM">0</field></block></value>
    <value name="VALUE"><block type="math_number"><field name="NUM">7</field></block></value>
    <next>
      <block type="eeprom_write" id="w2">
        <field name="TYPE">NUMBER</field>
        <value name="ADDRESS"><block type="math_number"><field name="NUM">8</field></block></value>
        <value name="VALUE"><block type="math_number"><field name="NUM">9</field></block></value>
      </block>
    </next>
  </block>
</xml>"#,
    );
    let source = &program.source;
    assert_eq!(source.matches("ee_putInt(").count(), 2);
    assert!(source.contains("ee_putInt(7, (32768 + constrain(0, 0, 7675)));"));
    assert!(source.contains("ee_putInt(9, (32768 + constrain(8, 0, 7675)));"));
    assert_eq!(source.matches("int constrain(").count(), 1);
    assert!(source.find("int constrain(").unwrap() < source.find("int main()").unwrap());
}

#[test]
fn servo_include_is_registered_once_in_header() {
    let program = compile(
        r#"<xml>
  <block type="servo_move" id="s1">
    <field name="PIN">14</field>
    <value name="ANGLE"><shadow type="math_number"><field name="NUM">45</field></shadow></value>
    <next>
      <block type="servo_move" id="s2"><field name="PIN">15</field></block>
    </next>
  </block>
</xml>"#,
    );
    let source = &program.source;
    assert_eq!(source.matches("#include \"servo.h\"").count(), 1);
    assert!(source.starts_with("// ------ Libraries and Definitions ------\n#include \"simpletools.h\"\n#include \"servo.h\"\n"));
    assert_eq!(main_body(source), "  servo_angle(14, 450);\n  servo_angle(15, 900);\n");
}

#[test]
fn sd_read_without_initializer_warns_instead_of_reading() {
    let program = compile(
        r#"<xml board="flip">
  <block type="sd_read" id="r"><field name="VAR">buffer</field></block>
</xml>"#,
    );
    assert!(program.source.contains(
        "  // WARNING: You must use a SD initialize block at the beginning of your program!\n"
    ));
    assert!(!program.source.contains("fread("));
    assert_eq!(program.diagnostics.len(), 1);
    assert_eq!(program.diagnostics[0].block_id, "r");
}

#[test]
fn array_fill_on_unknown_array_is_an_error() {
    let program = compile(
        r#"<xml>
  <block type="array_fill" id="f">
    <field name="VAR">X</field>
    <field name="NUM">1,2,3</field>
  </block>
</xml>"#,
    );
    assert!(program
        .source
        .contains("// ERROR: The array \"X\" has not been initialized!"));
    assert!(!program.source.contains("memcpy"));
    assert!(program.has_errors());
}

#[test]
fn repeated_registrations_render_once() {
    let mut blocks = String::new();
    for n in 0..5 {
        blocks.push_str(&format!(
            r#"<block type="sound_play" id="p{n}" x="0" y="{y}"><field name="ACTION">FREQ</field></block>"#,
            n = n,
            y = 100 + n * 20
        ));
    }
    let xml = format!(
        r#"<xml><block type="sound_init" id="init" x="0" y="0"><field name="PINL">26</field><field name="PINR">27</field></block>{}</xml>"#,
        blocks
    );
    let program = compile(&xml);
    assert_eq!(program.source.matches("#include \"sound.h\"").count(), 1);
    assert_eq!(program.source.matches("sound *audio0;").count(), 1);
    assert_eq!(program.source.matches("audio0 = sound_run(26, 27);").count(), 1);
    assert_eq!(program.source.matches("sound_freq(audio0, 0, 0);").count(), 5);
}

#[test]
fn statement_chain_keeps_order() {
    let program = compile(
        r#"<xml>
  <block type="make_pin" x="0" y="0"><field name="PIN">1</field>
    <next><block type="make_pin"><field name="PIN">2</field><field name="ACTION">LOW</field>
      <next><block type="make_pin"><field name="PIN">3</field><field name="ACTION">TOGGLE</field></block></next>
    </block></next>
  </block>
</xml>"#,
    );
    assert_eq!(main_body(&program.source), "  high(1);\n  low(2);\n  toggle(3);\n");
}

#[test]
fn stacks_follow_canvas_position() {
    let program = compile(
        r#"<xml>
  <block type="make_pin" x="0" y="200"><field name="PIN">2</field></block>
  <block type="make_pin" x="0" y="10"><field name="PIN">1</field></block>
</xml>"#,
    );
    assert_eq!(main_body(&program.source), "  high(1);\n  high(2);\n");
}

#[test]
fn empty_sockets_use_declared_defaults() {
    let program = compile(
        r#"<xml>
  <block type="pause"><next><block type="base_freqout"><field name="PIN">3</field></block></next></block>
</xml>"#,
    );
    assert_eq!(
        main_body(&program.source),
        "  pause(500);\n  freqout(3, 500, 3000);\n"
    );
}

#[test]
fn adding_the_initializer_turns_warning_into_call() {
    let without = compile(r#"<xml board="activity-board"><block type="pwm_set"><field name="PIN">4</field></block></xml>"#);
    assert!(without.source.contains("// WARNING: You must use a PWM initialize block"));
    assert!(!without.source.contains("pwm_set(4"));

    let with = compile(
        r#"<xml><block type="pwm_start"><next><block type="pwm_set"><field name="PIN">4</field></block></next></block></xml>"#,
    );
    assert!(with.source.contains("  pwm_start(100);\n  pwm_set(4, 0, 50);\n"));
    assert!(with.diagnostics.is_empty());
}

#[test]
fn disabled_blocks_are_skipped() {
    let program = compile(
        r#"<xml>
  <block type="make_pin" disabled="true"><field name="PIN">1</field>
    <next><block type="make_pin"><field name="PIN">2</field></block></next>
  </block>
</xml>"#,
    );
    assert_eq!(main_body(&program.source), "  high(2);\n");
}

#[test]
fn scribbler_program_for_s3_board() {
    let program = compile_workspace_xml(
        r#"<xml>
  <block type="controls_repeat">
    <field name="TYPE">FOREVER</field>
    <statement name="DO">
      <block type="scribbler_drive">
        <value name="MOTOR_DURATION"><block type="math_number"><field name="NUM">1000</field></block></value>
      </block>
    </statement>
  </block>
</xml>"#,
        Some(Board::Scribbler3),
    )
    .unwrap();
    assert_eq!(
        main_body(&program.source),
        "  s3_setup();\n  pause(100);\n  while (1) {\n    s3_motorSet(100, 100, 1000);\n  }\n"
    );
}

#[test]
fn sections_appear_in_fixed_order() {
    let program = compile(
        r#"<xml>
  <variables><variable>total</variable></variables>
  <block type="procedures_defnoreturn" x="0" y="300">
    <field name="NAME">beep</field>
    <statement name="STACK"><block type="base_freqout"><field name="PIN">4</field></block></statement>
  </block>
  <block type="variables_set" x="0" y="0">
    <field name="VAR">total</field>
    <next><block type="procedures_callnoreturn"><mutation name="beep"></mutation></block></next>
  </block>
</xml>"#,
    );
    let source = &program.source;
    let order = [
        "// ------ Libraries and Definitions ------",
        "// ------ Global Variables and Objects ------\nint total;",
        "// ------ Function Declarations ------\nvoid beep();",
        "// ------ Functions ------\nvoid beep() {",
        "// ------ Main Program ------\nint main() {\n  total = 0;\n  beep();\n}",
    ];
    let positions = order
        .iter()
        .map(|needle| source.find(needle).unwrap_or_else(|| panic!("missing {:?}", needle)))
        .collect::<Vec<_>>();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}
