use pretty_assertions::assert_eq;
use propblocks_core::cli::Args;
use propblocks_core::{compile_workspace_file, run_cli, Board};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BLINK: &str = r#"<xml xmlns="https://developers.google.com/blockly/xml" board="flip">
  <block type="controls_repeat" id="loop" x="20" y="20">
    <field name="TYPE">FOREVER</field>
    <statement name="DO">
      <block type="make_pin" id="on"><field name="PIN">26</field><field name="ACTION">HIGH</field>
        <next><block type="pause" id="wait"/></next>
      </block>
    </statement>
  </block>
</xml>"#;

fn args(input: PathBuf) -> Args {
    Args {
        input,
        output: None,
        board: None,
        diagnostics_json: None,
        strict: false,
        verbose: false,
    }
}

fn workspace_file(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, xml).unwrap();
    path
}

#[test]
fn writes_program_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = workspace_file(&dir, "blink.xml", BLINK);
    let output = dir.path().join("blink.c");
    let mut cli = args(input);
    cli.output = Some(output.clone());
    run_cli(&cli).unwrap();

    let source = fs::read_to_string(&output).unwrap();
    assert!(source.ends_with(
        "int main() {\n  while (1) {\n    high(26);\n    pause(500);\n  }\n}\n"
    ));
}

#[test]
fn diagnostics_json_lists_every_warning() {
    let dir = TempDir::new().unwrap();
    let input = workspace_file(
        &dir,
        "sd.xml",
        r#"<xml><block type="sd_close" id="close"/><block type="wobble" id="w" y="40"/></xml>"#,
    );
    let report = dir.path().join("report.json");
    let mut cli = args(input);
    cli.output = Some(dir.path().join("sd.c"));
    cli.board = Some(Board::Flip);
    cli.diagnostics_json = Some(report.clone());
    run_cli(&cli).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["count"], 2);
    assert_eq!(value["diagnostics"][0]["block_type"], "sd_close");
    assert_eq!(value["diagnostics"][1]["block_type"], "wobble");
}

#[test]
fn strict_mode_fails_on_diagnostics() {
    let dir = TempDir::new().unwrap();
    let input = workspace_file(&dir, "bad.xml", r#"<xml><block type="wobble"/></xml>"#);
    let mut cli = args(input);
    cli.output = Some(dir.path().join("bad.c"));
    cli.strict = true;
    let err = run_cli(&cli).unwrap_err();
    assert!(err.to_string().contains("--strict"));
    assert!(dir.path().join("bad.c").exists());
}

#[test]
fn missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = run_cli(&args(dir.path().join("nope.xml"))).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn malformed_xml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = workspace_file(&dir, "broken.xml", "<xml><block type=\"pause\">");
    let mut cli = args(input);
    cli.output = Some(dir.path().join("broken.c"));
    let err = run_cli(&cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Malformed XML"));
}

#[test]
fn board_attribute_is_read_from_file() {
    let dir = TempDir::new().unwrap();
    let input = workspace_file(
        &dir,
        "open.xml",
        r#"<xml board="s3"><block type="scribbler_stop"/></xml>"#,
    );
    let program = compile_workspace_file(&input, None).unwrap();
    assert!(program.source.contains("  s3_motorSet(0, 0, 0);\n"));
    assert!(program.diagnostics.is_empty());
}
