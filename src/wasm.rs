use crate::board::Board;
use wasm_bindgen::prelude::*;

fn board_option(board: Option<String>) -> Result<Option<Board>, JsValue> {
    board
        .map(|name| name.parse::<Board>())
        .transpose()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// C source for a workspace XML document, as the editor's compile button
/// sends it.
#[wasm_bindgen]
pub fn compile_workspace_xml(source: &str, board: Option<String>) -> Result<String, JsValue> {
    let board = board_option(board)?;
    crate::compile_workspace_xml(source, board)
        .map(|program| program.source)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Diagnostics for the same document as a JSON string.
#[wasm_bindgen]
pub fn workspace_diagnostics_json(source: &str, board: Option<String>) -> Result<String, JsValue> {
    let board = board_option(board)?;
    let program = crate::compile_workspace_xml(source, board)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(crate::diagnostics_json(&program.diagnostics).to_string())
}
