use crate::board::Board;
use crate::definitions::SetPinsVariant;
use crate::workspace::{Block, BlockId, Workspace, WorkspaceError};
use anyhow::{Context, Result};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use xmltree::{Element, XMLNode};

/// A workspace read from the editor's XML plus the board it was built for.
#[derive(Debug, Clone)]
pub struct WorkspaceDocument {
    pub workspace: Workspace,
    pub board: Option<Board>,
}

pub fn read_workspace_file(path: &Path) -> Result<WorkspaceDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", path.display()))?;
    load_workspace_xml(&text).with_context(|| format!("Invalid workspace XML in '{}'.", path.display()))
}

pub fn load_workspace_xml(source: &str) -> Result<WorkspaceDocument> {
    let root = Element::parse(Cursor::new(source.trim_start_matches('\u{feff}').as_bytes()))
        .map_err(|e| WorkspaceError {
            message: format!("Malformed XML: {}.", e),
        })?;
    if root.name != "xml" {
        return Err(WorkspaceError {
            message: format!("Expected <xml> root element, found <{}>.", root.name),
        }
        .into());
    }
    let board = match root.attributes.get("board") {
        Some(raw) => Some(raw.parse::<Board>()?),
        None => None,
    };

    let mut workspace = Workspace::new();
    for child in elements(&root) {
        match child.name.as_str() {
            "variables" => {
                for var in elements(child).filter(|e| e.name == "variable") {
                    let name = element_text(var);
                    if !name.is_empty() {
                        workspace.declare_variable(&name);
                    }
                }
            }
            "block" => {
                read_block(&mut workspace, child, true)?;
            }
            _ => {}
        }
    }
    Ok(WorkspaceDocument { workspace, board })
}

fn read_block(workspace: &mut Workspace, element: &Element, top_level: bool) -> Result<BlockId> {
    let kind = element
        .attributes
        .get("type")
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| WorkspaceError {
            message: "Block element is missing its 'type' attribute.".to_string(),
        })?;
    let id = element
        .attributes
        .get("id")
        .cloned()
        .unwrap_or_else(|| format!("{}#{}", kind, workspace.len()));

    let mut block = Block::new(id, kind.clone());
    block.x = parse_coord(element.attributes.get("x"));
    block.y = parse_coord(element.attributes.get("y"));
    block.disabled = element
        .attributes
        .get("disabled")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let block_id = if top_level {
        workspace.add_top_block(block)
    } else {
        workspace.add_block(block)
    };

    for child in elements(element) {
        match child.name.as_str() {
            "mutation" => {
                for (key, value) in child.attributes.iter() {
                    workspace
                        .block_mut(block_id)
                        .mutation
                        .insert(key.clone(), value.clone());
                }
            }
            "field" => {
                let name = attribute(child, "name")?;
                let text = element_text(child);
                if child.attributes.get("variabletype").is_some() || name == "VAR" {
                    workspace.declare_variable(&text);
                }
                workspace
                    .block_mut(block_id)
                    .fields
                    .insert(name, text);
            }
            "value" => {
                let name = attribute(child, "name")?;
                if let Some(inner) = connected_block(child) {
                    let inner_id = read_block(workspace, inner, false)?;
                    workspace.connect_value(block_id, &name, inner_id);
                }
            }
            "statement" => {
                let name = attribute(child, "name")?;
                if let Some(inner) = connected_block(child) {
                    let inner_id = read_block(workspace, inner, false)?;
                    workspace.connect_statement(block_id, &name, inner_id);
                }
            }
            "next" => {
                if let Some(inner) = connected_block(child) {
                    let inner_id = read_block(workspace, inner, false)?;
                    workspace.connect_next(block_id, inner_id);
                }
            }
            _ => {}
        }
    }

    if workspace.block(block_id).kind == "set_pins" {
        let current = workspace.block(block_id);
        let reshaped = SetPinsVariant::from_block(current).reshape(current);
        workspace.replace_block(block_id, reshaped)?;
    }
    Ok(block_id)
}

/// The block plugged into a socket. A real block wins over the socket's
/// shadow, which only stands in when nothing is connected.
fn connected_block(socket: &Element) -> Option<&Element> {
    elements(socket)
        .find(|e| e.name == "block")
        .or_else(|| elements(socket).find(|e| e.name == "shadow"))
}

fn elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) => Some(e),
        _ => None,
    })
}

fn element_text(element: &Element) -> String {
    element
        .get_text()
        .map(|t| t.to_string())
        .unwrap_or_default()
}

fn attribute(element: &Element, name: &str) -> Result<String> {
    element.attributes.get(name).cloned().ok_or_else(|| {
        WorkspaceError {
            message: format!("<{}> element is missing its '{}' attribute.", element.name, name),
        }
        .into()
    })
}

fn parse_coord(raw: Option<&String>) -> i64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}
