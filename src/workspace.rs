use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BlockId = usize;

#[derive(Debug, Clone)]
pub struct WorkspaceError {
    pub message: String,
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for WorkspaceError {}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub id: String,
    pub kind: String,
    pub fields: HashMap<String, String>,
    pub values: HashMap<String, BlockId>,
    pub statements: HashMap<String, BlockId>,
    pub next: Option<BlockId>,
    pub mutation: HashMap<String, String>,
    pub disabled: bool,
    pub x: i64,
    pub y: i64,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_mutation(mut self, name: &str, value: impl Into<String>) -> Self {
        self.mutation.insert(name.to_string(), value.into());
        self
    }

    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn field_or<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        match self.field(name) {
            Some(v) if !v.trim().is_empty() => v,
            _ => fallback,
        }
    }

    pub fn mutation_value(&self, name: &str) -> Option<&str> {
        self.mutation.get(name).map(String::as_str)
    }

    /// Integer mutation attribute such as the `elseif` count of an if block.
    pub fn mutation_count(&self, name: &str) -> usize {
        self.mutation_value(name)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    blocks: Vec<Block>,
    top_level: Vec<BlockId>,
    by_type: HashMap<String, Vec<BlockId>>,
    variables: Vec<String>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = self.blocks.len();
        self.by_type.entry(block.kind.clone()).or_default().push(id);
        self.blocks.push(block);
        id
    }

    pub fn add_top_block(&mut self, block: Block) -> BlockId {
        let id = self.add_block(block);
        self.top_level.push(id);
        id
    }

    pub fn connect_value(&mut self, parent: BlockId, socket: &str, child: BlockId) {
        self.blocks[parent].values.insert(socket.to_string(), child);
    }

    pub fn connect_statement(&mut self, parent: BlockId, socket: &str, child: BlockId) {
        self.blocks[parent].statements.insert(socket.to_string(), child);
    }

    pub fn connect_next(&mut self, prev: BlockId, next: BlockId) {
        self.blocks[prev].next = Some(next);
    }

    pub fn chain(&mut self, ids: &[BlockId]) -> Option<BlockId> {
        for pair in ids.windows(2) {
            self.connect_next(pair[0], pair[1]);
        }
        ids.first().copied()
    }

    pub fn declare_variable(&mut self, name: &str) {
        if !self.variables.iter().any(|v| v == name) {
            self.variables.push(name.to_string());
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Swaps the block stored at `id` for `replacement`, keeping every link
    /// that points at `id`. Used for shape-changing blocks whose socket set
    /// depends on a dropdown: the new shape is a new block instance.
    pub fn replace_block(&mut self, id: BlockId, replacement: Block) -> Result<(), WorkspaceError> {
        let Some(slot) = self.blocks.get_mut(id) else {
            return Err(WorkspaceError {
                message: format!("Cannot replace missing block #{}.", id),
            });
        };
        let old_kind = std::mem::take(&mut slot.kind);
        if let Some(ids) = self.by_type.get_mut(&old_kind) {
            ids.retain(|existing| *existing != id);
        }
        self.by_type
            .entry(replacement.kind.clone())
            .or_default()
            .push(id);
        self.blocks[id] = replacement;
        Ok(())
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    /// Loader access for filling in fields and mutation state. Changing
    /// `kind` through this bypasses the type index; use `replace_block`.
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level blocks in canvas reading order: top to bottom, then left to
    /// right, then by editor id.
    pub fn top_blocks(&self) -> Vec<BlockId> {
        let mut ordered = self.top_level.clone();
        ordered.sort_by(|a, b| self.canvas_key(*a).cmp(&self.canvas_key(*b)));
        ordered
    }

    fn canvas_key(&self, id: BlockId) -> (i64, i64, &str) {
        let block = &self.blocks[id];
        (block.y, block.x, block.id.as_str())
    }

    pub fn blocks_of_type(&self, kind: &str) -> Vec<BlockId> {
        self.by_type
            .get(kind)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| !self.blocks[*id].disabled)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_type(&self, kind: &str) -> bool {
        !self.blocks_of_type(kind).is_empty()
    }

    pub fn contains_matching<F>(&self, kind: &str, predicate: F) -> bool
    where
        F: Fn(&Block) -> bool,
    {
        self.blocks_of_type(kind)
            .into_iter()
            .any(|id| predicate(&self.blocks[id]))
    }

    pub fn find_all<F>(&self, predicate: F) -> Vec<BlockId>
    where
        F: Fn(&Block) -> bool,
    {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| !block.disabled && predicate(block))
            .map(|(id, _)| id)
            .collect()
    }

    /// Enabled blocks of `kind` ordered the way the program reads them:
    /// canvas order of the stack that holds them, then position in the stack.
    pub fn blocks_of_type_in_program_order(&self, kind: &str) -> Vec<BlockId> {
        let wanted = self.blocks_of_type(kind).into_iter().collect::<HashSet<_>>();
        if wanted.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        for top in self.top_blocks() {
            self.collect_in_order(top, &wanted, &mut visited, &mut out);
        }
        out
    }

    fn collect_in_order(
        &self,
        start: BlockId,
        wanted: &HashSet<BlockId>,
        visited: &mut HashSet<BlockId>,
        out: &mut Vec<BlockId>,
    ) {
        let mut current = Some(start);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            if wanted.contains(&id) {
                out.push(id);
            }
            let block = &self.blocks[id];
            let mut values = block.values.iter().collect::<Vec<_>>();
            values.sort_by(|a, b| socket_key(a.0).cmp(&socket_key(b.0)));
            for (_, child) in values {
                self.collect_in_order(*child, wanted, visited, out);
            }
            let mut statements = block.statements.iter().collect::<Vec<_>>();
            statements.sort_by(|a, b| socket_key(a.0).cmp(&socket_key(b.0)));
            for (_, child) in statements {
                self.collect_in_order(*child, wanted, visited, out);
            }
            current = block.next;
        }
    }
}

/// Sort key for socket names with a branch number, so `DO2` comes before
/// `DO10`.
fn socket_key(name: &str) -> (&str, u64) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[stem.len()..].parse().unwrap_or(0);
    (stem, number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn top_blocks_follow_canvas_order() {
        let mut ws = Workspace::new();
        let lower = ws.add_top_block(Block::new("b", "pause").at(0, 200));
        let upper = ws.add_top_block(Block::new("a", "pause").at(50, 10));
        let left = ws.add_top_block(Block::new("c", "pause").at(0, 10));
        assert_eq!(ws.top_blocks(), vec![left, upper, lower]);
    }

    #[test]
    fn type_index_skips_disabled_blocks() {
        let mut ws = Workspace::new();
        ws.add_top_block(Block::new("a", "sd_init"));
        let mut off = Block::new("b", "sd_init");
        off.disabled = true;
        ws.add_top_block(off);
        assert_eq!(ws.blocks_of_type("sd_init").len(), 1);
        assert!(ws.contains_type("sd_init"));
        assert!(!ws.contains_type("sound_init"));
    }

    #[test]
    fn contains_matching_checks_fields() {
        let mut ws = Workspace::new();
        ws.add_top_block(Block::new("a", "array_init").with_field("VAR", "list"));
        assert!(ws.contains_matching("array_init", |b| b.field("VAR") == Some("list")));
        assert!(!ws.contains_matching("array_init", |b| b.field("VAR") == Some("other")));
    }

    #[test]
    fn replace_block_moves_type_index() {
        let mut ws = Workspace::new();
        let id = ws.add_top_block(Block::new("a", "set_pins"));
        ws.replace_block(id, Block::new("a", "make_pin")).unwrap();
        assert!(!ws.contains_type("set_pins"));
        assert_eq!(ws.blocks_of_type("make_pin"), vec![id]);
        assert!(ws.replace_block(99, Block::new("z", "x")).is_err());
    }

    #[test]
    fn program_order_walks_nested_statements() {
        let mut ws = Workspace::new();
        let outer = ws.add_top_block(Block::new("loop", "controls_repeat").at(0, 0));
        let inner = ws.add_block(Block::new("i1", "pwm_start"));
        let after = ws.add_block(Block::new("i2", "pwm_start"));
        ws.connect_statement(outer, "DO", inner);
        ws.connect_next(outer, after);
        let early = ws.add_top_block(Block::new("i0", "pwm_start").at(0, -10));
        assert_eq!(
            ws.blocks_of_type_in_program_order("pwm_start"),
            vec![early, inner, after]
        );
    }

    #[test]
    fn program_order_sorts_branch_numbers_numerically() {
        let mut ws = Workspace::new();
        let branch = ws.add_top_block(Block::new("if", "controls_if"));
        let tenth = ws.add_block(Block::new("t", "pwm_start"));
        let second = ws.add_block(Block::new("s", "pwm_start"));
        ws.connect_statement(branch, "DO10", tenth);
        ws.connect_statement(branch, "DO2", second);
        assert_eq!(
            ws.blocks_of_type_in_program_order("pwm_start"),
            vec![second, tenth]
        );
    }

    #[test]
    fn find_all_scans_every_enabled_block() {
        let mut ws = Workspace::new();
        let a = ws.add_top_block(Block::new("a", "sd_read").with_field("VAR", "buf"));
        let b = ws.add_block(Block::new("b", "eeprom_read").with_field("VAR", "buf"));
        ws.connect_next(a, b);
        let mut off = Block::new("c", "sd_read").with_field("VAR", "buf");
        off.disabled = true;
        ws.add_top_block(off);
        ws.add_top_block(Block::new("d", "sd_read").with_field("VAR", "other"));
        assert_eq!(ws.find_all(|block| block.field("VAR") == Some("buf")), vec![a, b]);
    }
}
