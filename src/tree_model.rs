//! Tree-view data abstraction and an arena-backed implementation.
//!
//! Node handles are generational indices: a handle to a removed node stays
//! detectably invalid even after its slot is reused, so rebuilds never leave
//! the browser holding a dangling row.

use std::path::{Path, PathBuf};

use crate::icon_cache::Icon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFlag {
    #[default]
    Normal,
    Separator,
}

/// Display fields of a single tree row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub icon: Option<Icon>,
    pub name: Option<String>,
    /// Absolute path for browsable rows; `None` for placeholders and separators.
    pub uri: Option<PathBuf>,
    pub tooltip: Option<String>,
    pub flag: RowFlag,
}

impl Row {
    pub fn entry(name: impl Into<String>, uri: PathBuf, icon: Option<Icon>) -> Self {
        let tooltip = crate::utils::tooltip_from_uri(&uri.to_string_lossy());
        Self {
            icon,
            name: Some(name.into()),
            uri: Some(uri),
            tooltip: Some(tooltip),
            flag: RowFlag::Normal,
        }
    }

    pub fn placeholder(label: &str) -> Self {
        Self {
            name: Some(label.to_string()),
            ..Self::default()
        }
    }

    pub fn separator() -> Self {
        Self {
            flag: RowFlag::Separator,
            ..Self::default()
        }
    }

    pub fn is_separator(&self) -> bool {
        self.flag == RowFlag::Separator
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// The capabilities the browser needs from a GUI tree model.
///
/// Insertions return `None` when `parent` is a removed row; the row is dropped.
pub trait TreeModel {
    fn prepend(&mut self, parent: Option<NodeId>, row: Row) -> Option<NodeId>;
    fn append(&mut self, parent: Option<NodeId>, row: Row) -> Option<NodeId>;
    /// Inserts after `sibling`, or first under `parent` when `sibling` is `None`.
    fn insert_after(
        &mut self,
        parent: Option<NodeId>,
        sibling: Option<NodeId>,
        row: Row,
    ) -> Option<NodeId>;
    /// Removes `node` and its whole subtree.
    fn remove(&mut self, node: NodeId) -> bool;
    fn clear(&mut self);
    fn children(&self, parent: Option<NodeId>) -> Vec<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn row(&self, node: NodeId) -> Option<&Row>;
    fn set_row(&mut self, node: NodeId, row: Row) -> bool;
    fn set_icon(&mut self, node: NodeId, icon: Option<Icon>) -> bool;
    fn is_valid(&self, node: NodeId) -> bool;
    fn is_expanded(&self, node: NodeId) -> bool;
    fn set_expanded(&mut self, node: NodeId, expanded: bool) -> bool;

    fn clear_children(&mut self, parent: Option<NodeId>) {
        for child in self.children(parent) {
            self.remove(child);
        }
    }

    fn has_children(&self, node: NodeId) -> bool {
        !self.children(Some(node)).is_empty()
    }

    fn uri(&self, node: NodeId) -> Option<&Path> {
        self.row(node)?.uri.as_deref()
    }

    /// Depth-first list of every node below `parent`.
    fn descendants(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(parent).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(Some(node)).into_iter().rev());
        }
        out
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    row: Row,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    expanded: bool,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    slots: Vec<Slot>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(node.index)?;
        if slot.generation != node.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(node.index)?;
        if slot.generation != node.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn allocate(&mut self, parent: Option<NodeId>, row: Row) -> NodeId {
        let data = NodeData {
            row,
            parent,
            children: Vec::new(),
            expanded: false,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(data);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(data),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(parent) => self.data_mut(parent).map(|data| &mut data.children),
            None => Some(&mut self.roots),
        }
    }

    /// Inserts at `position` (clamped) under `parent`.
    fn insert_at(
        &mut self,
        parent: Option<NodeId>,
        position: Option<usize>,
        row: Row,
    ) -> Option<NodeId> {
        if parent.is_some_and(|parent| !self.is_valid(parent)) {
            return None;
        }
        let node = self.allocate(parent, row);
        let siblings = self.siblings_mut(parent)?;
        let index = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, node);
        Some(node)
    }

    fn release(&mut self, node: NodeId) {
        if !self.is_valid(node) {
            return;
        }
        let slot = &mut self.slots[node.index];
        slot.generation = slot.generation.wrapping_add(1);
        let Some(data) = slot.node.take() else {
            return;
        };
        self.free.push(node.index);
        for child in data.children {
            self.release(child);
        }
    }
}

impl TreeModel for TreeStore {
    fn prepend(&mut self, parent: Option<NodeId>, row: Row) -> Option<NodeId> {
        self.insert_at(parent, Some(0), row)
    }

    fn append(&mut self, parent: Option<NodeId>, row: Row) -> Option<NodeId> {
        self.insert_at(parent, None, row)
    }

    fn insert_after(
        &mut self,
        parent: Option<NodeId>,
        sibling: Option<NodeId>,
        row: Row,
    ) -> Option<NodeId> {
        let position = sibling.and_then(|sibling| {
            let siblings = match parent {
                Some(parent) => &self.data(parent)?.children,
                None => &self.roots,
            };
            siblings
                .iter()
                .position(|candidate| *candidate == sibling)
                .map(|index| index + 1)
        });
        self.insert_at(parent, Some(position.unwrap_or(0)), row)
    }

    fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.data(node).map(|data| data.parent) else {
            return false;
        };
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|candidate| *candidate != node);
        }
        self.release(node);
        true
    }

    fn clear(&mut self) {
        for root in std::mem::take(&mut self.roots) {
            self.release(root);
        }
    }

    fn children(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        match parent {
            Some(parent) => self
                .data(parent)
                .map(|data| data.children.clone())
                .unwrap_or_default(),
            None => self.roots.clone(),
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node)?.parent
    }

    fn row(&self, node: NodeId) -> Option<&Row> {
        self.data(node).map(|data| &data.row)
    }

    fn set_row(&mut self, node: NodeId, row: Row) -> bool {
        match self.data_mut(node) {
            Some(data) => {
                data.row = row;
                true
            }
            None => false,
        }
    }

    fn set_icon(&mut self, node: NodeId, icon: Option<Icon>) -> bool {
        match self.data_mut(node) {
            Some(data) => {
                data.row.icon = icon;
                true
            }
            None => false,
        }
    }

    fn is_valid(&self, node: NodeId) -> bool {
        self.data(node).is_some()
    }

    fn is_expanded(&self, node: NodeId) -> bool {
        self.data(node).is_some_and(|data| data.expanded)
    }

    fn set_expanded(&mut self, node: NodeId, expanded: bool) -> bool {
        match self.data_mut(node) {
            Some(data) => {
                data.expanded = expanded;
                true
            }
            None => false,
        }
    }
}

/// Renders the visible tree as indented text, one row per line.
///
/// Children of collapsed rows are not shown.
pub fn render_tree(model: &dyn TreeModel) -> String {
    fn walk(model: &dyn TreeModel, parent: Option<NodeId>, depth: usize, out: &mut String) {
        for node in model.children(parent) {
            let Some(row) = model.row(node) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            if row.is_separator() {
                out.push_str(&format!("{indent}----\n"));
                continue;
            }
            let has_children = model.has_children(node);
            let expanded = model.is_expanded(node);
            let marker = match (has_children, expanded) {
                (true, true) => "v ",
                (true, false) => "> ",
                (false, _) => "  ",
            };
            out.push_str(&format!("{indent}{marker}{}\n", row.name()));
            if has_children && expanded {
                walk(model, Some(node), depth + 1, out);
            }
        }
    }

    let mut out = String::new();
    walk(model, None, 0, &mut out);
    out
}
