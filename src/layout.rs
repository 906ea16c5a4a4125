use crate::config::LayoutConfig;
use crate::model::{GraphNode, NodeKind, PedigreeGraph, LEVEL_COUNT};
use serde::{Deserialize, Serialize};

/// Which direction new space was added on the triggering level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Individual,
    Union,
}

/// One generational-row slot. `fixed` marks the anchors (father, union,
/// mother) whose x never moves during recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSlot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub fixed: bool,
    pub kind: SlotKind,
    pub parents: Option<String>,
}

impl LayoutSlot {
    pub fn individual(id: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            fixed: false,
            kind: SlotKind::Individual,
            parents: None,
        }
    }

    pub fn union(id: &str, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            fixed: false,
            kind: SlotKind::Union,
            parents: None,
        }
    }

    pub fn anchored(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn with_parents(mut self, parents: Option<&str>) -> Self {
        self.parents = parents.map(str::to_string);
        self
    }
}

/// The ordered per-level slot arrays: pure positional ground truth, no
/// business rules. Levels are 1-based in the public API.
#[derive(Debug, Clone)]
pub struct LayoutTable {
    levels: Vec<Vec<LayoutSlot>>,
    pub spacing: LayoutConfig,
}

impl LayoutTable {
    pub fn new(spacing: LayoutConfig) -> Self {
        Self {
            levels: vec![Vec::new(); LEVEL_COUNT],
            spacing,
        }
    }

    /// Seeds the table for a fresh chart: grandparents row, the fixed
    /// father/union/mother anchors, and the proband.
    pub fn starter(spacing: LayoutConfig) -> Self {
        let mut table = Self::new(spacing);
        table.levels[0] = vec![
            LayoutSlot::individual("father's father", 200.0, 140.0),
            LayoutSlot::union("fathersfather-fathersmother-settings", 300.0, 140.0),
            LayoutSlot::individual("father's mother", 400.0, 140.0),
            LayoutSlot::individual("mother's father", 600.0, 140.0),
            LayoutSlot::union("mothersfather-mothersmother-settings", 700.0, 140.0),
            LayoutSlot::individual("mother's mother", 800.0, 140.0),
        ];
        table.levels[1] = vec![
            LayoutSlot::individual("father", 300.0, 320.0)
                .with_parents(Some("fathersfather-fathersmother-settings"))
                .anchored(),
            LayoutSlot::union("father-mother-settings", 500.0, 320.0).anchored(),
            LayoutSlot::individual("mother", 700.0, 320.0)
                .with_parents(Some("mothersfather-mothersmother-settings"))
                .anchored(),
        ];
        table.levels[2] = vec![
            LayoutSlot::individual("proband", 500.0, 500.0)
                .with_parents(Some("father-mother-settings")),
        ];
        table
    }

    /// Rebuilds the table from a graph payload: nodes fall into their level
    /// row ordered left-to-right by x.
    pub fn from_graph(graph: &PedigreeGraph, spacing: LayoutConfig) -> Self {
        let mut table = Self::new(spacing);
        for node in graph.nodes.values() {
            if node.level == 0 || node.level > LEVEL_COUNT {
                continue;
            }
            table.levels[node.level - 1].push(slot_for(node));
        }
        for level in &mut table.levels {
            level.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        table
    }

    pub fn level(&self, level: usize) -> &[LayoutSlot] {
        self.levels
            .get(level.wrapping_sub(1))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    pub fn insert_at(&mut self, level: usize, index: usize, slot: LayoutSlot) {
        let Some(slots) = self.levels.get_mut(level.wrapping_sub(1)) else {
            return;
        };
        let index = index.min(slots.len());
        slots.insert(index, slot);
    }

    pub fn push(&mut self, level: usize, slot: LayoutSlot) {
        if let Some(slots) = self.levels.get_mut(level.wrapping_sub(1)) {
            slots.push(slot);
        }
    }

    pub fn unshift(&mut self, level: usize, slot: LayoutSlot) {
        self.insert_at(level, 0, slot);
    }

    /// Removes the id from whichever level holds it. Unknown ids are a no-op;
    /// cascading deletes issue removals speculatively.
    pub fn remove_id(&mut self, id: &str) {
        for level in &mut self.levels {
            level.retain(|slot| slot.id != id);
        }
    }

    pub fn find_level(&self, id: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|slot| slot.id == id))
            .map(|index| index + 1)
    }

    pub fn slot(&self, id: &str) -> Option<&LayoutSlot> {
        self.levels
            .iter()
            .flat_map(|level| level.iter())
            .find(|slot| slot.id == id)
    }

    pub fn index_in_level(&self, level: usize, id: &str) -> Option<usize> {
        self.level(level).iter().position(|slot| slot.id == id)
    }

    /// Recomputes x coordinates for a level after space was added or removed.
    ///
    /// The fixed core never moves. Everything left of the first fixed slot
    /// walks outward from it in `-horizontal_shift` steps, nearest first;
    /// everything right of the last fixed slot walks outward in
    /// `+horizontal_shift` steps. A level with no fixed slots degenerates to
    /// equal spacing rightward from its first element.
    ///
    /// Returns the updated slots so the rendering boundary can be patched.
    pub fn recalculate_level(
        &mut self,
        level: usize,
        _changed_id: &str,
        _side: Side,
    ) -> Vec<LayoutSlot> {
        let shift = self.spacing.horizontal_shift;
        let Some(slots) = self.levels.get_mut(level.wrapping_sub(1)) else {
            return Vec::new();
        };
        if slots.is_empty() {
            return Vec::new();
        }

        let first_fixed = slots.iter().position(|slot| slot.fixed);
        match first_fixed {
            None => {
                let first_x = slots[0].x;
                for (index, slot) in slots.iter_mut().enumerate() {
                    slot.x = first_x + shift * index as f32;
                }
            }
            Some(first) => {
                let last = slots.len()
                    - 1
                    - slots
                        .iter()
                        .rev()
                        .position(|slot| slot.fixed)
                        .unwrap_or(0);
                let left_x = slots[first].x;
                let right_x = slots[last].x;
                for (step, slot) in slots[..first].iter_mut().rev().enumerate() {
                    slot.x = left_x - shift * (step + 1) as f32;
                }
                for (step, slot) in slots[last + 1..].iter_mut().enumerate() {
                    slot.x = right_x + shift * (step + 1) as f32;
                }
            }
        }

        slots.clone()
    }
}

fn slot_for(node: &GraphNode) -> LayoutSlot {
    LayoutSlot {
        id: node.id.clone(),
        x: node.x.unwrap_or(0.0),
        y: node.y.unwrap_or(0.0),
        fixed: node.fixed,
        kind: match node.kind() {
            NodeKind::Union => SlotKind::Union,
            NodeKind::Individual => SlotKind::Individual,
        },
        parents: node.parents.clone(),
    }
}
