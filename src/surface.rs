use crate::layout::LayoutSlot;
use crate::model::{EdgeRecord, GraphNode};

/// The rendering boundary the session drives. Implementations mirror graph
/// mutations onto whatever actually draws (an SVG scene, a test recorder).
pub trait Surface {
    fn add_node(&mut self, node: &GraphNode);
    fn add_edge(&mut self, edge: &EdgeRecord);
    fn move_node(&mut self, slot: &LayoutSlot);
    fn remove_node(&mut self, id: &str);
    fn update_node(&mut self, node: &GraphNode);
    fn update_edge(&mut self, edge: &EdgeRecord);
}

/// Drops every event; used when a caller only wants the data outcome.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn add_node(&mut self, _node: &GraphNode) {}
    fn add_edge(&mut self, _edge: &EdgeRecord) {}
    fn move_node(&mut self, _slot: &LayoutSlot) {}
    fn remove_node(&mut self, _id: &str) {}
    fn update_node(&mut self, _node: &GraphNode) {}
    fn update_edge(&mut self, _edge: &EdgeRecord) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    AddNode { id: String },
    AddEdge { source: String, target: String },
    MoveNode { id: String, x: f32, y: f32 },
    RemoveNode { id: String },
    UpdateNode { id: String },
    UpdateEdge { source: String, target: String },
}

/// Ordered event log, the test double for the drawing layer.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn added_ids(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::AddNode { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::RemoveNode { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn moved_ids(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::MoveNode { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn add_node(&mut self, node: &GraphNode) {
        self.events.push(SurfaceEvent::AddNode {
            id: node.id.clone(),
        });
    }

    fn add_edge(&mut self, edge: &EdgeRecord) {
        self.events.push(SurfaceEvent::AddEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
    }

    fn move_node(&mut self, slot: &LayoutSlot) {
        self.events.push(SurfaceEvent::MoveNode {
            id: slot.id.clone(),
            x: slot.x,
            y: slot.y,
        });
    }

    fn remove_node(&mut self, id: &str) {
        self.events.push(SurfaceEvent::RemoveNode { id: id.to_string() });
    }

    fn update_node(&mut self, node: &GraphNode) {
        self.events.push(SurfaceEvent::UpdateNode {
            id: node.id.clone(),
        });
    }

    fn update_edge(&mut self, edge: &EdgeRecord) {
        self.events.push(SurfaceEvent::UpdateEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
        });
    }
}
