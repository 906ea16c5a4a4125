use crate::layout::{LayoutTable, SlotKind};
use crate::model::PedigreeGraph;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub levels: Vec<LevelDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct LevelDump {
    pub level: usize,
    pub slots: Vec<SlotDump>,
}

#[derive(Debug, Serialize)]
pub struct SlotDump {
    pub id: String,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub fixed: bool,
    pub parents: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub node_type: String,
    pub level: usize,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub spouse: Option<String>,
    pub parents: Option<String>,
    pub joint_children: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub kind: String,
    pub source_anchor: Option<u8>,
    pub target_anchor: Option<u8>,
}

impl LayoutDump {
    pub fn from_table(table: &LayoutTable, graph: &PedigreeGraph) -> Self {
        let levels = (1..=table.level_count())
            .map(|level| LevelDump {
                level,
                slots: table
                    .level(level)
                    .iter()
                    .map(|slot| SlotDump {
                        id: slot.id.clone(),
                        kind: match slot.kind {
                            SlotKind::Union => "union".to_string(),
                            SlotKind::Individual => "individual".to_string(),
                        },
                        x: slot.x,
                        y: slot.y,
                        fixed: slot.fixed,
                        parents: slot.parents.clone(),
                    })
                    .collect(),
            })
            .collect();

        let nodes = graph
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                node_type: serde_json::to_value(node.node_type)
                    .ok()
                    .and_then(|value| value.as_str().map(str::to_string))
                    .unwrap_or_default(),
                level: node.level,
                x: node.x,
                y: node.y,
                spouse: node.spouse.clone(),
                parents: node.parents.clone(),
                joint_children: node.joint_children.clone(),
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: edge.kind.wire_name().to_string(),
                source_anchor: edge.source_anchor,
                target_anchor: edge.target_anchor,
            })
            .collect();

        LayoutDump {
            levels,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    table: &LayoutTable,
    graph: &PedigreeGraph,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_table(table, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
