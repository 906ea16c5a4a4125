use crate::edges::{EdgeDecorations, EdgeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Levels are 1-based generations: 1 = grandparents, 2 = parents,
/// 3 = proband's generation, 4 and 5 = descendants.
pub const LEVEL_COUNT: usize = 5;

pub const PROBAND_ID: &str = "proband";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid pedigree payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("node `{node}` references unknown union `{union}`")]
    UnknownUnion { node: String, union: String },
    #[error("edge endpoint `{0}` is not a node in the payload")]
    UnknownEdgeEndpoint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Default for Sex {
    fn default() -> Self {
        Sex::Unknown
    }
}

/// Tagged node discriminator. The wire strings are the shape-type names the
/// store has always carried, so payloads round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "pie-node-male")]
    Male,
    #[serde(rename = "pie-node-female")]
    Female,
    #[serde(rename = "pie-node-unknown")]
    Unknown,
    #[serde(rename = "settings")]
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Individual,
    Union,
}

impl NodeType {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeType::Union => NodeKind::Union,
            _ => NodeKind::Individual,
        }
    }

    pub fn sex(self) -> Sex {
        match self {
            NodeType::Male => Sex::Male,
            NodeType::Female => Sex::Female,
            NodeType::Unknown | NodeType::Union => Sex::Unknown,
        }
    }

    pub fn for_sex(sex: Sex) -> Self {
        match sex {
            Sex::Male => NodeType::Male,
            Sex::Female => NodeType::Female,
            Sex::Unknown => NodeType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancerDiagnosis {
    pub cancer_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancer {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ancestry {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deceased {
    pub is_deceased: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoptedIn {
    pub is_adopted_in: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoptedOut {
    pub is_adopted_out: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pregnancy {
    pub is_pregnant: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stillbirth {
    pub is_stillbirth: bool,
    pub sb_gestational_age: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpontaneousAbortion {
    pub is_sab: bool,
    pub sab_gestational_age: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerminationOfPregnancy {
    pub is_top: bool,
    pub top_gestational_age: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EctopicPregnancy {
    #[serde(rename = "isECT")]
    pub is_ect: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Infertile {
    pub is_infertile: bool,
    pub infertile_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfertileByChoice {
    pub is_infertile_by_choice: bool,
    pub infertile_by_choice_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndividualAttributes {
    pub deceased: Deceased,
    pub adopted_in: AdoptedIn,
    pub adopted_out: AdoptedOut,
    pub pregnancy: Pregnancy,
    pub stillbirth: Stillbirth,
    pub spontaneous_abortion: SpontaneousAbortion,
    pub termination_of_pregnancy: TerminationOfPregnancy,
    pub ectopic_pregnancy: EctopicPregnancy,
    pub infertile: Infertile,
    pub infertile_by_choice: InfertileByChoice,
}

impl IndividualAttributes {
    /// Pregnancy-loss attributes replace the sex glyph with the triangle.
    pub fn has_child_loss(&self) -> bool {
        self.spontaneous_abortion.is_sab
            || self.termination_of_pregnancy.is_top
            || self.ectopic_pregnancy.is_ect
    }

    pub fn triangle_label(&self) -> String {
        let mut label = String::new();
        if self.spontaneous_abortion.is_sab {
            if let Some(age) = self.spontaneous_abortion.sab_gestational_age {
                label = format!("{age} wk");
            }
        }
        if self.termination_of_pregnancy.is_top {
            if let Some(age) = self.termination_of_pregnancy.top_gestational_age {
                label = format!("{age} wk");
            }
        }
        if self.ectopic_pregnancy.is_ect {
            label = "ECT".to_string();
        }
        label
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub sex: Sex,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joint_children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancer_history: Vec<CancerDiagnosis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndividualAttributes>,
}

impl GraphNode {
    pub fn individual(id: &str, sex: Sex, level: usize) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            node_type: NodeType::for_sex(sex),
            sex,
            level,
            x: None,
            y: None,
            fixed: false,
            spouse: None,
            parents: None,
            joint_children: Vec::new(),
            individual_id: None,
            cancer_history: Vec::new(),
            attributes: None,
        }
    }

    pub fn union(id: &str, level: usize) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            node_type: NodeType::Union,
            sex: Sex::Unknown,
            level,
            x: None,
            y: None,
            fixed: false,
            spouse: None,
            parents: None,
            joint_children: Vec::new(),
            individual_id: None,
            cancer_history: Vec::new(),
            attributes: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node_type.kind()
    }

    pub fn is_proband(&self) -> bool {
        self.id == PROBAND_ID
    }

    /// Display title: pregnancy-loss and stillbirth labels override the name.
    pub fn title(&self) -> String {
        if let Some(attrs) = &self.attributes {
            if attrs.has_child_loss() {
                return attrs.triangle_label();
            }
            if attrs.stillbirth.is_stillbirth {
                return "SB".to_string();
            }
        }
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("Individual ({:?})", self.sex),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_anchor: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_anchor: Option<u8>,
    // Editor state, never persisted.
    #[serde(skip)]
    pub decorations: EdgeDecorations,
    #[serde(skip)]
    pub active: bool,
    #[serde(skip)]
    pub changed: bool,
}

impl EdgeRecord {
    pub fn new(source: &str, target: &str, kind: EdgeKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            source_anchor: None,
            target_anchor: None,
            decorations: EdgeDecorations::default(),
            active: false,
            changed: false,
        }
    }

    pub fn with_anchors(mut self, source_anchor: u8, target_anchor: u8) -> Self {
        self.source_anchor = Some(source_anchor);
        self.target_anchor = Some(target_anchor);
        self
    }
}

/// The store-shaped document: what arrives from (and returns to) the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedigreePayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<EdgeRecord>,
}

impl PedigreePayload {
    pub fn from_json(input: &str) -> Result<Self, PayloadError> {
        let payload: PedigreePayload = serde_json::from_str(input)?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), PayloadError> {
        let ids: std::collections::BTreeSet<&str> =
            self.nodes.iter().map(|node| node.id.as_str()).collect();
        for node in &self.nodes {
            for union in [&node.spouse, &node.parents].into_iter().flatten() {
                if !ids.contains(union.as_str()) {
                    return Err(PayloadError::UnknownUnion {
                        node: node.id.clone(),
                        union: union.clone(),
                    });
                }
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(PayloadError::UnknownEdgeEndpoint(endpoint.clone()));
                }
            }
        }
        Ok(())
    }

    /// The seeded three-generation pedigree every new chart starts from.
    pub fn starter() -> Self {
        let ff_union = "fathersfather-fathersmother-settings";
        let mf_union = "mothersfather-mothersmother-settings";
        let parent_union = "father-mother-settings";

        let mut nodes = Vec::new();
        let mut grandparent = |id: &str, sex: Sex, union: &str, x: f32| {
            let mut node = GraphNode::individual(id, sex, 1);
            node.label = Some(id.to_string());
            node.spouse = Some(union.to_string());
            node.x = Some(x);
            node.y = Some(140.0);
            node
        };
        nodes.push(grandparent("father's father", Sex::Male, ff_union, 200.0));
        let mut union = GraphNode::union(ff_union, 1);
        union.x = Some(300.0);
        union.y = Some(140.0);
        union.joint_children = vec!["father".to_string()];
        nodes.push(union);
        nodes.push(grandparent("father's mother", Sex::Female, ff_union, 400.0));
        nodes.push(grandparent("mother's father", Sex::Male, mf_union, 600.0));
        let mut union = GraphNode::union(mf_union, 1);
        union.x = Some(700.0);
        union.y = Some(140.0);
        union.joint_children = vec!["mother".to_string()];
        nodes.push(union);
        nodes.push(grandparent("mother's mother", Sex::Female, mf_union, 800.0));

        let mut father = GraphNode::individual("father", Sex::Male, 2);
        father.label = Some("father".to_string());
        father.spouse = Some(parent_union.to_string());
        father.parents = Some(ff_union.to_string());
        father.x = Some(300.0);
        father.y = Some(320.0);
        father.fixed = true;
        nodes.push(father);

        let mut union = GraphNode::union(parent_union, 2);
        union.x = Some(500.0);
        union.y = Some(320.0);
        union.fixed = true;
        union.joint_children = vec![PROBAND_ID.to_string()];
        nodes.push(union);

        let mut mother = GraphNode::individual("mother", Sex::Female, 2);
        mother.label = Some("mother".to_string());
        mother.spouse = Some(parent_union.to_string());
        mother.parents = Some(mf_union.to_string());
        mother.x = Some(700.0);
        mother.y = Some(320.0);
        mother.fixed = true;
        nodes.push(mother);

        let mut proband = GraphNode::individual(PROBAND_ID, Sex::Male, 3);
        proband.label = Some("Proband".to_string());
        proband.parents = Some(parent_union.to_string());
        proband.x = Some(500.0);
        proband.y = Some(500.0);
        nodes.push(proband);

        let edges = vec![
            EdgeRecord::new("father's father", ff_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new("father's mother", ff_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new(ff_union, "father", EdgeKind::Polyline).with_anchors(2, 0),
            EdgeRecord::new("mother's father", mf_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new("mother's mother", mf_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new(mf_union, "mother", EdgeKind::Polyline).with_anchors(2, 0),
            EdgeRecord::new("father", parent_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new("mother", parent_union, EdgeKind::Normal).with_anchors(1, 3),
            EdgeRecord::new(parent_union, PROBAND_ID, EdgeKind::Polyline).with_anchors(2, 0),
        ];

        PedigreePayload { nodes, edges }
    }
}

/// Retained in-memory model the session mutates; the single writer for the
/// whole editing flow.
#[derive(Debug, Clone, Default)]
pub struct PedigreeGraph {
    pub nodes: BTreeMap<String, GraphNode>,
    pub edges: Vec<EdgeRecord>,
}

impl PedigreeGraph {
    pub fn from_payload(payload: PedigreePayload) -> Self {
        let mut nodes = BTreeMap::new();
        for node in payload.nodes {
            nodes.insert(node.id.clone(), node);
        }
        Self {
            nodes,
            edges: payload.edges,
        }
    }

    pub fn to_payload(&self) -> PedigreePayload {
        PedigreePayload {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.clone(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    pub fn insert(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Removes the node and every edge touching it. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        self.nodes.remove(id);
        self.edges
            .retain(|edge| edge.source != id && edge.target != id);
    }

    /// Copies glossary name/color onto every diagnosis, matching by cancer id.
    pub fn apply_cancer_glossary(&mut self, glossary: &[Cancer]) {
        for node in self.nodes.values_mut() {
            for diagnosis in &mut node.cancer_history {
                if let Some(cancer) = glossary.iter().find(|c| c.id == diagnosis.cancer_id) {
                    diagnosis.name = Some(cancer.name.clone());
                    diagnosis.color = Some(cancer.color.clone());
                }
            }
        }
    }

    /// Distinct cancer ids across the chart, first-seen order, for the legend.
    pub fn cancer_ids(&self) -> Vec<i64> {
        let mut seen = Vec::new();
        for node in self.nodes.values() {
            for diagnosis in &node.cancer_history {
                if !seen.contains(&diagnosis.cancer_id) {
                    seen.push(diagnosis.cancer_id);
                }
            }
        }
        seen
    }
}

/// Proband ancestry ids split by lineage, as delivered by the ancestry fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AncestryBadge {
    pub paternal_ancestry: Vec<i64>,
    pub maternal_ancestry: Vec<i64>,
}

impl AncestryBadge {
    pub fn labels(&self, glossary: &[Ancestry]) -> (String, String) {
        (
            join_ancestry_names(&self.paternal_ancestry, glossary),
            join_ancestry_names(&self.maternal_ancestry, glossary),
        )
    }
}

fn join_ancestry_names(ids: &[i64], glossary: &[Ancestry]) -> String {
    let joined: Vec<&str> = ids
        .iter()
        .filter_map(|id| {
            glossary
                .iter()
                .find(|item| item.id == *id)
                .map(|item| item.name.as_str())
        })
        .collect();
    if joined.is_empty() {
        "Undefined".to_string()
    } else {
        joined.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_payload_round_trips() {
        let payload = PedigreePayload::starter();
        let json = serde_json::to_string(&payload).unwrap();
        let parsed = PedigreePayload::from_json(&json).unwrap();
        assert_eq!(parsed.nodes.len(), payload.nodes.len());
        assert_eq!(parsed.edges.len(), payload.edges.len());
        let proband = parsed
            .nodes
            .iter()
            .find(|node| node.id == PROBAND_ID)
            .unwrap();
        assert_eq!(proband.parents.as_deref(), Some("father-mother-settings"));
        assert_eq!(proband.level, 3);
    }

    #[test]
    fn node_type_wire_names_are_stable() {
        let json = serde_json::to_string(&NodeType::Female).unwrap();
        assert_eq!(json, "\"pie-node-female\"");
        let json = serde_json::to_string(&NodeType::Union).unwrap();
        assert_eq!(json, "\"settings\"");
    }

    #[test]
    fn payload_rejects_dangling_union_reference() {
        let mut payload = PedigreePayload::starter();
        payload.nodes[0].spouse = Some("missing-settings".to_string());
        let json = serde_json::to_string(&payload).unwrap();
        assert!(matches!(
            PedigreePayload::from_json(&json),
            Err(PayloadError::UnknownUnion { .. })
        ));
    }

    #[test]
    fn title_prefers_pregnancy_loss_labels() {
        let mut node = GraphNode::individual("n", Sex::Female, 4);
        node.label = Some("Ann".to_string());
        let mut attrs = IndividualAttributes::default();
        attrs.spontaneous_abortion.is_sab = true;
        attrs.spontaneous_abortion.sab_gestational_age = Some(12);
        node.attributes = Some(attrs);
        assert_eq!(node.title(), "12 wk");

        let mut attrs = IndividualAttributes::default();
        attrs.stillbirth.is_stillbirth = true;
        node.attributes = Some(attrs);
        assert_eq!(node.title(), "SB");
    }

    #[test]
    fn glossary_colors_diagnoses() {
        let glossary = vec![Cancer {
            id: 7,
            name: "Breast".to_string(),
            color: "#E91E63".to_string(),
        }];
        let mut graph = PedigreeGraph::from_payload(PedigreePayload::starter());
        graph.node_mut(PROBAND_ID).unwrap().cancer_history = vec![CancerDiagnosis {
            cancer_id: 7,
            age: Some(41),
            name: None,
            color: None,
        }];
        graph.apply_cancer_glossary(&glossary);
        let history = &graph.node(PROBAND_ID).unwrap().cancer_history[0];
        assert_eq!(history.name.as_deref(), Some("Breast"));
        assert_eq!(history.color.as_deref(), Some("#E91E63"));
        assert_eq!(graph.cancer_ids(), vec![7]);
    }
}
