use crate::config::LayoutConfig;
use crate::edges::{self, EdgeDecorations, EdgeKind};
use crate::editing::{self, Palette, RelativeKind};
use crate::layout::{LayoutSlot, LayoutTable, Side};
use crate::model::{
    Ancestry, AncestryBadge, Cancer, EdgeRecord, GraphNode, PedigreeGraph, PedigreePayload,
};
use crate::surface::Surface;

/// Destination bucket for chart snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    PedigreeChart,
}

impl UploadCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadCategory::PedigreeChart => "pedigree-chart",
        }
    }
}

pub trait UploadSink {
    fn upload(
        &mut self,
        category: UploadCategory,
        filename: &str,
        bytes: &[u8],
    ) -> anyhow::Result<()>;
}

pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// The single writer for one open pedigree chart. Owns the graph, the slot
/// table and the pending palette, and mirrors every mutation onto a
/// [`Surface`].
#[derive(Debug)]
pub struct PedigreeSession {
    pub graph: PedigreeGraph,
    pub table: LayoutTable,
    pub palette: Palette,
    selected: Option<String>,
    edit_mode: bool,
    ancestry: AncestryBadge,
    seq: u64,
}

impl PedigreeSession {
    /// A fresh chart seeded with the three-generation starter pedigree.
    pub fn new(spacing: LayoutConfig) -> Self {
        Self {
            graph: PedigreeGraph::from_payload(PedigreePayload::starter()),
            table: LayoutTable::starter(spacing),
            palette: Palette::default(),
            selected: None,
            edit_mode: false,
            ancestry: AncestryBadge::default(),
            seq: 0,
        }
    }

    /// Replaces the whole chart with a stored payload, rebuilding the slot
    /// table from node coordinates.
    pub fn load(payload: PedigreePayload, spacing: LayoutConfig) -> Self {
        let graph = PedigreeGraph::from_payload(payload);
        let table = LayoutTable::from_graph(&graph, spacing);
        Self {
            graph,
            table,
            palette: Palette::default(),
            selected: None,
            edit_mode: false,
            ancestry: AncestryBadge::default(),
            seq: 0,
        }
    }

    pub fn replace_data<S: Surface>(&mut self, payload: PedigreePayload, surface: &mut S) {
        for id in self.graph.nodes.keys() {
            surface.remove_node(id);
        }
        self.graph = PedigreeGraph::from_payload(payload);
        self.table = LayoutTable::from_graph(&self.graph, self.table.spacing.clone());
        self.palette.clear();
        self.selected = None;
        for node in self.graph.nodes.values() {
            surface.add_node(node);
        }
        for edge in &self.graph.edges {
            surface.add_edge(edge);
        }
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
        if !on {
            self.selected = None;
            self.palette.clear();
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.palette.clear();
    }

    /// Opens the add-relative palette for an individual. Selecting a union
    /// marker or an unknown id clears the selection instead.
    pub fn select_node(&mut self, id: &str) {
        self.palette.clear();
        self.selected = match self.graph.node(id) {
            Some(node) if node.node_type != crate::model::NodeType::Union => {
                Some(node.id.clone())
            }
            _ => None,
        };
    }

    /// Steps a palette counter, subject to the level gates: no parents on the
    /// top generation, no children on the bottom one.
    pub fn update_palette(&mut self, kind: RelativeKind, delta: i32) {
        let Some(level) = self
            .selected
            .as_ref()
            .and_then(|id| self.graph.node(id))
            .map(|node| node.level)
        else {
            return;
        };
        if delta > 0 && !editing::can_add(level, kind) {
            return;
        }
        self.palette.update(kind, delta);
    }

    /// Materializes every pending palette count against the selected node.
    ///
    /// Spouses splice a union and a partner beside the individual, siblings
    /// grow the level on the side their couple layout dictates, children drop
    /// into the next generation. Parent counts are accepted by the palette
    /// but ignored here: the seeded chart already carries both parent rows
    /// and re-deriving ancestors is not an editing operation. Additions that
    /// the structure refuses (second spouse, sibling without parents, child
    /// on the deepest level) are skipped silently.
    pub fn submit_palette<S: Surface>(&mut self, surface: &mut S) {
        let Some(selected) = self.selected.clone() else {
            return;
        };
        let pending = self.palette.pending();
        self.palette.clear();

        for (kind, count) in pending {
            for _ in 0..count {
                if kind.is_parent() {
                    continue;
                }
                let Some(individual) = self.graph.node(&selected).cloned() else {
                    return;
                };
                if kind.is_spouse() {
                    self.add_spouse(&individual, kind, surface);
                } else if kind.is_sibling() {
                    self.add_sibling(&individual, kind, surface);
                } else {
                    self.add_child(&individual, kind, surface);
                }
            }
        }
        self.selected = None;
    }

    fn next_name(&mut self, base: &str, kind: RelativeKind) -> String {
        self.seq += 1;
        format!("{base}'s {} #{}", kind.palette_name(), self.seq)
    }

    fn add_spouse<S: Surface>(
        &mut self,
        individual: &GraphNode,
        kind: RelativeKind,
        surface: &mut S,
    ) {
        let spouse_id = self.next_name(&individual.id, kind);
        let union_id = format!("settings-{spouse_id}");
        let Some(insertion) =
            editing::add_individual(&mut self.table, individual, &spouse_id, Some(&union_id))
        else {
            return;
        };

        let mut union = GraphNode::union(&union_id, individual.level);
        if let Some(slot) = self.table.slot(&union_id) {
            union.x = Some(slot.x);
            union.y = Some(slot.y);
        }
        let mut spouse = GraphNode::individual(&spouse_id, kind.sex(), individual.level);
        spouse.label = Some(spouse_id.clone());
        spouse.spouse = Some(union_id.clone());
        // The partner inherits the individual's parent reference so the
        // child-placement scan treats the couple as one sibling run.
        spouse.parents = individual.parents.clone();
        if let Some(slot) = self.table.slot(&spouse_id) {
            spouse.x = Some(slot.x);
            spouse.y = Some(slot.y);
        }
        if let Some(node) = self.graph.node_mut(&individual.id) {
            node.spouse = Some(union_id.clone());
        }

        surface.add_node(&union);
        surface.add_node(&spouse);
        let left = EdgeRecord::new(&individual.id, &union_id, EdgeKind::Normal).with_anchors(1, 3);
        let right = EdgeRecord::new(&spouse_id, &union_id, EdgeKind::Normal).with_anchors(1, 3);
        surface.add_edge(&left);
        surface.add_edge(&right);
        self.graph.insert(union);
        self.graph.insert(spouse);
        self.graph.edges.push(left);
        self.graph.edges.push(right);

        self.recalculate(individual.level, &spouse_id, insertion.side, surface);
    }

    fn add_sibling<S: Surface>(
        &mut self,
        individual: &GraphNode,
        kind: RelativeKind,
        surface: &mut S,
    ) {
        let sibling_id = self.next_name(&individual.id, kind);
        let Some(insertion) =
            editing::add_individual(&mut self.table, individual, &sibling_id, None)
        else {
            return;
        };
        let parent_union = individual
            .parents
            .clone()
            .unwrap_or_default();

        let mut sibling = GraphNode::individual(&sibling_id, kind.sex(), individual.level);
        sibling.label = Some(sibling_id.clone());
        sibling.parents = Some(parent_union.clone());
        if let Some(slot) = self.table.slot(&sibling_id) {
            sibling.x = Some(slot.x);
            sibling.y = Some(slot.y);
        }
        if let Some(union) = self.graph.node_mut(&parent_union) {
            union.joint_children.push(sibling_id.clone());
        }

        surface.add_node(&sibling);
        let descent =
            EdgeRecord::new(&parent_union, &sibling_id, EdgeKind::Polyline).with_anchors(2, 0);
        surface.add_edge(&descent);
        self.graph.insert(sibling);
        self.graph.edges.push(descent);

        self.recalculate(individual.level, &sibling_id, insertion.side, surface);
    }

    fn add_child<S: Surface>(
        &mut self,
        individual: &GraphNode,
        kind: RelativeKind,
        surface: &mut S,
    ) {
        let child_id = self.next_name(&individual.id, kind);
        let Some(children_level) = editing::add_child(&mut self.table, individual, &child_id)
        else {
            return;
        };
        let union_id = individual
            .spouse
            .clone()
            .unwrap_or_default();

        let mut child = GraphNode::individual(&child_id, kind.sex(), children_level);
        child.label = Some(child_id.clone());
        child.parents = Some(union_id.clone());
        if let Some(slot) = self.table.slot(&child_id) {
            child.x = Some(slot.x);
            child.y = Some(slot.y);
        }
        if let Some(union) = self.graph.node_mut(&union_id) {
            union.joint_children.push(child_id.clone());
        }

        surface.add_node(&child);
        let descent =
            EdgeRecord::new(&union_id, &child_id, EdgeKind::Polyline).with_anchors(2, 0);
        surface.add_edge(&descent);
        self.graph.insert(child);
        self.graph.edges.push(descent);

        self.recalculate(children_level, &child_id, Side::Right, surface);
    }

    fn recalculate<S: Surface>(
        &mut self,
        level: usize,
        changed_id: &str,
        side: Side,
        surface: &mut S,
    ) {
        let slots = self.table.recalculate_level(level, changed_id, side);
        for slot in &slots {
            self.sync_slot(slot, surface);
        }
    }

    fn sync_slot<S: Surface>(&mut self, slot: &LayoutSlot, surface: &mut S) {
        if let Some(node) = self.graph.node_mut(&slot.id) {
            node.x = Some(slot.x);
            node.y = Some(slot.y);
        }
        surface.move_node(slot);
    }

    /// Deletes a node and applies the full cascade: unions, parentless
    /// co-spouses and joint descendants go with it, surviving co-spouses are
    /// widowed, and surviving parent unions lose the child reference.
    pub fn delete_node<S: Surface>(&mut self, id: &str, surface: &mut S) {
        let plan = editing::deletion_plan(&self.graph, id);
        for removed in &plan.removed {
            self.graph.remove(removed);
            surface.remove_node(removed);
        }
        editing::delete_relative(&mut self.table, &plan.removed);
        for (union_id, child) in &plan.pruned {
            if let Some(union) = self.graph.node_mut(union_id) {
                union.joint_children.retain(|existing| existing != child);
            }
        }
        for widowed in &plan.widowed {
            if let Some(node) = self.graph.node_mut(widowed) {
                node.spouse = None;
                surface.update_node(node);
            }
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| plan.contains(selected))
        {
            self.selected = None;
            self.palette.clear();
        }
    }

    /// Indices of the couple edges managed by the relationship editor of a
    /// union: every primary-styled edge pointing at the union marker.
    pub fn couple_edges(&self, union_id: &str) -> Vec<usize> {
        self.graph
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                (edge.target == union_id && edge.kind.is_primary()).then_some(index)
            })
            .collect()
    }

    /// Opens the relationship editor: highlights the couple's base lines.
    pub fn select_union<S: Surface>(&mut self, union_id: &str, surface: &mut S) {
        for index in self.couple_edges(union_id) {
            let edge = &mut self.graph.edges[index];
            edge.active = true;
            surface.update_edge(edge);
        }
    }

    /// Applies the radio-group selection: both couple edges take the new
    /// primary kind.
    pub fn change_couple_kind<S: Surface>(
        &mut self,
        union_id: &str,
        kind: EdgeKind,
        surface: &mut S,
    ) {
        if !kind.is_primary() {
            return;
        }
        for index in self.couple_edges(union_id) {
            let edge = &mut self.graph.edges[index];
            edge.kind = kind;
            edge.changed = true;
            surface.update_edge(edge);
        }
    }

    /// Applies the checkbox submission through the mutual-exclusion resolver
    /// and pushes the resolved decoration set onto both couple edges.
    pub fn change_couple_states<S: Surface>(
        &mut self,
        union_id: &str,
        submitted: &[EdgeKind],
        surface: &mut S,
    ) {
        let managed = self.couple_edges(union_id);
        let previous = managed
            .first()
            .map(|index| self.graph.edges[*index].decorations)
            .unwrap_or_default();
        let resolved = edges::resolve_states(previous, submitted);
        for index in managed {
            let edge = &mut self.graph.edges[index];
            edge.decorations = resolved;
            edge.changed = true;
            surface.update_edge(edge);
        }
    }

    pub fn couple_decorations(&self, union_id: &str) -> EdgeDecorations {
        self.couple_edges(union_id)
            .first()
            .map(|index| self.graph.edges[*index].decorations)
            .unwrap_or_default()
    }

    /// Closes the relationship editor: every highlight and changed flag is
    /// dropped so the chart returns to its resting stroke.
    pub fn close_settings<S: Surface>(&mut self, surface: &mut S) {
        for edge in &mut self.graph.edges {
            if edge.active || edge.changed {
                edge.active = false;
                edge.changed = false;
                surface.update_edge(edge);
            }
        }
        self.selected = None;
        self.palette.clear();
    }

    pub fn apply_cancer_glossary(&mut self, glossary: &[Cancer]) {
        self.graph.apply_cancer_glossary(glossary);
    }

    pub fn set_ancestry(&mut self, ancestry: AncestryBadge) {
        self.ancestry = ancestry;
    }

    /// `(paternal, maternal)` ancestry labels for the chart header.
    pub fn ancestry_labels(&self, glossary: &[Ancestry]) -> (String, String) {
        self.ancestry.labels(glossary)
    }

    /// Renders the chart and hands the SVG to the upload sink; the notifier
    /// gets a user-facing line either way.
    pub fn make_snapshot<U: UploadSink, N: Notifier>(
        &self,
        config: &crate::config::Config,
        sink: &mut U,
        notifier: &mut N,
    ) -> anyhow::Result<()> {
        let svg = crate::render::render_svg(
            &self.graph,
            config,
            &crate::render::RenderOptions::default(),
        );
        match sink.upload(UploadCategory::PedigreeChart, "pedigree.svg", svg.as_bytes()) {
            Ok(()) => notifier.notify("Pedigree chart saved"),
            Err(err) => notifier.notify(&format!("Failed to save pedigree chart: {err}")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceEvent};

    fn session() -> PedigreeSession {
        PedigreeSession::new(LayoutConfig::default())
    }

    #[test]
    fn spouse_submission_creates_union_pair_and_edges() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.select_node("proband");
        session.update_palette(RelativeKind::FemaleSpouse, 1);
        session.submit_palette(&mut surface);

        let spouse_id = "proband's femaleSpouse #1";
        let union_id = "settings-proband's femaleSpouse #1";
        let spouse = session.graph.node(spouse_id).unwrap();
        assert_eq!(spouse.spouse.as_deref(), Some(union_id));
        assert_eq!(
            session.graph.node("proband").unwrap().spouse.as_deref(),
            Some(union_id)
        );
        assert_eq!(session.table.slot(union_id).unwrap().x, 600.0);
        assert_eq!(session.table.slot(spouse_id).unwrap().x, 700.0);
        assert!(session
            .graph
            .edges
            .iter()
            .any(|edge| edge.source == "proband"
                && edge.target == union_id
                && edge.kind == EdgeKind::Normal
                && edge.source_anchor == Some(1)
                && edge.target_anchor == Some(3)));
        assert_eq!(surface.added_ids(), vec![union_id, spouse_id]);
    }

    #[test]
    fn second_spouse_submission_is_skipped_silently() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.select_node("proband");
        session.update_palette(RelativeKind::FemaleSpouse, 2);
        session.submit_palette(&mut surface);
        assert_eq!(surface.added_ids().len(), 2);
        assert_eq!(session.table.level(3).len(), 3);
    }

    #[test]
    fn sibling_submission_joins_parent_union_and_relayouts() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.select_node("father");
        session.update_palette(RelativeKind::Brother, 1);
        session.submit_palette(&mut surface);

        let sibling_id = "father's brother #1";
        let sibling = session.graph.node(sibling_id).unwrap();
        assert_eq!(
            sibling.parents.as_deref(),
            Some("fathersfather-fathersmother-settings")
        );
        assert!(session
            .graph
            .node("fathersfather-fathersmother-settings")
            .unwrap()
            .joint_children
            .contains(&sibling_id.to_string()));
        assert!(session.graph.edges.iter().any(|edge| {
            edge.kind == EdgeKind::Polyline && edge.target == sibling_id
        }));
        // Fixed anchors held their ground through the relayout.
        assert_eq!(session.graph.node("father").unwrap().x, Some(300.0));
        assert_eq!(session.graph.node(sibling_id).unwrap().x, Some(200.0));
        assert!(!surface.moved_ids().is_empty());
    }

    #[test]
    fn child_submission_lands_in_next_generation() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.select_node("father");
        session.update_palette(RelativeKind::Daughter, 1);
        session.submit_palette(&mut surface);

        let child_id = "father's daughter #1";
        let child = session.graph.node(child_id).unwrap();
        assert_eq!(child.level, 3);
        assert_eq!(child.parents.as_deref(), Some("father-mother-settings"));
        assert!(session
            .graph
            .node("father-mother-settings")
            .unwrap()
            .joint_children
            .contains(&child_id.to_string()));
    }

    #[test]
    fn parent_counts_are_ignored_at_submit() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.select_node("proband");
        session.update_palette(RelativeKind::Father, 1);
        session.update_palette(RelativeKind::Mother, 1);
        session.submit_palette(&mut surface);
        assert!(surface.events.is_empty());
    }

    #[test]
    fn palette_level_gates_block_counts() {
        let mut session = session();
        session.select_node("father's father");
        session.update_palette(RelativeKind::Father, 1);
        assert!(session.palette.is_empty());
        session.update_palette(RelativeKind::Brother, 1);
        assert!(!session.palette.is_empty());
    }

    #[test]
    fn deletion_applies_plan_to_graph_table_and_surface() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        session.delete_node("father", &mut surface);

        assert!(session.graph.node("father").is_none());
        assert!(session.graph.node("proband").is_none());
        assert!(session.graph.node("father-mother-settings").is_none());
        assert!(session.table.find_level("father").is_none());
        // mother survives widowed, pruned unions keep no stale child refs.
        let mother = session.graph.node("mother").unwrap();
        assert!(mother.spouse.is_none());
        assert!(session
            .graph
            .node("fathersfather-fathersmother-settings")
            .unwrap()
            .joint_children
            .is_empty());
        assert!(surface.removed_ids().contains(&"father"));
        assert!(surface
            .events
            .iter()
            .any(|event| matches!(event, SurfaceEvent::UpdateNode { id } if id == "mother")));
    }

    #[test]
    fn couple_state_change_flows_through_resolver() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        let union_id = "father-mother-settings";
        assert_eq!(session.couple_edges(union_id).len(), 2);

        session.change_couple_states(union_id, &[EdgeKind::Infertile], &mut surface);
        assert!(session.couple_decorations(union_id).infertile);

        session.change_couple_states(
            union_id,
            &[EdgeKind::Infertile, EdgeKind::InfertileByChoice],
            &mut surface,
        );
        let decorations = session.couple_decorations(union_id);
        assert!(decorations.infertile_by_choice);
        assert!(!decorations.infertile);
    }

    #[test]
    fn close_settings_clears_highlights() {
        let mut session = session();
        let mut surface = RecordingSurface::default();
        let union_id = "father-mother-settings";
        session.select_union(union_id, &mut surface);
        session.change_couple_kind(union_id, EdgeKind::Divorced, &mut surface);
        assert!(session.graph.edges.iter().any(|edge| edge.active));

        session.close_settings(&mut surface);
        assert!(session.graph.edges.iter().all(|edge| !edge.active));
        assert!(session.graph.edges.iter().all(|edge| !edge.changed));
        // The kind change itself persists.
        assert!(session
            .graph
            .edges
            .iter()
            .any(|edge| edge.kind == EdgeKind::Divorced));
    }

    #[test]
    fn snapshot_reports_through_notifier() {
        struct MemorySink {
            uploads: Vec<(UploadCategory, String, usize)>,
            fail: bool,
        }
        impl UploadSink for MemorySink {
            fn upload(
                &mut self,
                category: UploadCategory,
                filename: &str,
                bytes: &[u8],
            ) -> anyhow::Result<()> {
                if self.fail {
                    anyhow::bail!("storage offline");
                }
                self.uploads
                    .push((category, filename.to_string(), bytes.len()));
                Ok(())
            }
        }
        struct MemoryNotifier(Vec<String>);
        impl Notifier for MemoryNotifier {
            fn notify(&mut self, message: &str) {
                self.0.push(message.to_string());
            }
        }

        let session = session();
        let config = crate::config::Config::default();
        let mut sink = MemorySink {
            uploads: Vec::new(),
            fail: false,
        };
        let mut notifier = MemoryNotifier(Vec::new());
        session.make_snapshot(&config, &mut sink, &mut notifier).unwrap();
        assert_eq!(sink.uploads.len(), 1);
        assert_eq!(sink.uploads[0].0, UploadCategory::PedigreeChart);
        assert_eq!(sink.uploads[0].1, "pedigree.svg");
        assert!(sink.uploads[0].2 > 0);
        assert_eq!(notifier.0, vec!["Pedigree chart saved".to_string()]);

        let mut sink = MemorySink {
            uploads: Vec::new(),
            fail: true,
        };
        let mut notifier = MemoryNotifier(Vec::new());
        session.make_snapshot(&config, &mut sink, &mut notifier).unwrap();
        assert!(notifier.0[0].starts_with("Failed to save pedigree chart"));
    }
}
