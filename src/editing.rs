use crate::layout::{LayoutSlot, LayoutTable, Side, SlotKind};
use crate::model::{GraphNode, PedigreeGraph, Sex, LEVEL_COUNT};
use std::collections::BTreeSet;

/// Where a freshly-inserted relative landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub level: usize,
    pub side: Side,
}

/// Inserts a spouse pair or a sibling into the individual's level.
///
/// Spouse mode (`new_union_id` given) splices a union slot and the spouse
/// slot immediately after the individual. It is refused when the individual
/// already has a spouse: one concurrent spouse-union pair per person.
///
/// Sibling mode is refused when the individual has no parents; siblings
/// require a shared parental union. The side is inferred from the adjacent
/// slots: a union to the left means the individual is the left half of a
/// couple, so the sibling grows the level rightward, and vice versa.
///
/// Refusals return `None` and leave the table untouched.
pub fn add_individual(
    table: &mut LayoutTable,
    individual: &GraphNode,
    new_node_id: &str,
    new_union_id: Option<&str>,
) -> Option<Insertion> {
    let level = individual.level;
    let x = individual.x.unwrap_or(0.0);
    let y = individual.y.unwrap_or(0.0);
    let shift = table.spacing.horizontal_shift;

    if let Some(union_id) = new_union_id {
        if individual.spouse.is_some() {
            return None;
        }
        let position = table.index_in_level(level, &individual.id)?;
        table.insert_at(level, position + 1, LayoutSlot::union(union_id, x + shift, y));
        table.insert_at(
            level,
            position + 2,
            LayoutSlot::individual(new_node_id, x + shift * 2.0, y)
                .with_parents(individual.parents.as_deref()),
        );
        return Some(Insertion {
            level,
            side: Side::Right,
        });
    }

    individual.parents.as_ref()?;
    let side = sibling_side(table, level, &individual.id);
    let sibling =
        LayoutSlot::individual(new_node_id, x, y).with_parents(individual.parents.as_deref());
    match side {
        Side::Left => {
            let mut sibling = sibling;
            sibling.x = x - shift;
            table.unshift(level, sibling);
        }
        Side::Right => {
            let mut sibling = sibling;
            // Provisional until recalculation walks the right part outward.
            sibling.x = x + shift * 2.0;
            table.push(level, sibling);
        }
    }
    Some(Insertion { level, side })
}

fn sibling_side(table: &LayoutTable, level: usize, id: &str) -> Side {
    let slots = table.level(level);
    let Some(index) = slots.iter().position(|slot| slot.id == id) else {
        return Side::Right;
    };
    if index > 0 && slots[index - 1].kind == SlotKind::Union {
        return Side::Right;
    }
    if slots.get(index + 1).map(|slot| slot.kind) == Some(SlotKind::Union) {
        return Side::Left;
    }
    Side::Right
}

/// Index in the children's level where a new child of this couple belongs.
///
/// The scan looks for the last existing child of the same union. A trailing
/// union slot after that child means the child married; when the married-in
/// spouse has no parents of their own the new sibling lands past the couple,
/// otherwise it lands before the child to keep the spouse's own sibling run
/// intact.
pub fn child_position(table: &LayoutTable, individual: &GraphNode) -> usize {
    let union_id = individual.spouse.as_deref();
    let children = table.level(individual.level + 1);

    let Some(last_child) = children
        .iter()
        .rposition(|slot| slot.parents.as_deref() == union_id && union_id.is_some())
    else {
        return 0;
    };

    let married = children.get(last_child + 1).map(|slot| slot.kind) == Some(SlotKind::Union);
    if !married {
        return last_child + 1;
    }
    let spouse_has_parents = children
        .get(last_child + 2)
        .is_some_and(|slot| slot.parents.is_some());
    if spouse_has_parents {
        last_child
    } else {
        last_child + 3
    }
}

/// Inserts a child of the individual's union into the next level down.
/// Returns the children's level, or `None` when the individual has no union
/// or already sits on the deepest level.
pub fn add_child(
    table: &mut LayoutTable,
    individual: &GraphNode,
    new_node_id: &str,
) -> Option<usize> {
    individual.spouse.as_ref()?;
    if individual.level >= LEVEL_COUNT {
        return None;
    }
    let children_level = individual.level + 1;
    let position = child_position(table, individual);

    let displaced = table.level(children_level).get(position).cloned();
    let (x, y) = match displaced {
        Some(slot) => (slot.x, slot.y),
        None => (
            individual.x.unwrap_or(0.0),
            individual.y.unwrap_or(0.0) + table.spacing.vertical_shift,
        ),
    };
    table.insert_at(
        children_level,
        position,
        LayoutSlot::individual(new_node_id, x, y).with_parents(individual.spouse.as_deref()),
    );
    Some(children_level)
}

/// Purges ids from every level. Unconditional and idempotent so cascades can
/// issue removals without checking first.
pub fn delete_relative(table: &mut LayoutTable, ids: &[String]) {
    for id in ids {
        table.remove_id(id);
    }
}

/// Everything a node deletion takes with it.
#[derive(Debug, Clone, Default)]
pub struct DeletionPlan {
    /// Node and union ids to remove, in removal order.
    pub removed: Vec<String>,
    /// `(surviving union, child)` pairs to drop from `joint_children`.
    pub pruned: Vec<(String, String)>,
    /// Co-spouses that survive (they have parents of their own) but lose
    /// their union; their `spouse` reference must be cleared.
    pub widowed: Vec<String>,
}

impl DeletionPlan {
    pub fn contains(&self, id: &str) -> bool {
        self.removed.iter().any(|removed| removed == id)
    }
}

/// Computes the cascade for deleting one node, using an explicit worklist so
/// deep pedigrees cannot overflow the stack.
///
/// A lone node is removed by itself. A spoused node takes its union, every
/// co-spouse on that union with no parents, and recursively all joint
/// children. A married-in descendant (spouse and parents both set) cascades
/// the same way and is additionally pruned from its parents' union; the
/// sibling linkage itself survives.
pub fn deletion_plan(graph: &PedigreeGraph, id: &str) -> DeletionPlan {
    let mut plan = DeletionPlan::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut worklist = vec![id.to_string()];

    while let Some(current) = worklist.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        plan.removed.push(current.clone());
        let Some(node) = graph.node(&current) else {
            continue;
        };

        if let Some(union_id) = &node.spouse {
            if seen.insert(union_id.clone()) {
                plan.removed.push(union_id.clone());
                for (other_id, other) in &graph.nodes {
                    if other_id == &current || other.spouse.as_ref() != Some(union_id) {
                        continue;
                    }
                    if other.parents.is_none() {
                        if seen.insert(other_id.clone()) {
                            plan.removed.push(other_id.clone());
                        }
                    } else if !plan.widowed.contains(other_id) {
                        plan.widowed.push(other_id.clone());
                    }
                }
                if let Some(union) = graph.node(union_id) {
                    worklist.extend(union.joint_children.iter().cloned());
                }
            }
        }

        if let Some(parent_union) = &node.parents {
            if !seen.contains(parent_union) {
                plan.pruned.push((parent_union.clone(), current.clone()));
            }
        }
    }

    // A widow found early may still fall to a later cascade branch.
    plan.widowed.retain(|id| !seen.contains(id));
    plan.pruned
        .retain(|(union_id, _)| !seen.contains(union_id));

    plan
}

/// The pending-relative counts behind the "add relative" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelativeKind {
    Father,
    Mother,
    MaleSpouse,
    FemaleSpouse,
    Brother,
    Sister,
    Son,
    Daughter,
    UnknownChild,
}

impl RelativeKind {
    pub const ALL: [RelativeKind; 9] = [
        RelativeKind::Father,
        RelativeKind::Mother,
        RelativeKind::MaleSpouse,
        RelativeKind::FemaleSpouse,
        RelativeKind::Brother,
        RelativeKind::Sister,
        RelativeKind::Son,
        RelativeKind::Daughter,
        RelativeKind::UnknownChild,
    ];

    pub fn palette_name(self) -> &'static str {
        match self {
            RelativeKind::Father => "father",
            RelativeKind::Mother => "mother",
            RelativeKind::MaleSpouse => "maleSpouse",
            RelativeKind::FemaleSpouse => "femaleSpouse",
            RelativeKind::Brother => "brother",
            RelativeKind::Sister => "sister",
            RelativeKind::Son => "son",
            RelativeKind::Daughter => "daughter",
            RelativeKind::UnknownChild => "unknownChild",
        }
    }

    pub fn sex(self) -> Sex {
        match self {
            RelativeKind::Father
            | RelativeKind::MaleSpouse
            | RelativeKind::Brother
            | RelativeKind::Son => Sex::Male,
            RelativeKind::Mother
            | RelativeKind::FemaleSpouse
            | RelativeKind::Sister
            | RelativeKind::Daughter => Sex::Female,
            RelativeKind::UnknownChild => Sex::Unknown,
        }
    }

    pub fn is_parent(self) -> bool {
        matches!(self, RelativeKind::Father | RelativeKind::Mother)
    }

    pub fn is_spouse(self) -> bool {
        matches!(self, RelativeKind::MaleSpouse | RelativeKind::FemaleSpouse)
    }

    pub fn is_sibling(self) -> bool {
        matches!(self, RelativeKind::Brother | RelativeKind::Sister)
    }

    pub fn is_child(self) -> bool {
        matches!(
            self,
            RelativeKind::Son | RelativeKind::Daughter | RelativeKind::UnknownChild
        )
    }
}

/// Whether a relative kind may be added to a node on the given level: the
/// top level has no room for parents, the bottom level none for children.
pub fn can_add(level: usize, kind: RelativeKind) -> bool {
    (level > 1 && level < LEVEL_COUNT)
        || (level == 1 && !kind.is_parent())
        || (level == LEVEL_COUNT && !kind.is_child())
}

#[derive(Debug, Clone, Default)]
pub struct Palette {
    counts: std::collections::BTreeMap<RelativeKind, u32>,
}

impl Palette {
    pub fn update(&mut self, kind: RelativeKind, delta: i32) {
        let entry = self.counts.entry(kind).or_insert(0);
        *entry = entry.saturating_add_signed(delta);
    }

    pub fn count(&self, kind: RelativeKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|count| *count == 0)
    }

    /// Pending counts in the fixed palette order.
    pub fn pending(&self) -> Vec<(RelativeKind, u32)> {
        RelativeKind::ALL
            .iter()
            .filter_map(|kind| {
                let count = self.count(*kind);
                (count > 0).then_some((*kind, count))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::PedigreePayload;

    fn starter_table() -> LayoutTable {
        LayoutTable::starter(LayoutConfig::default())
    }

    fn node(id: &str, level: usize, x: f32, y: f32) -> GraphNode {
        let mut node = GraphNode::individual(id, Sex::Male, level);
        node.x = Some(x);
        node.y = Some(y);
        node
    }

    #[test]
    fn spouse_mode_refused_when_already_spoused() {
        let mut table = starter_table();
        let mut father = node("father", 2, 300.0, 320.0);
        father.spouse = Some("father-mother-settings".to_string());
        let before = table.level(2).len();
        let result = add_individual(&mut table, &father, "new spouse", Some("settings-new"));
        assert!(result.is_none());
        assert_eq!(table.level(2).len(), before);
    }

    #[test]
    fn spouse_mode_splices_union_then_spouse() {
        let mut table = starter_table();
        let proband = node("proband", 3, 500.0, 500.0);
        let result = add_individual(
            &mut table,
            &proband,
            "proband's spouse",
            Some("settings-proband's spouse"),
        )
        .unwrap();
        assert_eq!(result.level, 3);
        let slots = table.level(3);
        assert_eq!(slots[0].id, "proband");
        assert_eq!(slots[1].id, "settings-proband's spouse");
        assert_eq!(slots[1].kind, SlotKind::Union);
        assert_eq!(slots[1].x, 600.0);
        assert_eq!(slots[2].id, "proband's spouse");
        assert_eq!(slots[2].x, 700.0);
    }

    #[test]
    fn sibling_mode_refused_without_parents() {
        let mut table = starter_table();
        let orphan = node("father's father", 1, 200.0, 140.0);
        let before = table.level(1).len();
        assert!(add_individual(&mut table, &orphan, "sibling", None).is_none());
        assert_eq!(table.level(1).len(), before);
    }

    #[test]
    fn sibling_left_of_couple_goes_left() {
        // Father's right neighbor is the couple union, so the sibling grows
        // the level leftward, one shift from the anchor.
        let mut table = starter_table();
        let mut father = node("father", 2, 300.0, 320.0);
        father.parents = Some("fathersfather-fathersmother-settings".to_string());
        let result = add_individual(&mut table, &father, "father's brother", None).unwrap();
        assert_eq!(result.side, Side::Left);
        let slots = table.level(2);
        assert_eq!(slots[0].id, "father's brother");
        assert_eq!(slots[0].x, 200.0);
        table.recalculate_level(2, "father", Side::Left);
        assert_eq!(table.slot("father's brother").unwrap().x, 200.0);
        assert_eq!(table.slot("father").unwrap().x, 300.0);
        assert_eq!(table.slot("mother").unwrap().x, 700.0);
    }

    #[test]
    fn sibling_right_of_couple_goes_right() {
        let mut table = starter_table();
        let mut mother = node("mother", 2, 700.0, 320.0);
        mother.parents = Some("mothersfather-mothersmother-settings".to_string());
        let result = add_individual(&mut table, &mother, "mother's sister", None).unwrap();
        assert_eq!(result.side, Side::Right);
        assert_eq!(table.level(2).last().unwrap().id, "mother's sister");
        table.recalculate_level(2, "mother", Side::Right);
        assert_eq!(table.slot("mother's sister").unwrap().x, 800.0);
    }

    #[test]
    fn first_child_lands_at_position_zero() {
        let mut table = starter_table();
        let mut father = node("father", 2, 300.0, 320.0);
        father.spouse = Some("father-mother-settings".to_string());
        // Clear the proband so the children's level starts empty.
        table.remove_id("proband");
        let level = add_child(&mut table, &father, "first child").unwrap();
        assert_eq!(level, 3);
        let slots = table.level(3);
        assert_eq!(slots[0].id, "first child");
        assert_eq!(slots[0].x, 300.0);
        assert_eq!(slots[0].y, 500.0);
        assert_eq!(slots[0].parents.as_deref(), Some("father-mother-settings"));
    }

    #[test]
    fn next_child_lands_after_last_sibling() {
        let mut table = starter_table();
        let mut father = node("father", 2, 300.0, 320.0);
        father.spouse = Some("father-mother-settings".to_string());
        add_child(&mut table, &father, "second child").unwrap();
        let slots = table.level(3);
        assert_eq!(slots[0].id, "proband");
        assert_eq!(slots[1].id, "second child");
    }

    #[test]
    fn child_skips_married_sibling_couple() {
        let mut table = starter_table();
        // Marry the proband to someone without parents.
        let proband = {
            let mut node = node("proband", 3, 500.0, 500.0);
            node.parents = Some("father-mother-settings".to_string());
            node
        };
        add_individual(&mut table, &proband, "proband's wife", Some("settings-pw")).unwrap();

        let mut father = node("father", 2, 300.0, 320.0);
        father.spouse = Some("father-mother-settings".to_string());
        assert_eq!(child_position(&table, &father), 3);
        add_child(&mut table, &father, "third child").unwrap();
        assert_eq!(table.level(3)[3].id, "third child");
    }

    #[test]
    fn child_lands_before_sibling_when_spouse_has_parents() {
        let mut table = starter_table();
        let proband = {
            let mut node = node("proband", 3, 500.0, 500.0);
            node.parents = Some("father-mother-settings".to_string());
            node
        };
        add_individual(&mut table, &proband, "proband's wife", Some("settings-pw")).unwrap();
        // Give the married-in spouse parents of their own.
        {
            let index = table.index_in_level(3, "proband's wife").unwrap();
            let slot = table.level(3)[index].clone().with_parents(Some("in-laws"));
            table.remove_id("proband's wife");
            table.insert_at(3, index, slot);
        }
        let mut father = node("father", 2, 300.0, 320.0);
        father.spouse = Some("father-mother-settings".to_string());
        assert_eq!(child_position(&table, &father), 0);
    }

    #[test]
    fn cascade_removes_spouse_chain_and_children() {
        let graph = PedigreeGraph::from_payload(PedigreePayload::starter());
        // Deleting a root-generation spouse takes the union, the parentless
        // co-spouse, and every joint child's own cascade.
        let plan = deletion_plan(&graph, "father's father");
        for id in [
            "father's father",
            "fathersfather-fathersmother-settings",
            "father's mother",
            "father",
            "father-mother-settings",
            "proband",
        ] {
            assert!(plan.contains(id), "{id} missing from cascade");
        }
        // mother married in from the other grandparent union: she survives
        // widowed, and every union she was pruned from is itself removed.
        assert!(!plan.contains("mother"));
        assert_eq!(plan.widowed, vec!["mother".to_string()]);
        assert!(plan.pruned.is_empty());

        let mut table = starter_table();
        delete_relative(&mut table, &plan.removed);
        for id in &plan.removed {
            assert!(table.find_level(id).is_none(), "{id} still laid out");
        }
        assert!(table.find_level("mother").is_some());
    }

    #[test]
    fn married_in_descendant_cascades_and_is_pruned_from_parents() {
        let mut graph = PedigreeGraph::from_payload(PedigreePayload::starter());
        let plan = deletion_plan(&graph, "father");
        assert!(plan.contains("father"));
        assert!(plan.contains("father-mother-settings"));
        assert!(plan.contains("proband"));
        assert!(!plan.contains("mother"));
        assert_eq!(plan.widowed, vec!["mother".to_string()]);
        // father is pruned from his own parents' union, which survives.
        assert_eq!(
            plan.pruned,
            vec![(
                "fathersfather-fathersmother-settings".to_string(),
                "father".to_string()
            )]
        );

        for (union_id, child) in &plan.pruned {
            if let Some(union) = graph.node_mut(union_id) {
                union.joint_children.retain(|id| id != child);
            }
        }
        assert!(graph
            .node("fathersfather-fathersmother-settings")
            .unwrap()
            .joint_children
            .is_empty());
    }

    #[test]
    fn lone_node_deletes_alone() {
        let graph = PedigreeGraph::from_payload(PedigreePayload::starter());
        let plan = deletion_plan(&graph, "proband");
        assert_eq!(plan.removed, vec!["proband".to_string()]);
        assert_eq!(
            plan.pruned,
            vec![(
                "father-mother-settings".to_string(),
                "proband".to_string()
            )]
        );
    }

    #[test]
    fn palette_counts_floor_at_zero() {
        let mut palette = Palette::default();
        palette.update(RelativeKind::Brother, 2);
        palette.update(RelativeKind::Brother, -1);
        palette.update(RelativeKind::Sister, -3);
        assert_eq!(palette.count(RelativeKind::Brother), 1);
        assert_eq!(palette.count(RelativeKind::Sister), 0);
        assert_eq!(palette.pending(), vec![(RelativeKind::Brother, 1)]);
        palette.clear();
        assert!(palette.is_empty());
    }

    #[test]
    fn level_gates_for_palette() {
        assert!(can_add(3, RelativeKind::Father));
        assert!(!can_add(1, RelativeKind::Father));
        assert!(can_add(1, RelativeKind::Brother));
        assert!(!can_add(5, RelativeKind::Son));
        assert!(can_add(5, RelativeKind::MaleSpouse));
    }
}
