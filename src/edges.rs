use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EDGE_SHAPE_LINE_BASE: &str = "edge-shape-line";
pub const EDGE_SHAPE_LINE_ADDITIONAL: &str = "additional";

/// Relationship-edge vocabulary. `Normal`, `Separated`, `Divorced` and
/// `Casual` are the mutually-exclusive primary couple styles; the rest are
/// decorations or structural edge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Normal,
    Polyline,
    Separated,
    Divorced,
    Casual,
    Consanguineous,
    Infertile,
    InfertileByChoice,
    Deceased,
    AdoptedIn,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 10] = [
        EdgeKind::Normal,
        EdgeKind::Polyline,
        EdgeKind::Separated,
        EdgeKind::Divorced,
        EdgeKind::Casual,
        EdgeKind::Consanguineous,
        EdgeKind::Infertile,
        EdgeKind::InfertileByChoice,
        EdgeKind::Deceased,
        EdgeKind::AdoptedIn,
    ];

    /// The radio group in the relationship editor.
    pub const PRIMARY: [EdgeKind; 4] = [
        EdgeKind::Normal,
        EdgeKind::Separated,
        EdgeKind::Divorced,
        EdgeKind::Casual,
    ];

    /// The checkbox group in the relationship editor, in display order.
    pub const STATES: [EdgeKind; 3] = [
        EdgeKind::Consanguineous,
        EdgeKind::InfertileByChoice,
        EdgeKind::Infertile,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            EdgeKind::Normal => "normal",
            EdgeKind::Polyline => "polyline",
            EdgeKind::Separated => "separated",
            EdgeKind::Divorced => "divorced",
            EdgeKind::Casual => "casual",
            EdgeKind::Consanguineous => "consanguineous",
            EdgeKind::Infertile => "infertile",
            EdgeKind::InfertileByChoice => "infertile-by-choice",
            EdgeKind::Deceased => "deceased",
            EdgeKind::AdoptedIn => "adopted-in",
        }
    }

    pub fn is_primary(self) -> bool {
        EdgeKind::PRIMARY.contains(&self)
    }
}

#[derive(Debug, Clone)]
pub struct EdgeShapeNames {
    pub shape_name: String,
    pub shape_name_additional: String,
}

static EDGE_SHAPES: Lazy<BTreeMap<EdgeKind, EdgeShapeNames>> = Lazy::new(|| {
    EdgeKind::ALL
        .iter()
        .map(|kind| {
            let shape_name = format!("{EDGE_SHAPE_LINE_BASE}-{}", kind.wire_name());
            let shape_name_additional = format!("{shape_name}-{EDGE_SHAPE_LINE_ADDITIONAL}");
            (
                *kind,
                EdgeShapeNames {
                    shape_name,
                    shape_name_additional,
                },
            )
        })
        .collect()
});

pub fn shape_names(kind: EdgeKind) -> &'static EdgeShapeNames {
    &EDGE_SHAPES[&kind]
}

/// Matches the base line shapes (but not `-additional` masks) of an edge,
/// the set highlight-clearing resets when the editor closes.
pub fn is_base_line_shape(name: &str) -> bool {
    name.contains(EDGE_SHAPE_LINE_BASE) && !name.contains(EDGE_SHAPE_LINE_ADDITIONAL)
}

/// Independent boolean decorations layered on a primary edge line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDecorations {
    pub consanguineous: bool,
    pub infertile: bool,
    pub infertile_by_choice: bool,
}

impl EdgeDecorations {
    pub fn get(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Consanguineous => self.consanguineous,
            EdgeKind::Infertile => self.infertile,
            EdgeKind::InfertileByChoice => self.infertile_by_choice,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub kind: EdgeKind,
    pub value: bool,
}

/// Resolves a checkbox submission against the previous decoration state.
///
/// Consanguineous passes through untouched. Infertile and infertile-by-choice
/// are mutually exclusive: when a submission carries both, the one that was
/// NOT previously active wins, i.e. the freshly toggled box displaces the old
/// one instead of stacking on it.
pub fn resolve_states(previous: EdgeDecorations, submitted: &[EdgeKind]) -> EdgeDecorations {
    let wants_infertile = submitted.contains(&EdgeKind::Infertile);
    let wants_by_choice = submitted.contains(&EdgeKind::InfertileByChoice);

    let mut next = EdgeDecorations {
        consanguineous: submitted.contains(&EdgeKind::Consanguineous),
        infertile: false,
        infertile_by_choice: false,
    };

    if wants_infertile && !wants_by_choice {
        next.infertile = true;
    }
    if wants_by_choice && !wants_infertile {
        next.infertile_by_choice = true;
    }
    if wants_infertile && wants_by_choice {
        if previous.infertile && !previous.infertile_by_choice {
            next.infertile_by_choice = true;
        } else {
            next.infertile = true;
        }
    }

    next
}

/// The ordered {name, value} list applied to every managed edge after a
/// submission resolves.
pub fn state_changes(resolved: EdgeDecorations) -> Vec<StateChange> {
    EdgeKind::STATES
        .iter()
        .map(|kind| StateChange {
            kind: *kind,
            value: resolved.get(*kind),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in EdgeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.wire_name()));
            let back: EdgeKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn shape_registry_names() {
        let names = shape_names(EdgeKind::InfertileByChoice);
        assert_eq!(names.shape_name, "edge-shape-line-infertile-by-choice");
        assert_eq!(
            names.shape_name_additional,
            "edge-shape-line-infertile-by-choice-additional"
        );
        assert!(is_base_line_shape(&names.shape_name));
        assert!(!is_base_line_shape(&names.shape_name_additional));
        assert!(!is_base_line_shape("proband-marker"));
    }

    #[test]
    fn newly_toggled_infertile_flag_wins() {
        let previous = EdgeDecorations {
            consanguineous: false,
            infertile: true,
            infertile_by_choice: false,
        };
        let resolved = resolve_states(
            previous,
            &[EdgeKind::Infertile, EdgeKind::InfertileByChoice],
        );
        assert!(!resolved.infertile);
        assert!(resolved.infertile_by_choice);

        let previous = EdgeDecorations {
            consanguineous: false,
            infertile: false,
            infertile_by_choice: true,
        };
        let resolved = resolve_states(
            previous,
            &[EdgeKind::Infertile, EdgeKind::InfertileByChoice],
        );
        assert!(resolved.infertile);
        assert!(!resolved.infertile_by_choice);
    }

    #[test]
    fn single_infertile_selection_is_kept() {
        let resolved = resolve_states(EdgeDecorations::default(), &[EdgeKind::Infertile]);
        assert!(resolved.infertile && !resolved.infertile_by_choice);

        let resolved = resolve_states(EdgeDecorations::default(), &[EdgeKind::InfertileByChoice]);
        assert!(!resolved.infertile && resolved.infertile_by_choice);

        let resolved = resolve_states(
            EdgeDecorations {
                consanguineous: true,
                infertile: true,
                infertile_by_choice: false,
            },
            &[EdgeKind::Consanguineous],
        );
        assert!(resolved.consanguineous);
        assert!(!resolved.infertile && !resolved.infertile_by_choice);
    }

    #[test]
    fn both_requested_from_clean_state_keeps_infertile() {
        // Neither was active before, so the tie-break falls through to the
        // infertile branch, same as the reference resolution.
        let resolved = resolve_states(
            EdgeDecorations::default(),
            &[EdgeKind::Infertile, EdgeKind::InfertileByChoice],
        );
        assert!(resolved.infertile);
        assert!(!resolved.infertile_by_choice);
    }

    #[test]
    fn state_changes_follow_display_order() {
        let changes = state_changes(EdgeDecorations {
            consanguineous: true,
            infertile: false,
            infertile_by_choice: true,
        });
        assert_eq!(
            changes,
            vec![
                StateChange {
                    kind: EdgeKind::Consanguineous,
                    value: true
                },
                StateChange {
                    kind: EdgeKind::InfertileByChoice,
                    value: true
                },
                StateChange {
                    kind: EdgeKind::Infertile,
                    value: false
                },
            ]
        );
    }
}
