use crate::config::ChartConfig;
use crate::edges::{shape_names, EdgeDecorations, EdgeKind};
use crate::model::{GraphNode, NodeType, Sex};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    /// SVG elliptical arc to (x, y).
    Arc {
        rx: f32,
        ry: f32,
        sweep: bool,
        x: f32,
        y: f32,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Path(Vec<PathCmd>),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        /// Corner radii, clockwise from top-left.
        radius: [f32; 4],
    },
    Polygon(Vec<(f32, f32)>),
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        font_weight: u32,
    },
}

/// One entry of a node/edge display list. Shape names are the addressable
/// handles the highlight rules and tests target.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub geometry: Geometry,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub line_width: f32,
    pub line_dash: Option<Vec<f32>>,
}

impl Shape {
    fn path(name: &str, cmds: Vec<PathCmd>) -> Self {
        Self {
            name: name.to_string(),
            geometry: Geometry::Path(cmds),
            fill: None,
            stroke: None,
            line_width: 1.0,
            line_dash: None,
        }
    }

    fn stroked(mut self, stroke: &str, line_width: f32) -> Self {
        self.stroke = Some(stroke.to_string());
        self.line_width = line_width;
        self
    }

    fn filled(mut self, fill: &str) -> Self {
        self.fill = Some(fill.to_string());
        self
    }

    fn dashed(mut self, dash: Vec<f32>) -> Self {
        self.line_dash = Some(dash);
        self
    }
}

/// Node-local coordinate frame: (0, 0) is the glyph center.
#[derive(Debug, Clone, Copy)]
struct Coords {
    start: f32,
    middle: f32,
    end: f32,
}

fn coords(size: f32) -> Coords {
    Coords {
        start: -size / 2.0,
        middle: 0.0,
        end: size / 2.0,
    }
}

/// Closed set of node glyphs; replaces the per-type-string callback
/// registration of a generic canvas engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGlyph {
    Male,
    Female,
    Unknown,
    Union,
}

impl NodeGlyph {
    pub fn for_node(node: &GraphNode) -> Self {
        match node.node_type {
            NodeType::Male => NodeGlyph::Male,
            NodeType::Female => NodeGlyph::Female,
            NodeType::Unknown => NodeGlyph::Unknown,
            NodeType::Union => NodeGlyph::Union,
        }
    }

    /// Builds the full display list for a node, in paint order, in the
    /// node-local frame.
    pub fn display_list(
        self,
        node: &GraphNode,
        active: bool,
        theme: &Theme,
        chart: &ChartConfig,
    ) -> Vec<Shape> {
        if self == NodeGlyph::Union {
            return vec![union_marker(theme, chart)];
        }

        let size = chart.node_size;
        let c = coords(size);
        let child_loss = node
            .attributes
            .as_ref()
            .is_some_and(|attrs| attrs.has_child_loss());
        let mut shapes = Vec::new();

        if let Some(attrs) = &node.attributes {
            if attrs.infertile.is_infertile {
                shapes.extend(draw_infertile(
                    (c.middle, c.middle),
                    false,
                    false,
                    theme,
                    chart,
                ));
                if let Some(reason) = &attrs.infertile.infertile_reason {
                    shapes.push(infertile_reason(reason, c, theme, chart));
                }
            }
            if attrs.infertile_by_choice.is_infertile_by_choice {
                shapes.push(draw_infertile_by_choice(
                    (c.middle, c.middle),
                    false,
                    false,
                    theme,
                    chart,
                ));
                if let Some(reason) = &attrs.infertile_by_choice.infertile_by_choice_reason {
                    shapes.push(infertile_reason(reason, c, theme, chart));
                }
            }
        }

        shapes.push(self.container(child_loss, theme, chart));

        if !node.cancer_history.is_empty() && !child_loss {
            shapes.extend(self.cancer_sectors(node, theme, chart));
        }

        if let Some(attrs) = &node.attributes {
            if attrs.deceased.is_deceased || attrs.stillbirth.is_stillbirth {
                shapes.push(strike(c, theme, chart));
            }
            if attrs.adopted_in.is_adopted_in || attrs.adopted_out.is_adopted_out {
                shapes.push(adoption_brackets(c, theme, chart));
            }
            if attrs.pregnancy.is_pregnant {
                shapes.push(Shape {
                    name: "label-pregnancy".to_string(),
                    geometry: Geometry::Text {
                        x: c.middle,
                        y: c.middle + 14.0,
                        text: "P".to_string(),
                        font_size: 40.0,
                        font_weight: 400,
                    },
                    fill: Some(theme.text_color.clone()),
                    stroke: Some("white".to_string()),
                    line_width: 1.0,
                    line_dash: None,
                });
            }
        }

        shapes.push(self.border(node, child_loss, active, theme, chart));

        if node.is_proband() {
            shapes.push(proband_marker(self, child_loss, theme, chart));
        }

        shapes
    }

    fn container(self, child_loss: bool, theme: &Theme, chart: &ChartConfig) -> Shape {
        let size = chart.node_size;
        let c = coords(size);
        let fill = theme.fill_common.clone();
        if child_loss {
            return Shape {
                name: "shape-container".to_string(),
                geometry: Geometry::Path(triangle_path(c)),
                fill: Some(fill),
                stroke: None,
                line_width: chart.line_width,
                line_dash: None,
            };
        }
        let radius = if self == NodeGlyph::Female {
            [size / 2.0; 4]
        } else {
            [0.0; 4]
        };
        Shape {
            name: "shape-container".to_string(),
            geometry: Geometry::Rect {
                x: c.start,
                y: c.start,
                width: size,
                height: size,
                radius,
            },
            fill: Some(fill),
            stroke: None,
            line_width: chart.line_width,
            line_dash: None,
        }
    }

    fn border(
        self,
        node: &GraphNode,
        child_loss: bool,
        active: bool,
        theme: &Theme,
        chart: &ChartConfig,
    ) -> Shape {
        let size = chart.node_size;
        let c = coords(size);
        let stroke = if active {
            theme.stroke_active.clone()
        } else {
            stroke_for(node.cancer_history.len(), theme, chart)
        };
        let line_width = if active {
            chart.line_width_active
        } else {
            chart.line_width
        };

        let geometry = if child_loss {
            Geometry::Path(triangle_path(c))
        } else if self == NodeGlyph::Unknown {
            Geometry::Path(rhombus_path(c))
        } else {
            Geometry::Rect {
                x: c.start,
                y: c.start,
                width: size,
                height: size,
                radius: if self == NodeGlyph::Female {
                    [size / 2.0; 4]
                } else {
                    [0.0; 4]
                },
            }
        };

        Shape {
            name: "shape-border".to_string(),
            geometry,
            fill: None,
            stroke: Some(stroke),
            line_width,
            line_dash: None,
        }
    }

    /// Sector fills for 1-4+ diagnoses: whole, right half, lower wedge or
    /// lower-left quarter, lower-right quarter. Shapes follow the container
    /// outline per glyph (square, circle, rhombus).
    fn cancer_sectors(self, node: &GraphNode, theme: &Theme, chart: &ChartConfig) -> Vec<Shape> {
        let size = chart.node_size;
        let c = coords(size);
        let count = node.cancer_history.len();
        let stroke = stroke_for(count, theme, chart);
        let mut shapes = Vec::new();

        for (index, diagnosis) in node.cancer_history.iter().enumerate() {
            let Some(color) = diagnosis.color.as_deref() else {
                continue;
            };
            let name = format!("cancer-shape-{}", index + 1);
            let geometry = match (self, index) {
                (NodeGlyph::Unknown, 0) => Some(Geometry::Polygon(vec![
                    (c.start, c.middle),
                    (c.middle, c.start),
                    (c.end, c.middle),
                    (c.middle, c.end),
                ])),
                (NodeGlyph::Unknown, 1) => Some(Geometry::Polygon(vec![
                    (c.middle, c.middle),
                    (c.middle, c.start),
                    (c.end, c.middle),
                    (c.middle, c.end),
                ])),
                (NodeGlyph::Unknown, 2) if count == 3 => Some(Geometry::Polygon(vec![
                    (c.start / 2.0, c.end / 2.0),
                    (c.middle, c.middle),
                    (c.end / 2.0, c.end / 2.0),
                    (c.middle, c.end),
                ])),
                (NodeGlyph::Unknown, 2) => Some(Geometry::Polygon(vec![
                    (c.start, c.middle),
                    (c.middle, c.middle),
                    (c.middle, c.end),
                ])),
                (NodeGlyph::Unknown, 3) => Some(Geometry::Polygon(vec![
                    (c.end, c.middle),
                    (c.middle, c.middle),
                    (c.middle, c.end),
                ])),
                (NodeGlyph::Female, 0) => Some(rect_sector(c.start, c.start, size, size, [size / 2.0; 4])),
                (NodeGlyph::Female, 1) => Some(rect_sector(
                    c.middle,
                    c.start,
                    size / 2.0,
                    size,
                    [0.0, size / 2.0, size / 2.0, 0.0],
                )),
                (NodeGlyph::Female, 2) if count == 3 => {
                    // Bottom wedge of the circle, hinged at the center.
                    let rx = size * 0.432;
                    Some(Geometry::Path(vec![
                        PathCmd::MoveTo(rx, size / 4.0),
                        PathCmd::Arc {
                            rx: size / 2.0,
                            ry: size / 2.0,
                            sweep: true,
                            x: -rx,
                            y: size * 0.242,
                        },
                        PathCmd::LineTo(0.0, 0.0),
                        PathCmd::Close,
                    ]))
                }
                (NodeGlyph::Female, 2) => Some(rect_sector(
                    c.start,
                    c.middle,
                    size / 2.0,
                    size / 2.0,
                    [0.0, 0.0, 0.0, size / 2.0],
                )),
                (NodeGlyph::Female, 3) => Some(rect_sector(
                    c.middle,
                    c.middle,
                    size / 2.0,
                    size / 2.0,
                    [0.0, 0.0, size / 2.0, 0.0],
                )),
                (NodeGlyph::Male, 0) => Some(rect_sector(c.start, c.start, size, size, [0.0; 4])),
                (NodeGlyph::Male, 1) => {
                    Some(rect_sector(c.middle, c.start, size / 2.0, size, [0.0; 4]))
                }
                (NodeGlyph::Male, 2) if count == 3 => Some(Geometry::Polygon(vec![
                    (c.start, c.end),
                    (c.middle, c.middle),
                    (c.end, c.end),
                ])),
                (NodeGlyph::Male, 2) => Some(rect_sector(
                    c.start,
                    c.middle,
                    size / 2.0,
                    size / 2.0,
                    [0.0; 4],
                )),
                (NodeGlyph::Male, 3) => Some(rect_sector(
                    c.middle,
                    c.middle,
                    size / 2.0,
                    size / 2.0,
                    [0.0; 4],
                )),
                _ => None,
            };
            if let Some(geometry) = geometry {
                shapes.push(Shape {
                    name,
                    geometry,
                    fill: Some(color.to_string()),
                    stroke: Some(stroke.clone()),
                    line_width: chart.line_width,
                    line_dash: None,
                });
            }
        }

        shapes
    }
}

fn rect_sector(x: f32, y: f32, width: f32, height: f32, radius: [f32; 4]) -> Geometry {
    Geometry::Rect {
        x,
        y,
        width,
        height,
        radius,
    }
}

fn triangle_path(c: Coords) -> Vec<PathCmd> {
    vec![
        PathCmd::MoveTo(c.start, c.end / 2.0),
        PathCmd::LineTo(c.end, c.end / 2.0),
        PathCmd::LineTo(c.middle, c.start / 2.0),
        PathCmd::Close,
    ]
}

fn rhombus_path(c: Coords) -> Vec<PathCmd> {
    vec![
        PathCmd::MoveTo(c.start, c.middle),
        PathCmd::LineTo(c.middle, c.start),
        PathCmd::LineTo(c.end, c.middle),
        PathCmd::LineTo(c.middle, c.end),
        PathCmd::Close,
    ]
}

/// Strokes darken to full once the diagnosis list overflows the visible cap.
fn stroke_for(cancer_count: usize, theme: &Theme, chart: &ChartConfig) -> String {
    if cancer_count > chart.max_visible_cancers {
        theme.stroke_full.clone()
    } else {
        theme.stroke_common.clone()
    }
}

fn strike(c: Coords, theme: &Theme, chart: &ChartConfig) -> Shape {
    Shape::path(
        shape_names(EdgeKind::Deceased).shape_name.as_str(),
        vec![
            PathCmd::MoveTo(c.start + 1.0, c.end - 1.0),
            PathCmd::LineTo(c.end, c.start),
        ],
    )
    .stroked(&theme.stroke_common, chart.line_width)
}

fn adoption_brackets(c: Coords, theme: &Theme, chart: &ChartConfig) -> Shape {
    Shape::path(
        "shape-adoption-brackets",
        vec![
            PathCmd::MoveTo(c.start + 20.0, c.start - 10.0),
            PathCmd::LineTo(c.start - 10.0, c.start - 10.0),
            PathCmd::LineTo(c.start - 10.0, c.end + 10.0),
            PathCmd::LineTo(c.start + 20.0, c.end + 10.0),
            PathCmd::MoveTo(c.end - 20.0, c.start - 10.0),
            PathCmd::LineTo(c.end + 10.0, c.start - 10.0),
            PathCmd::LineTo(c.end + 10.0, c.end + 10.0),
            PathCmd::LineTo(c.end - 20.0, c.end + 10.0),
        ],
    )
    .stroked(&theme.stroke_common, chart.line_width)
}

fn proband_marker(glyph: NodeGlyph, child_loss: bool, theme: &Theme, chart: &ChartConfig) -> Shape {
    let c = coords(chart.node_size);
    let r = chart.marker_size;
    let unknown = glyph == NodeGlyph::Unknown;
    let x = c.start / if !child_loss && unknown { 2.0 } else { 1.0 } - chart.line_width / 2.0;
    let y = c.end / if child_loss || unknown { 2.0 } else { 1.0 } + chart.line_width / 2.0 - 1.0;
    Shape::path(
        "proband-marker",
        vec![
            PathCmd::MoveTo(x, y),
            PathCmd::LineTo(x, y + r),
            PathCmd::LineTo(x - r, y),
            PathCmd::Close,
        ],
    )
    .filled(&theme.fill_active)
}

fn union_marker(theme: &Theme, chart: &ChartConfig) -> Shape {
    let half = chart.union_marker_size / 2.0;
    Shape {
        name: "settings".to_string(),
        geometry: Geometry::Rect {
            x: -half,
            y: -half,
            width: chart.union_marker_size,
            height: chart.union_marker_size,
            radius: [half; 4],
        },
        fill: Some(theme.fill_common.clone()),
        stroke: Some(theme.stroke_common.clone()),
        line_width: chart.line_width,
        line_dash: None,
    }
}

fn infertile_reason(reason: &str, c: Coords, theme: &Theme, chart: &ChartConfig) -> Shape {
    Shape {
        name: "label-infertile-reason".to_string(),
        geometry: Geometry::Text {
            x: c.middle,
            y: c.middle + chart.infertile_height + 10.0,
            text: reason.to_string(),
            font_size: chart.font_size,
            font_weight: 400,
        },
        fill: Some(theme.text_color.clone()),
        stroke: Some("white".to_string()),
        line_width: 1.0,
        line_dash: None,
    }
}

/// Double-bar infertility drop glyph, with a white mask keeping the bars
/// readable over whatever they cross.
pub fn draw_infertile(
    (x, y): (f32, f32),
    divorced: bool,
    changed: bool,
    theme: &Theme,
    chart: &ChartConfig,
) -> Vec<Shape> {
    let width = chart.infertile_width;
    let height = chart.infertile_height;
    let names = shape_names(EdgeKind::Infertile);
    let mask = Shape::path(
        &names.shape_name_additional,
        vec![
            PathCmd::MoveTo(x - width, y + height - chart.line_width),
            PathCmd::LineTo(x + width, y + height - chart.line_width),
        ],
    )
    .stroked("white", chart.line_width * 1.5);
    // The divorced slashes poke a couple of pixels past the join; nudge the
    // drop start below them.
    let top = y + if divorced { 2.0 } else { 0.0 };
    let stroke = if changed {
        &theme.stroke_active
    } else {
        &theme.stroke_common
    };
    let glyph = Shape::path(
        &names.shape_name,
        vec![
            PathCmd::MoveTo(x, top),
            PathCmd::LineTo(x, y + height - chart.line_width * 2.0),
            PathCmd::MoveTo(x - width, y + height - chart.line_width * 2.0),
            PathCmd::LineTo(x + width, y + height - chart.line_width * 2.0),
            PathCmd::MoveTo(x - width, y + height),
            PathCmd::LineTo(x + width, y + height),
        ],
    )
    .stroked(stroke, chart.edge_line_width);
    vec![mask, glyph]
}

/// Single-bar variant for infertility by choice.
pub fn draw_infertile_by_choice(
    (x, y): (f32, f32),
    divorced: bool,
    changed: bool,
    theme: &Theme,
    chart: &ChartConfig,
) -> Shape {
    let width = chart.infertile_width;
    let height = chart.infertile_height;
    let top = y + if divorced { 2.0 } else { 0.0 };
    let stroke = if changed {
        &theme.stroke_active
    } else {
        &theme.stroke_common
    };
    Shape::path(
        &shape_names(EdgeKind::InfertileByChoice).shape_name,
        vec![
            PathCmd::MoveTo(x, top),
            PathCmd::LineTo(x, y + height),
            PathCmd::MoveTo(x - width, y + height),
            PathCmd::LineTo(x + width, y + height),
        ],
    )
    .stroked(stroke, chart.edge_line_width)
}

/// Couple edge between a spouse and the union marker: the primary line style
/// plus whatever decorations are active.
pub fn couple_edge_shapes(
    kind: EdgeKind,
    start: (f32, f32),
    end: (f32, f32),
    decorations: EdgeDecorations,
    highlighted: bool,
    changed: bool,
    theme: &Theme,
    chart: &ChartConfig,
) -> Vec<Shape> {
    let mut shapes = Vec::new();
    let stroke = if highlighted {
        theme.stroke_active.clone()
    } else {
        theme.stroke_common.clone()
    };
    let width = chart.infertile_width;

    // Consanguineous couples ride on a twin line; the base line drops by one
    // line width to make room.
    let base_offset = if decorations.consanguineous {
        chart.line_width
    } else {
        0.0
    };
    let base_kind = if kind == EdgeKind::Casual {
        EdgeKind::Casual
    } else {
        EdgeKind::Normal
    };
    let mut base = Shape::path(
        &shape_names(base_kind).shape_name,
        vec![
            PathCmd::MoveTo(start.0, start.1 + base_offset),
            PathCmd::LineTo(end.0, end.1 + base_offset),
        ],
    )
    .stroked(&stroke, chart.edge_line_width);
    if base_kind == EdgeKind::Casual {
        base = base.dashed(vec![chart.edge_line_width * 6.0]);
    }
    shapes.push(base);

    match kind {
        EdgeKind::Separated => {
            shapes.push(
                Shape::path(
                    &shape_names(EdgeKind::Separated).shape_name,
                    vec![
                        PathCmd::MoveTo(end.0 + width, start.1 - width),
                        PathCmd::LineTo(end.0 - width, start.1 + width),
                    ],
                )
                .stroked(&stroke, chart.edge_line_width),
            );
        }
        EdgeKind::Divorced => {
            let names = shape_names(EdgeKind::Divorced);
            shapes.push(
                Shape::path(
                    &names.shape_name_additional,
                    vec![
                        PathCmd::MoveTo(end.0 + width, start.1 - width),
                        PathCmd::LineTo(end.0 - width, start.1 + width),
                    ],
                )
                .stroked("white", chart.edge_line_width * 4.0),
            );
            shapes.push(
                Shape::path(
                    &names.shape_name,
                    vec![
                        PathCmd::MoveTo(end.0 + (width + 3.0), start.1 - width),
                        PathCmd::LineTo(end.0 - (width - 3.0), start.1 + width),
                        PathCmd::MoveTo(end.0 + (width - 3.0), start.1 - width),
                        PathCmd::LineTo(end.0 - (width + 3.0), start.1 + width),
                    ],
                )
                .stroked(&stroke, chart.edge_line_width),
            );
        }
        _ => {}
    }

    let deco_stroke = if changed {
        &theme.stroke_active
    } else {
        &theme.stroke_common
    };
    if decorations.consanguineous {
        shapes.push(
            Shape::path(
                &shape_names(EdgeKind::Consanguineous).shape_name,
                vec![
                    PathCmd::MoveTo(end.0, end.1 - chart.line_width),
                    PathCmd::LineTo(start.0, start.1 - chart.line_width),
                ],
            )
            .stroked(deco_stroke, chart.edge_line_width),
        );
    }
    let divorced = kind == EdgeKind::Divorced;
    if decorations.infertile {
        shapes.extend(draw_infertile(
            (end.0, start.1 + 1.0),
            divorced,
            changed,
            theme,
            chart,
        ));
    }
    if decorations.infertile_by_choice {
        shapes.push(draw_infertile_by_choice(
            (end.0, start.1 + 1.0),
            divorced,
            changed,
            theme,
            chart,
        ));
    }

    shapes
}

/// Parent-child descent edge: drop from the union, run across, drop to the
/// child. Adopted-out children render dashed.
pub fn polyline_edge_shapes(
    start: (f32, f32),
    end: (f32, f32),
    adopted_out: bool,
    theme: &Theme,
    chart: &ChartConfig,
) -> Shape {
    let step = chart.polyline_step;
    let mut shape = Shape::path(
        &shape_names(EdgeKind::Polyline).shape_name,
        vec![
            PathCmd::MoveTo(start.0, start.1),
            PathCmd::LineTo(start.0, start.1 + step),
            PathCmd::LineTo(end.0, start.1 + step),
            PathCmd::LineTo(end.0, end.1),
        ],
    )
    .stroked(&theme.stroke_common, chart.edge_line_width);
    if adopted_out {
        shape = shape.dashed(vec![chart.edge_line_width * 6.0]);
    }
    shape
}

/// Individual anchor points clockwise from the top; unions expose only their
/// center.
pub fn anchor_point(center: (f32, f32), size: f32, is_union: bool, anchor: u8) -> (f32, f32) {
    if is_union {
        return center;
    }
    let half = size / 2.0;
    match anchor {
        0 => (center.0, center.1 - half),
        1 => (center.0 + half, center.1),
        2 => (center.0, center.1 + half),
        3 => (center.0 - half, center.1),
        _ => center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CancerDiagnosis, GraphNode, IndividualAttributes};

    fn chart() -> ChartConfig {
        ChartConfig::default()
    }

    fn diagnosed(node: &mut GraphNode, count: usize) {
        node.cancer_history = (0..count)
            .map(|index| CancerDiagnosis {
                cancer_id: index as i64,
                age: None,
                name: Some(format!("c{index}")),
                color: Some("#112233".to_string()),
            })
            .collect();
    }

    #[test]
    fn proband_gets_marker_and_border() {
        let node = {
            let mut node = GraphNode::individual("proband", Sex::Male, 3);
            node.label = Some("Proband".to_string());
            node
        };
        let shapes =
            NodeGlyph::for_node(&node).display_list(&node, false, &Theme::clinical(), &chart());
        assert!(shapes.iter().any(|shape| shape.name == "proband-marker"));
        assert!(shapes.iter().any(|shape| shape.name == "shape-border"));
        assert!(shapes.iter().any(|shape| shape.name == "shape-container"));
    }

    #[test]
    fn four_diagnoses_fill_quadrants_five_darken_stroke() {
        let theme = Theme::clinical();
        let mut node = GraphNode::individual("n", Sex::Male, 2);
        diagnosed(&mut node, 4);
        let shapes = NodeGlyph::Male.display_list(&node, false, &theme, &chart());
        let sectors: Vec<_> = shapes
            .iter()
            .filter(|shape| shape.name.starts_with("cancer-shape-"))
            .collect();
        assert_eq!(sectors.len(), 4);
        let border = shapes
            .iter()
            .find(|shape| shape.name == "shape-border")
            .unwrap();
        assert_eq!(border.stroke.as_deref(), Some(theme.stroke_common.as_str()));

        diagnosed(&mut node, 5);
        let shapes = NodeGlyph::Male.display_list(&node, false, &theme, &chart());
        let border = shapes
            .iter()
            .find(|shape| shape.name == "shape-border")
            .unwrap();
        assert_eq!(border.stroke.as_deref(), Some(theme.stroke_full.as_str()));
    }

    #[test]
    fn child_loss_attributes_pick_triangle() {
        let mut node = GraphNode::individual("n", Sex::Female, 4);
        let mut attrs = IndividualAttributes::default();
        attrs.ectopic_pregnancy.is_ect = true;
        node.attributes = Some(attrs);
        diagnosed(&mut node, 2);
        let shapes = NodeGlyph::Female.display_list(&node, false, &Theme::clinical(), &chart());
        let container = shapes
            .iter()
            .find(|shape| shape.name == "shape-container")
            .unwrap();
        assert!(matches!(container.geometry, Geometry::Path(_)));
        // Triangle glyphs never show sector fills.
        assert!(!shapes
            .iter()
            .any(|shape| shape.name.starts_with("cancer-shape-")));
    }

    #[test]
    fn divorced_couple_edge_carries_mask_and_double_slash() {
        let shapes = couple_edge_shapes(
            EdgeKind::Divorced,
            (300.0, 320.0),
            (500.0, 320.0),
            EdgeDecorations::default(),
            false,
            false,
            &Theme::clinical(),
            &chart(),
        );
        assert!(shapes
            .iter()
            .any(|shape| shape.name == "edge-shape-line-divorced-additional"
                && shape.stroke.as_deref() == Some("white")));
        assert!(shapes
            .iter()
            .any(|shape| shape.name == "edge-shape-line-divorced"));
    }

    #[test]
    fn infertile_decoration_attaches_at_union_end() {
        let shapes = couple_edge_shapes(
            EdgeKind::Normal,
            (300.0, 320.0),
            (500.0, 320.0),
            EdgeDecorations {
                consanguineous: false,
                infertile: true,
                infertile_by_choice: false,
            },
            false,
            true,
            &Theme::clinical(),
            &chart(),
        );
        let theme = Theme::clinical();
        let glyph = shapes
            .iter()
            .find(|shape| shape.name == "edge-shape-line-infertile")
            .unwrap();
        assert_eq!(glyph.stroke.as_deref(), Some(theme.stroke_active.as_str()));
        match &glyph.geometry {
            Geometry::Path(cmds) => match cmds[0] {
                PathCmd::MoveTo(x, y) => {
                    assert_eq!(x, 500.0);
                    assert_eq!(y, 321.0);
                }
                _ => panic!("expected MoveTo"),
            },
            _ => panic!("expected path"),
        }
    }

    #[test]
    fn anchors_clamp_to_node_sides() {
        let center = (400.0, 300.0);
        assert_eq!(anchor_point(center, 80.0, false, 1), (440.0, 300.0));
        assert_eq!(anchor_point(center, 80.0, false, 3), (360.0, 300.0));
        assert_eq!(anchor_point(center, 80.0, true, 1), center);
    }
}
