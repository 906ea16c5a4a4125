use crate::config::Config;
use crate::edges::EdgeKind;
use crate::model::{GraphNode, NodeKind, PedigreeGraph};
use crate::shapes::{
    anchor_point, couple_edge_shapes, polyline_edge_shapes, Geometry, NodeGlyph, PathCmd, Shape,
};
use crate::text_metrics::fit_label;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Diagnosis lines under each glyph label.
    pub subtext: bool,
    /// Cancer color legend in the top-left corner.
    pub legend: bool,
    /// Marks the chart as editable; union markers get the pointer class.
    pub edit_mode: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            subtext: true,
            legend: true,
            edit_mode: false,
        }
    }
}

pub fn render_svg(graph: &PedigreeGraph, config: &Config, options: &RenderOptions) -> String {
    let theme = &config.theme;
    let chart = &config.chart;
    let mut svg = String::new();

    let (min_x, min_y, max_x, max_y) = chart_bounds(graph, config);
    let width = (max_x - min_x).max(config.render.width);
    let height = (max_y - min_y).max(config.render.height);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"{min_x:.2} {min_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{min_x:.2}\" y=\"{min_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.render.background
    ));

    let root_class = if options.edit_mode {
        "pedigree pedigree-edit"
    } else {
        "pedigree"
    };
    svg.push_str(&format!("<g class=\"{root_class}\">"));

    // Edges sit under the glyphs.
    for edge in &graph.edges {
        let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
        else {
            continue;
        };
        let shapes = edge_shapes(edge, source, target, graph, theme, chart);
        for shape in &shapes {
            svg.push_str(&shape_svg(shape, theme, 0.0, 0.0));
        }
    }

    for node in graph.nodes.values() {
        let x = node.x.unwrap_or(0.0);
        let y = node.y.unwrap_or(0.0);
        let glyph = NodeGlyph::for_node(node);
        svg.push_str(&format!(
            "<g class=\"{}\" transform=\"translate({x:.2} {y:.2})\">",
            escape_xml(node_class(node))
        ));
        for shape in glyph.display_list(node, false, theme, chart) {
            svg.push_str(&shape_svg(&shape, theme, 0.0, 0.0));
        }
        if node.kind() == NodeKind::Individual {
            svg.push_str(&node_labels(node, config, options));
        }
        svg.push_str("</g>");
    }

    if options.legend {
        svg.push_str(&legend_svg(graph, config, min_x, min_y));
    }

    svg.push_str("</g></svg>");
    svg
}

fn node_class(node: &GraphNode) -> &'static str {
    match node.kind() {
        NodeKind::Union => "settings",
        NodeKind::Individual => match node.node_type {
            crate::model::NodeType::Male => "pie-node-male",
            crate::model::NodeType::Female => "pie-node-female",
            _ => "pie-node-unknown",
        },
    }
}

fn edge_shapes(
    edge: &crate::model::EdgeRecord,
    source: &GraphNode,
    target: &GraphNode,
    graph: &PedigreeGraph,
    theme: &Theme,
    chart: &crate::config::ChartConfig,
) -> Vec<Shape> {
    let source_center = (source.x.unwrap_or(0.0), source.y.unwrap_or(0.0));
    let target_center = (target.x.unwrap_or(0.0), target.y.unwrap_or(0.0));
    let start = anchor_point(
        source_center,
        chart.node_size,
        source.kind() == NodeKind::Union,
        edge.source_anchor.unwrap_or(1),
    );
    let end = anchor_point(
        target_center,
        chart.node_size,
        target.kind() == NodeKind::Union,
        edge.target_anchor.unwrap_or(3),
    );

    if edge.kind == EdgeKind::Polyline {
        let adopted_out = graph
            .node(&edge.target)
            .and_then(|child| child.attributes.as_ref())
            .is_some_and(|attrs| attrs.adopted_out.is_adopted_out);
        return vec![polyline_edge_shapes(start, end, adopted_out, theme, chart)];
    }

    couple_edge_shapes(
        edge.kind,
        start,
        end,
        edge.decorations,
        edge.active,
        edge.changed,
        theme,
        chart,
    )
}

fn node_labels(node: &GraphNode, config: &Config, options: &RenderOptions) -> String {
    let theme = &config.theme;
    let chart = &config.chart;
    let half = chart.node_size / 2.0;
    let max_width = chart.node_size + chart.node_padding * 4.0;
    let mut svg = String::new();

    let title = fit_label(
        &node.title(),
        max_width,
        chart.title_font_size,
        &theme.font_family,
    );
    let mut line_y = half + chart.node_padding + chart.title_font_size;
    svg.push_str(&format!(
        "<text class=\"node-title\" x=\"0\" y=\"{line_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">{}</text>",
        theme.font_family,
        chart.title_font_size,
        chart.font_weight,
        theme.text_color,
        escape_xml(&title)
    ));

    if !options.subtext {
        return svg;
    }
    let visible = node.cancer_history.iter().take(chart.max_visible_cancers);
    for diagnosis in visible {
        let Some(name) = diagnosis.name.as_deref() else {
            continue;
        };
        let line = match diagnosis.age {
            Some(age) => format!("{name}, {age}"),
            None => name.to_string(),
        };
        let fitted = fit_label(&line, max_width, chart.font_size, &theme.font_family);
        line_y += chart.font_size + 2.0;
        svg.push_str(&format!(
            "<text class=\"node-subtext\" x=\"0\" y=\"{line_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.font_family,
            chart.font_size,
            theme.text_color,
            escape_xml(&fitted)
        ));
    }
    let hidden = node
        .cancer_history
        .len()
        .saturating_sub(chart.max_visible_cancers);
    if hidden > 0 {
        line_y += chart.font_size + 2.0;
        svg.push_str(&format!(
            "<text class=\"node-subtext\" x=\"0\" y=\"{line_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">+{hidden} more</text>",
            theme.font_family, chart.font_size, theme.text_color
        ));
    }
    svg
}

fn legend_svg(graph: &PedigreeGraph, config: &Config, min_x: f32, min_y: f32) -> String {
    let theme = &config.theme;
    let chart = &config.chart;
    let ids = graph.cancer_ids();
    if ids.is_empty() {
        return String::new();
    }
    let mut svg = String::from("<g class=\"legend\">");
    let mut y = min_y + config.render.padding + chart.title_font_size;
    let x = min_x + config.render.padding;
    for id in ids {
        let Some(diagnosis) = graph
            .nodes
            .values()
            .flat_map(|node| node.cancer_history.iter())
            .find(|diagnosis| diagnosis.cancer_id == id)
        else {
            continue;
        };
        let color = diagnosis.color.as_deref().unwrap_or("#000000");
        let name = diagnosis.name.as_deref().unwrap_or("Unknown");
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"10\" height=\"10\" fill=\"{color}\"/>",
            y - 9.0
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            x + 16.0,
            theme.font_family,
            chart.title_font_size,
            theme.text_color,
            escape_xml(name)
        ));
        y += chart.title_font_size + 6.0;
    }
    svg.push_str("</g>");
    svg
}

fn chart_bounds(graph: &PedigreeGraph, config: &Config) -> (f32, f32, f32, f32) {
    let pad = config.render.padding + config.chart.node_size;
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in graph.nodes.values() {
        let x = node.x.unwrap_or(0.0);
        let y = node.y.unwrap_or(0.0);
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if min_x > max_x {
        return (0.0, 0.0, config.render.width, config.render.height);
    }
    (min_x - pad, min_y - pad, max_x + pad, max_y + pad)
}

fn shape_svg(shape: &Shape, theme: &Theme, dx: f32, dy: f32) -> String {
    let fill = shape.fill.as_deref().unwrap_or("none");
    let stroke = shape.stroke.as_deref().unwrap_or("none");
    let dash = shape
        .line_dash
        .as_ref()
        .map(|dash| {
            let values: Vec<String> = dash.iter().map(|v| format!("{v:.1}")).collect();
            format!(" stroke-dasharray=\"{}\"", values.join(" "))
        })
        .unwrap_or_default();
    let class = escape_xml(&shape.name);

    match &shape.geometry {
        Geometry::Path(cmds) => format!(
            "<path class=\"{class}\" d=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"{dash}/>",
            path_data(cmds, dx, dy),
            shape.line_width
        ),
        Geometry::Rect {
            x,
            y,
            width,
            height,
            radius,
        } => {
            if radius.iter().all(|r| *r == radius[0]) {
                format!(
                    "<rect class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"{dash}/>",
                    x + dx,
                    y + dy,
                    radius[0],
                    shape.line_width
                )
            } else {
                format!(
                    "<path class=\"{class}\" d=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"{dash}/>",
                    rounded_rect_path(x + dx, y + dy, *width, *height, radius),
                    shape.line_width
                )
            }
        }
        Geometry::Polygon(points) => {
            let list: Vec<String> = points
                .iter()
                .map(|(px, py)| format!("{:.2},{:.2}", px + dx, py + dy))
                .collect();
            format!(
                "<polygon class=\"{class}\" points=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"{dash}/>",
                list.join(" "),
                shape.line_width
            )
        }
        Geometry::Text {
            x,
            y,
            text,
            font_size,
            font_weight,
        } => format!(
            "<text class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{font_size}\" font-weight=\"{font_weight}\" fill=\"{fill}\">{}</text>",
            x + dx,
            y + dy,
            theme.font_family,
            escape_xml(text)
        ),
    }
}

fn path_data(cmds: &[PathCmd], dx: f32, dy: f32) -> String {
    let mut d = String::new();
    for cmd in cmds {
        if !d.is_empty() {
            d.push(' ');
        }
        match cmd {
            PathCmd::MoveTo(x, y) => d.push_str(&format!("M {:.2} {:.2}", x + dx, y + dy)),
            PathCmd::LineTo(x, y) => d.push_str(&format!("L {:.2} {:.2}", x + dx, y + dy)),
            PathCmd::Arc {
                rx,
                ry,
                sweep,
                x,
                y,
            } => d.push_str(&format!(
                "A {rx:.2} {ry:.2} 0 0 {} {:.2} {:.2}",
                u8::from(*sweep),
                x + dx,
                y + dy
            )),
            PathCmd::Close => d.push('Z'),
        }
    }
    d
}

fn rounded_rect_path(x: f32, y: f32, width: f32, height: f32, radius: &[f32; 4]) -> String {
    let [tl, tr, br, bl] = *radius;
    format!(
        "M {:.2} {y:.2} L {:.2} {y:.2} A {tr:.2} {tr:.2} 0 0 1 {:.2} {:.2} L {:.2} {:.2} A {br:.2} {br:.2} 0 0 1 {:.2} {:.2} L {:.2} {:.2} A {bl:.2} {bl:.2} 0 0 1 {x:.2} {:.2} L {x:.2} {:.2} A {tl:.2} {tl:.2} 0 0 1 {:.2} {y:.2} Z",
        x + tl,
        x + width - tr,
        x + width,
        y + tr,
        x + width,
        y + height - br,
        x + width - br,
        y + height,
        x + bl,
        y + height,
        y + height - bl,
        y + tl,
        x + tl
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = config.theme.font_family.clone();
    opt.default_size = usvg::Size::from_wh(config.render.width, config.render.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
