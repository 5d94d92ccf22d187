//! SVG flame graph generation for aggregated event paths.
//!
//! Self-contained generator, no external renderer:
//! - One frame per path node, width proportional to accumulated duration
//! - Inverted layout (root at the bottom)
//! - Labels elided when frames are too narrow to read

use crate::aggregator::event::EventRecord;
use crate::clock::TimeUnit;
use crate::utils::config::PATH_SEPARATOR;
use crate::utils::error::FlamegraphError;
use log::info;
use std::collections::HashMap;

/// Height of one frame row in pixels
const FRAME_HEIGHT: usize = 20;

/// Narrowest graph that still fits a title
const MIN_WIDTH: usize = 100;

/// Frame fill colors, cycled by nesting depth
const PALETTE: [&str; 6] = [
    "rgb(205, 92, 92)",
    "rgb(222, 143, 78)",
    "rgb(205, 170, 83)",
    "rgb(131, 165, 90)",
    "rgb(88, 142, 166)",
    "rgb(138, 113, 166)",
];

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Stopwatch Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Internal node structure for building the path tree
struct Node {
    name: String,
    /// Duration recorded at exactly this path
    own: u64,
    children: HashMap<String, Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            own: 0,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, path: &[&str], raw: u64) {
        if let Some((head, tail)) = path.split_first() {
            let child = self
                .children
                .entry((*head).to_string())
                .or_insert_with(|| Node::new((*head).to_string()));
            if tail.is_empty() {
                child.own += raw;
            } else {
                child.insert(tail, raw);
            }
        }
    }

    /// Duration shown in this node's tooltip.
    ///
    /// A parent's own duration already spans its children's wall time, but
    /// a path can complete while its ancestor is still open, leaving the
    /// ancestor node without a recorded duration of its own. Taking the
    /// larger of the two keeps child frames inside their parent.
    fn value(&self) -> u64 {
        let children: u64 = self.children.values().map(Node::value).sum();
        self.own.max(children)
    }

    /// Width-determining weight. Paths whose duration rounds to zero on
    /// the coarse clock keep a minimal frame instead of vanishing.
    fn weight(&self) -> u64 {
        let children: u64 = self.children.values().map(Node::weight).sum();
        self.own.max(children).max(1)
    }
}

/// Generate an SVG flame graph from completed records
///
/// **Public** - main entry point for flamegraph generation
///
/// # Arguments
/// * `records` - completed records, any order
/// * `resolution` - unit used in frame tooltips
/// * `config` - title and width; defaults used when `None`
///
/// # Errors
/// * `FlamegraphError::EmptyRegistry` - nothing has completed yet
/// * `FlamegraphError::WidthTooSmall` - configured width below the minimum
pub fn generate_flamegraph(
    records: &[&EventRecord],
    resolution: TimeUnit,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if records.is_empty() {
        return Err(FlamegraphError::EmptyRegistry);
    }

    let config = config.cloned().unwrap_or_default();
    if config.width < MIN_WIDTH {
        return Err(FlamegraphError::WidthTooSmall(config.width));
    }

    info!("Generating flamegraph from {} paths", records.len());

    let native = records[0].native_unit();

    // Build the tree from dotted paths
    let mut root = Node::new("all".to_string());
    for record in records {
        let path = record.path();
        let parts: Vec<&str> = path
            .split(PATH_SEPARATOR)
            .filter(|part| !part.is_empty())
            .collect();
        root.insert(&parts, record.raw_duration());
    }

    let max_depth = calculate_max_depth(&root);
    let width = config.width;
    let graph_height = (max_depth + 1) * FRAME_HEIGHT;
    let total_height = graph_height + 40;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));
    svg.push_str(
        r#"<style>.frame { font: 12px sans-serif; } .frame:hover { stroke: black; stroke-width: 1; cursor: pointer; }</style>"#,
    );
    svg.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    render_node(
        &root,
        native,
        resolution,
        0,
        0.0,
        width as f64,
        graph_height,
        &mut svg,
    );

    svg.push_str("</svg>");

    info!("Flamegraph generated ({} bytes)", svg.len());
    Ok(svg)
}

fn calculate_max_depth(node: &Node) -> usize {
    node.children
        .values()
        .map(|child| calculate_max_depth(child) + 1)
        .max()
        .unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    node: &Node,
    native: TimeUnit,
    resolution: TimeUnit,
    level: usize,
    x: f64,
    w: f64,
    graph_height: usize,
    out: &mut String,
) {
    // Skip frames too narrow to see
    if w < 0.5 {
        return;
    }

    let weight = node.weight();
    let color = PALETTE[level % PALETTE.len()];

    // Inverted layout: root at the bottom, margin for the title
    let y = graph_height - ((level + 1) * FRAME_HEIGHT) + 30;

    let shown = native.convert(node.value(), resolution);
    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="frame"><title>{} ({}{})</title></rect>"#,
        x,
        y,
        w,
        FRAME_HEIGHT,
        color,
        escape_xml(&node.name),
        shown,
        resolution.suffix()
    ));

    // Label only when the frame is wide enough
    if w > 35.0 {
        let char_width = 7.0;
        let max_chars = (w / char_width) as usize;
        let display_name = if node.name.len() > max_chars && max_chars > 3 {
            format!("{}...", &node.name[..max_chars - 3])
        } else {
            node.name.clone()
        };

        out.push_str(&format!(
            r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
            x,
            y,
            escape_xml(&display_name)
        ));
    }

    let mut current_x = x;
    let mut children: Vec<&Node> = node.children.values().collect();
    children.sort_by(|a, b| b.weight().cmp(&a.weight()));

    for child in children {
        let child_w = (child.weight() as f64 / weight as f64) * w;
        render_node(
            child,
            native,
            resolution,
            level + 1,
            current_x,
            child_w,
            graph_height,
            out,
        );
        current_x += child_w;
    }
}

/// Minimal XML escaping for user-supplied event names
fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
