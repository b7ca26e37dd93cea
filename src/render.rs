//! Graphviz rendering.
//!
//! The graph is translated into a `dot_structures` graph and either written as
//! DOT source or handed to the Graphviz `dot` executable, which does the
//! layout and image encoding.

use std::fs;
use std::path::PathBuf;

use graphviz_rust::cmd::{CommandArg, Format};
use graphviz_rust::dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph as DotGraph, GraphAttributes, Id, Node as DotNode,
    NodeId as DotNodeId, Stmt, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{EdgeKind, Graph, Node};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphviz failed to render '{}' (is the `dot` executable installed?): {source}", path.display())]
    Graphviz {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    /// DOT source; does not need Graphviz installed.
    Dot,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Dot => "dot",
        }
    }
}

/// Diagram-wide presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub title: String,
    pub background: String,
    pub direction: String,
    pub title_font_size: u32,
    pub node_font_size: u32,
    pub edge_color: String,
    pub edge_pen_width: u32,
}

impl RenderStyle {
    pub fn new(title: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            background: background.into(),
            direction: "TB".to_string(),
            title_font_size: 45,
            node_font_size: 14,
            edge_color: "#00A86B".to_string(),
            edge_pen_width: 2,
        }
    }
}

pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Renders `graph` to `<output>.<ext>` and returns the written path.
    pub fn render(
        &self,
        graph: &Graph,
        output: &str,
        format: OutputFormat,
    ) -> Result<PathBuf, RenderError> {
        let path = PathBuf::from(format!("{output}.{}", format.extension()));

        match format {
            OutputFormat::Dot => {
                fs::write(&path, self.to_dot(graph)).map_err(|source| RenderError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            OutputFormat::Png | OutputFormat::Svg => {
                let dot_format = match format {
                    OutputFormat::Svg => Format::Svg,
                    _ => Format::Png,
                };
                graphviz_rust::exec(
                    self.to_dot_graph(graph),
                    &mut PrinterContext::default(),
                    vec![
                        dot_format.into(),
                        CommandArg::Output(path.display().to_string()),
                    ],
                )
                .map_err(|source| RenderError::Graphviz {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        tracing::info!(path = %path.display(), "diagram rendered");
        Ok(path)
    }

    pub fn to_dot(&self, graph: &Graph) -> String {
        self.to_dot_graph(graph).print(&mut PrinterContext::default())
    }

    pub fn to_dot_graph(&self, graph: &Graph) -> DotGraph {
        let style = &self.style;
        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(vec![
                attr("label", &style.title),
                attr("labelloc", "t"),
                attr("fontsize", &style.title_font_size.to_string()),
                attr("bgcolor", &style.background),
                attr("rankdir", &style.direction),
            ])),
            Stmt::GAttribute(GraphAttributes::Node(vec![
                attr("fontsize", &style.node_font_size.to_string()),
                attr("style", "filled"),
            ])),
            Stmt::GAttribute(GraphAttributes::Edge(vec![
                attr("color", &style.edge_color),
                attr("penwidth", &style.edge_pen_width.to_string()),
            ])),
        ];

        stmts.extend(graph.nodes().map(|node| Stmt::Node(dot_node(node))));

        stmts.extend(graph.edges().map(|edge| {
            Stmt::Edge(DotEdge {
                ty: EdgeTy::Pair(
                    Vertex::N(DotNodeId(quoted(edge.source.as_str()), None)),
                    Vertex::N(DotNodeId(quoted(edge.target.as_str()), None)),
                ),
                attributes: vec![
                    attr("style", edge_style(edge.kind)),
                    attr("tooltip", edge.kind.as_str()),
                ],
            })
        }));

        DotGraph::DiGraph {
            id: quoted(&style.title),
            strict: false,
            stmts,
        }
    }
}

fn dot_node(node: &Node) -> DotNode {
    let icon = node.category.icon();
    let label = format!("{}\\n{}", escape(&node.label), node.category);

    DotNode {
        id: DotNodeId(quoted(node.id.as_str()), None),
        attributes: vec![
            Attribute(Id::Plain("label".to_string()), Id::Escaped(format!("\"{label}\""))),
            attr("shape", icon.shape),
            attr("fillcolor", icon.fill),
            attr("tooltip", &node.resource_type),
        ],
    }
}

fn edge_style(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Contains => "solid",
        EdgeKind::AttachesTo => "dashed",
        EdgeKind::RoutesTo => "dotted",
    }
}

fn attr(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), quoted(value))
}

fn quoted(value: &str) -> Id {
    Id::Escaped(format!("\"{}\"", escape(value)))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
