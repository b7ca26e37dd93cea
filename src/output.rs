use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsPostOrder, Reversed, Walker};
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::graph::{EdgeKind, Graph, Node};

#[derive(Tabled)]
struct NodeRow<'a> {
    #[tabled(rename = "Resource")]
    id: &'a str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Label")]
    label: &'a str,
    #[tabled(rename = "Links")]
    links: usize,
}

/// One row per node, with the number of edges leaving it.
pub fn node_table(graph: &Graph) -> String {
    let rows: Vec<NodeRow<'_>> = graph
        .nodes()
        .map(|node| NodeRow {
            id: node.id.as_str(),
            category: node.category.as_str(),
            label: &node.label,
            links: graph.outgoing(&node.id).len(),
        })
        .collect();

    Table::new(rows).to_string()
}

/// Containment hierarchy: nodes nest under whatever they are contained by.
///
/// A node with several containers appears under each of them.
pub fn containment_tree(graph: &Graph, title: &str) -> Tree<String> {
    // Same node indices as `graph`, keeping only `contains` edges.
    let contains: DiGraph<&Node, ()> = graph.digraph().filter_map(
        |_, node| Some(node),
        |_, kind| (*kind == EdgeKind::Contains).then_some(()),
    );

    let mut root = Tree::new(title.to_string());
    for ix in contains.node_indices() {
        let contained = contains
            .neighbors_directed(ix, Direction::Outgoing)
            .next()
            .is_some();
        if !contained {
            root.push(subtree(&contains, ix));
        }
    }

    root
}

/// Builds the tree under `start` bottom-up from a post-order walk over the
/// reversed containment edges.
fn subtree(contains: &DiGraph<&Node, ()>, start: NodeIndex) -> Tree<String> {
    let reversed = Reversed(contains);
    let mut built: HashMap<NodeIndex, Tree<String>> = HashMap::new();

    for ix in DfsPostOrder::new(reversed, start).iter(reversed) {
        let node = contains[ix];
        let mut tree = Tree::new(format!("{} ({})", node.id, node.category));

        let mut children: Vec<NodeIndex> = contains
            .neighbors_directed(ix, Direction::Incoming)
            .collect();
        children.sort();
        children.dedup();

        // A child not yet built closes a containment cycle.
        for child in children {
            if let Some(child_tree) = built.get(&child) {
                tree.push(child_tree.clone());
            }
        }
        built.insert(ix, tree);
    }

    built.remove(&start).unwrap_or_else(|| {
        let node = contains[start];
        Tree::new(format!("{} ({})", node.id, node.category))
    })
}
