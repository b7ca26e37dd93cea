//! tfdiagram - Terraform state diagrams
//!
//! Reads a Terraform state file for GCP or OCI, classifies its resources,
//! derives containment and attachment edges between them, and renders the
//! result with Graphviz.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod providers;
pub mod render;
pub mod resource;
pub mod terraform;

use std::path::{Path, PathBuf};

pub use classify::{ClassificationTable, ClassifiedRecord, Classifier, MatchKind, UnknownPolicy};
pub use error::DiagramError;
pub use graph::{Edge, EdgeKind, Graph, GraphBuilder, Node, NodeId, ReferenceRule};
pub use providers::{Provider, ProviderProfile, get_provider};
pub use render::{OutputFormat, RenderStyle, Renderer};
pub use resource::{Category, ResourceRecord};
pub use terraform::TerraformState;

/// Load, classify and build the graph for one state file.
pub fn build_graph(profile: &ProviderProfile, state: &Path) -> Result<Graph, DiagramError> {
    let state = TerraformState::from_path(state)?;
    let classifier = Classifier::new(profile.classification.clone());
    let classified = classifier.classify_all(state.records());

    GraphBuilder::new(
        &profile.rules,
        &profile.identity_fields,
        &profile.label_fields,
    )
    .build(&classified)
}

/// Full pipeline: state file in, diagram file out.
///
/// Returns the graph alongside the written path so callers can report on it.
pub fn generate(
    profile: &ProviderProfile,
    state: &Path,
    output: &str,
    format: OutputFormat,
) -> Result<(Graph, PathBuf), DiagramError> {
    tracing::info!(
        provider = %profile.name,
        state = %state.display(),
        output,
        "generating diagram"
    );

    let graph = build_graph(profile, state)?;
    let path = Renderer::new(profile.style.clone()).render(&graph, output, format)?;

    Ok((graph, path))
}
