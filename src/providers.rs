pub mod gcp;
pub mod oci;

use thiserror::Error;

use crate::classify::ClassificationTable;
use crate::graph::ReferenceRule;
use crate::render::RenderStyle;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Everything provider-specific the pipeline needs, as plain data.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub name: String,
    pub classification: ClassificationTable,
    /// Attributes tried in order for a node's display label.
    pub label_fields: Vec<String>,
    /// Attributes other resources use to refer to this one.
    pub identity_fields: Vec<String>,
    pub rules: Vec<ReferenceRule>,
    pub style: RenderStyle,
    pub default_output: String,
}

pub trait Provider {
    fn name(&self) -> &str;
    fn profile(&self) -> ProviderProfile;

    fn resource_types(&self) -> Vec<String> {
        self.profile().classification.types.into_keys().collect()
    }
}

pub fn get_provider(name: &str) -> Result<Box<dyn Provider>, ProviderError> {
    match name {
        "gcp" => Ok(Box::new(gcp::GcpProvider)),
        "oci" => Ok(Box::new(oci::OciProvider)),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
