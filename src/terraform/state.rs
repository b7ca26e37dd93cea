use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::resource::{ResourceMode, ResourceRecord};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read state file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Terraform state parser.
///
/// Parses tfstate v4 files into one [`ResourceRecord`] per resource instance,
/// in document order. Only `resources[].{mode,type,name,module,instances}` is
/// read; everything else in the document is ignored.
#[derive(Debug, Clone, Default)]
pub struct TerraformState {
    records: Vec<ResourceRecord>,
}

#[derive(Debug, Deserialize)]
struct StateDocument {
    resources: Vec<StateResource>,
}

#[derive(Debug, Deserialize)]
struct StateResource {
    #[serde(default)]
    mode: ResourceMode,
    #[serde(rename = "type")]
    type_: String,
    name: String,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    instances: Vec<StateInstance>,
}

#[derive(Debug, Deserialize)]
struct StateInstance {
    #[serde(default)]
    index_key: Option<Value>,
    #[serde(default)]
    attributes: Option<Map<String, Value>>,
}

impl TerraformState {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let state = Self::parse(&content).map_err(|message| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::info!(
            path = %path.display(),
            count = state.records.len(),
            "state file loaded"
        );

        Ok(state)
    }

    /// Parses state JSON that did not come from a file.
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        Self::parse(content).map_err(|message| LoadError::Parse {
            path: PathBuf::from("<inline>"),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let document: StateDocument =
            serde_json::from_str(content).map_err(|e| e.to_string())?;

        let records = document
            .resources
            .into_iter()
            .flat_map(|resource| {
                let StateResource {
                    mode,
                    type_,
                    name,
                    module,
                    instances,
                } = resource;

                instances.into_iter().map(move |instance| ResourceRecord {
                    resource_type: type_.clone(),
                    name: instance_name(module.as_deref(), &name, instance.index_key.as_ref()),
                    mode,
                    attributes: instance.attributes.unwrap_or_default(),
                })
            })
            .collect();

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds the instance part of a Terraform address, e.g. `module.net.web[0]`.
fn instance_name(module: Option<&str>, name: &str, index_key: Option<&Value>) -> String {
    let mut address = match module {
        Some(module) if !module.is_empty() => format!("{module}.{name}"),
        _ => name.to_string(),
    };

    match index_key {
        Some(Value::Number(n)) => address.push_str(&format!("[{n}]")),
        Some(Value::String(s)) => address.push_str(&format!("[\"{s}\"]")),
        _ => {}
    }

    address
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE: &str = r#"{
        "version": 4,
        "terraform_version": "1.6.0",
        "resources": [
            {
                "mode": "managed",
                "type": "google_compute_network",
                "name": "vpc",
                "provider": "provider[\"registry.terraform.io/hashicorp/google\"]",
                "instances": [
                    {"schema_version": 0, "attributes": {"name": "main-vpc", "self_link": "https://x/networks/main-vpc"}}
                ]
            },
            {
                "mode": "managed",
                "type": "google_compute_instance",
                "name": "web",
                "instances": [
                    {"index_key": 0, "attributes": {"name": "web-0"}},
                    {"index_key": 1, "attributes": {"name": "web-1"}}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_flattens_instances_in_order() {
        let state = TerraformState::from_json(STATE).unwrap();
        let names: Vec<&str> = state.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["vpc", "web[0]", "web[1]"]);
        assert_eq!(state.records()[0].resource_type, "google_compute_network");
        assert_eq!(state.records()[2].attributes["name"], "web-1");
    }

    #[test]
    fn test_parse_module_and_string_index() {
        let json = r#"{"resources": [{
            "module": "module.net",
            "mode": "data",
            "type": "oci_core_vcn",
            "name": "shared",
            "instances": [{"index_key": "eu", "attributes": {}}]
        }]}"#;
        let state = TerraformState::from_json(json).unwrap();
        let record = &state.records()[0];
        assert_eq!(record.name, "module.net.shared[\"eu\"]");
        assert_eq!(record.mode, ResourceMode::Data);
    }

    #[test]
    fn test_parse_missing_instances_and_attributes() {
        let json = r#"{"resources": [
            {"type": "oci_core_vcn", "name": "empty"},
            {"type": "oci_core_subnet", "name": "bare", "instances": [{"attributes": null}]}
        ]}"#;
        let state = TerraformState::from_json(json).unwrap();
        assert_eq!(state.records().len(), 1);
        assert!(state.records()[0].attributes.is_empty());
    }

    #[test]
    fn test_parse_empty_resources() {
        let state = TerraformState::from_json(r#"{"version": 4, "resources": []}"#).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_parse_missing_resources_is_error() {
        let result = TerraformState::from_json(r#"{"version": 4}"#);
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_parse_invalid_json_is_error() {
        let result = TerraformState::from_json("{ not json");
        match result {
            Err(LoadError::Parse { path, .. }) => assert_eq!(path, PathBuf::from("<inline>")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = TerraformState::from_path("/nonexistent/terraform.tfstate");
        match result {
            Err(err @ LoadError::Read { .. }) => {
                assert!(err.to_string().contains("/nonexistent/terraform.tfstate"));
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }
}
