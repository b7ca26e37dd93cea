use std::fmt;

use serde::{Deserialize, Serialize};

/// Terraform distinguishes managed resources from data sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

/// One resource instance read from a Terraform state file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub resource_type: String,
    pub name: String,
    pub mode: ResourceMode,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ResourceRecord {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            mode: ResourceMode::Managed,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = attributes {
            self.attributes = map;
        }
        self
    }

    pub fn with_mode(mut self, mode: ResourceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the first non-empty string attribute among `fields`.
    pub fn string_attribute<'a>(&'a self, fields: &[String]) -> Option<&'a str> {
        fields.iter().find_map(|field| {
            self.attributes
                .get(field)
                .and_then(serde_json::Value::as_str)
                .filter(|value| !value.is_empty())
        })
    }
}

/// Semantic kind of a resource, used to pick its diagram icon and to scope
/// reference rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Network,
    Subnet,
    ComputeInstance,
    Disk,
    StorageBucket,
    Database,
    Analytics,
    Firewall,
    SecurityGroup,
    SecurityRule,
    Router,
    Nat,
    Gateway,
    RouteTable,
    Route,
    Iam,
    Project,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Network => "network",
            Category::Subnet => "subnet",
            Category::ComputeInstance => "compute-instance",
            Category::Disk => "disk",
            Category::StorageBucket => "storage-bucket",
            Category::Database => "database",
            Category::Analytics => "analytics",
            Category::Firewall => "firewall",
            Category::SecurityGroup => "security-group",
            Category::SecurityRule => "security-rule",
            Category::Router => "router",
            Category::Nat => "nat",
            Category::Gateway => "gateway",
            Category::RouteTable => "route-table",
            Category::Route => "route",
            Category::Iam => "iam",
            Category::Project => "project",
            Category::Other => "other",
        }
    }

    /// Default visual for the category.
    pub fn icon(&self) -> Icon {
        let (shape, fill) = match self {
            Category::Network => ("tab", "#d2e3fc"),
            Category::Subnet => ("folder", "#e8f0fe"),
            Category::ComputeInstance => ("box3d", "#fce8b2"),
            Category::Disk => ("cylinder", "#fad2cf"),
            Category::StorageBucket => ("cylinder", "#ceead6"),
            Category::Database => ("cylinder", "#d7aefb"),
            Category::Analytics => ("component", "#fdd663"),
            Category::Firewall => ("octagon", "#f28b82"),
            Category::SecurityGroup => ("octagon", "#fbbc04"),
            Category::SecurityRule => ("note", "#fde293"),
            Category::Router => ("diamond", "#a8dab5"),
            Category::Nat => ("invhouse", "#a8dab5"),
            Category::Gateway => ("house", "#a8dab5"),
            Category::RouteTable => ("hexagon", "#ccff90"),
            Category::Route => ("parallelogram", "#ccff90"),
            Category::Iam => ("pentagon", "#e6c9a8"),
            Category::Project => ("folder", "#e8eaed"),
            Category::Other => ("box", "#ffffff"),
        };
        Icon { shape, fill }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graphviz node shape and fill colour standing in for a provider icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub shape: &'static str,
    pub fill: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization_kebab_case() {
        let json = serde_json::to_string(&Category::ComputeInstance).unwrap();
        assert_eq!(json, "\"compute-instance\"");

        let parsed: Category = serde_json::from_str("\"route-table\"").unwrap();
        assert_eq!(parsed, Category::RouteTable);
    }

    #[test]
    fn test_category_display_matches_serde_name() {
        for category in [Category::Network, Category::StorageBucket, Category::Other] {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json.trim_matches('"'), category.to_string());
        }
    }

    #[test]
    fn test_string_attribute_first_non_empty() {
        let record = ResourceRecord::new("oci_core_vcn", "main").with_attributes(
            serde_json::json!({"display_name": "", "name": "prod-vcn"}),
        );
        let fields = vec!["display_name".to_string(), "name".to_string()];
        assert_eq!(record.string_attribute(&fields), Some("prod-vcn"));
    }

    #[test]
    fn test_string_attribute_ignores_non_strings() {
        let record = ResourceRecord::new("google_compute_instance", "vm")
            .with_attributes(serde_json::json!({"name": 42}));
        assert_eq!(record.string_attribute(&["name".to_string()]), None);
    }

    #[test]
    fn test_resource_mode_deserialization() {
        let mode: ResourceMode = serde_json::from_str("\"data\"").unwrap();
        assert_eq!(mode, ResourceMode::Data);
        assert_eq!(ResourceMode::default(), ResourceMode::Managed);
    }
}
