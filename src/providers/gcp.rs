use crate::classify::{ClassificationTable, KeywordFallback, UnknownPolicy};
use crate::graph::{EdgeKind, ReferenceRule};
use crate::render::RenderStyle;
use crate::resource::Category;

use super::{Provider, ProviderProfile, strings};

pub const RESOURCE_TYPES: &[(&str, Category)] = &[
    ("google_compute_instance", Category::ComputeInstance),
    ("google_compute_network", Category::Network),
    ("google_compute_subnetwork", Category::Subnet),
    ("google_compute_firewall", Category::Firewall),
    ("google_compute_router", Category::Router),
    ("google_compute_router_nat", Category::Nat),
    ("google_compute_route", Category::Route),
    ("google_compute_disk", Category::Disk),
    ("google_storage_bucket", Category::StorageBucket),
    ("google_sql_database_instance", Category::Database),
    ("google_bigquery_dataset", Category::Analytics),
    ("google_iam_policy", Category::Iam),
    ("google_project", Category::Project),
];

/// Substring fallbacks for types missing from [`RESOURCE_TYPES`], checked in order.
pub const KEYWORD_FALLBACKS: &[(&str, Category)] = &[
    ("compute", Category::ComputeInstance),
    ("network", Category::Network),
    ("storage", Category::StorageBucket),
    ("database", Category::Database),
    ("security", Category::Iam),
    ("iam", Category::Iam),
    ("project", Category::Project),
    ("resource_manager", Category::Project),
];

pub struct GcpProvider;

impl GcpProvider {
    fn rules() -> Vec<ReferenceRule> {
        use Category::*;
        use EdgeKind::*;

        vec![
            ReferenceRule::new(&[Subnet], "network", Network, Contains),
            ReferenceRule::new(
                &[ComputeInstance],
                "network_interface.subnetwork",
                Subnet,
                Contains,
            ),
            ReferenceRule::new(&[ComputeInstance], "network_interface.network", Network, Contains),
            ReferenceRule::new(&[ComputeInstance], "boot_disk.source", Disk, AttachesTo),
            ReferenceRule::new(&[ComputeInstance], "attached_disk.source", Disk, AttachesTo),
            ReferenceRule::new(&[Firewall], "network", Network, AttachesTo),
            ReferenceRule::new(&[Router], "network", Network, AttachesTo),
            ReferenceRule::new(&[Nat], "router", Router, AttachesTo),
            ReferenceRule::new(&[Route], "network", Network, Contains),
            ReferenceRule::new(&[Route], "next_hop_instance", ComputeInstance, RoutesTo),
            ReferenceRule::new(
                &[Database],
                "settings.ip_configuration.private_network",
                Network,
                AttachesTo,
            ),
            ReferenceRule::new(&[], "project", Project, Contains),
        ]
    }
}

impl Provider for GcpProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    fn profile(&self) -> ProviderProfile {
        let fallbacks = KEYWORD_FALLBACKS
            .iter()
            .map(|(keyword, category)| KeywordFallback::new(*keyword, *category))
            .collect();

        ProviderProfile {
            name: self.name().to_string(),
            classification: ClassificationTable::from_types(RESOURCE_TYPES.iter().copied())
                .with_fallbacks(fallbacks)
                .with_unknown(UnknownPolicy::Other),
            label_fields: strings(&["name"]),
            identity_fields: strings(&["id", "self_link", "name", "project_id"]),
            rules: Self::rules(),
            style: RenderStyle::new("GCP Infrastructure", "transparent"),
            default_output: "infrastructure_diagram".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcp_resource_types() {
        let types = GcpProvider.resource_types();
        assert!(types.contains(&"google_compute_instance".to_string()));
        assert!(types.contains(&"google_compute_router_nat".to_string()));
        assert!(!types.contains(&"oci_core_vcn".to_string()));
    }

    #[test]
    fn test_gcp_keyword_fallbacks() {
        let table = GcpProvider.profile().classification;
        assert_eq!(
            table.lookup("google_compute_global_address"),
            Some(Category::ComputeInstance)
        );
        assert_eq!(table.lookup("google_storage_bucket_object"), Some(Category::StorageBucket));
        assert_eq!(table.lookup("google_project_iam_member"), Some(Category::Iam));
        assert_eq!(table.lookup("google_project_service"), Some(Category::Project));
        assert_eq!(table.lookup("google_pubsub_topic"), Some(Category::Other));
    }

    #[test]
    fn test_gcp_style() {
        let style = GcpProvider.profile().style;
        assert_eq!(style.title, "GCP Infrastructure");
        assert_eq!(style.background, "transparent");
    }
}
