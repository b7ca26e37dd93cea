use crate::classify::{ClassificationTable, UnknownPolicy};
use crate::graph::{EdgeKind, ReferenceRule};
use crate::render::RenderStyle;
use crate::resource::Category;

use super::{Provider, ProviderProfile, strings};

pub const RESOURCE_TYPES: &[(&str, Category)] = &[
    ("oci_core_instance", Category::ComputeInstance),
    ("oci_core_vcn", Category::Network),
    ("oci_core_subnet", Category::Subnet),
    ("oci_core_security_list", Category::Firewall),
    ("oci_core_route_table", Category::RouteTable),
    ("oci_core_nat_gateway", Category::Nat),
    ("oci_core_internet_gateway", Category::Gateway),
    ("oci_core_service_gateway", Category::Gateway),
    ("oci_core_volume", Category::Disk),
    ("oci_objectstorage_bucket", Category::StorageBucket),
    ("oci_database_db_system", Category::Database),
    ("oci_core_network_security_group", Category::SecurityGroup),
    ("oci_core_network_security_group_security_rule", Category::SecurityRule),
    ("oci_identity_compartment", Category::Project),
];

pub struct OciProvider;

impl OciProvider {
    fn rules() -> Vec<ReferenceRule> {
        use Category::*;
        use EdgeKind::*;

        let vcn_scoped = [Subnet, Firewall, RouteTable, Nat, Gateway, SecurityGroup];

        vec![
            ReferenceRule::new(&[ComputeInstance], "subnet_id", Subnet, Contains),
            ReferenceRule::new(
                &[ComputeInstance],
                "create_vnic_details.subnet_id",
                Subnet,
                Contains,
            ),
            ReferenceRule::new(
                &[ComputeInstance],
                "create_vnic_details.nsg_ids",
                SecurityGroup,
                AttachesTo,
            ),
            ReferenceRule::new(&vcn_scoped, "vcn_id", Network, Contains),
            ReferenceRule::new(&[Subnet], "route_table_id", RouteTable, RoutesTo),
            ReferenceRule::new(&[Subnet], "security_list_ids", Firewall, AttachesTo),
            ReferenceRule::new(&[RouteTable], "route_rules.network_entity_id", Gateway, RoutesTo),
            ReferenceRule::new(&[RouteTable], "route_rules.network_entity_id", Nat, RoutesTo),
            ReferenceRule::new(
                &[SecurityRule],
                "network_security_group_id",
                SecurityGroup,
                Contains,
            ),
            ReferenceRule::new(&[Database], "subnet_id", Subnet, Contains),
            ReferenceRule::new(&[Database], "nsg_ids", SecurityGroup, AttachesTo),
            ReferenceRule::new(&[], "compartment_id", Project, Contains),
        ]
    }
}

impl Provider for OciProvider {
    fn name(&self) -> &str {
        "oci"
    }

    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            name: self.name().to_string(),
            classification: ClassificationTable::from_types(RESOURCE_TYPES.iter().copied())
                .with_unknown(UnknownPolicy::Other),
            label_fields: strings(&["display_name", "name"]),
            identity_fields: strings(&["id"]),
            rules: Self::rules(),
            style: RenderStyle::new("OCI Infrastructure", "white"),
            default_output: "oci_infrastructure_diagram".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oci_resource_types() {
        let types = OciProvider.resource_types();
        assert!(types.contains(&"oci_core_vcn".to_string()));
        assert!(types.contains(&"oci_identity_compartment".to_string()));
        assert!(!types.contains(&"google_compute_network".to_string()));
    }

    #[test]
    fn test_oci_has_no_keyword_fallbacks() {
        let table = OciProvider.profile().classification;
        assert!(table.fallbacks.is_empty());
        assert_eq!(table.lookup("oci_core_drg"), Some(Category::Other));
    }

    #[test]
    fn test_oci_labels_prefer_display_name() {
        let profile = OciProvider.profile();
        assert_eq!(profile.label_fields, vec!["display_name", "name"]);
    }
}
