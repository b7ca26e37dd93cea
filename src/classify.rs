use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::resource::{Category, ResourceMode, ResourceRecord};

/// What to do with a resource type the classification table doesn't know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// Leave the resource out of the diagram.
    Skip,
    /// Draw the resource as an unconnected `other` node.
    #[default]
    Other,
}

/// Substring match used when a type has no exact entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFallback {
    pub keyword: String,
    pub category: Category,
}

impl KeywordFallback {
    pub fn new(keyword: impl Into<String>, category: Category) -> Self {
        Self {
            keyword: keyword.into(),
            category,
        }
    }
}

/// Which part of the table decided a record's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Listed in `types`.
    Exact,
    /// Matched a keyword fallback; drawn with the category's icon only.
    Keyword,
    /// Fell through to [`UnknownPolicy::Other`].
    Unknown,
}

/// Provider-specific classification data, passed explicitly to [`Classifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationTable {
    pub types: BTreeMap<String, Category>,
    pub fallbacks: Vec<KeywordFallback>,
    pub unknown: UnknownPolicy,
    pub exclude: BTreeSet<Category>,
    pub include_data_sources: bool,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self {
            types: BTreeMap::new(),
            fallbacks: Vec::new(),
            unknown: UnknownPolicy::default(),
            exclude: BTreeSet::new(),
            include_data_sources: true,
        }
    }
}

impl ClassificationTable {
    pub fn from_types<'a>(entries: impl IntoIterator<Item = (&'a str, Category)>) -> Self {
        Self {
            types: entries
                .into_iter()
                .map(|(ty, category)| (ty.to_string(), category))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<KeywordFallback>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_unknown(mut self, unknown: UnknownPolicy) -> Self {
        self.unknown = unknown;
        self
    }

    /// Category for a type string, before exclusion and data-source filtering.
    pub fn lookup(&self, resource_type: &str) -> Option<Category> {
        self.matches(resource_type).map(|(category, _)| category)
    }

    fn matches(&self, resource_type: &str) -> Option<(Category, MatchKind)> {
        if let Some(category) = self.types.get(resource_type) {
            return Some((*category, MatchKind::Exact));
        }

        if let Some(fallback) = self
            .fallbacks
            .iter()
            .find(|f| resource_type.contains(f.keyword.as_str()))
        {
            return Some((fallback.category, MatchKind::Keyword));
        }

        match self.unknown {
            UnknownPolicy::Skip => None,
            UnknownPolicy::Other => Some((Category::Other, MatchKind::Unknown)),
        }
    }
}

/// A record paired with the category it will be drawn as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedRecord<'a> {
    pub record: &'a ResourceRecord,
    pub category: Category,
    pub matched: MatchKind,
}

impl<'a> ClassifiedRecord<'a> {
    pub fn new(record: &'a ResourceRecord, category: Category, matched: MatchKind) -> Self {
        Self {
            record,
            category,
            matched,
        }
    }

    /// Only exactly-typed records take part in reference rules, as source or target.
    pub fn is_linkable(&self) -> bool {
        self.matched == MatchKind::Exact && self.category != Category::Other
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    table: ClassificationTable,
}

impl Classifier {
    pub fn new(table: ClassificationTable) -> Self {
        Self { table }
    }

    /// Returns `None` when the record should not become a node.
    pub fn classify<'a>(&self, record: &'a ResourceRecord) -> Option<ClassifiedRecord<'a>> {
        if record.mode == ResourceMode::Data && !self.table.include_data_sources {
            tracing::debug!(
                resource_type = %record.resource_type,
                name = %record.name,
                "skipping data source"
            );
            return None;
        }

        let Some((category, matched)) = self.table.matches(&record.resource_type) else {
            tracing::debug!(
                resource_type = %record.resource_type,
                name = %record.name,
                "skipping unknown resource type"
            );
            return None;
        };

        if self.table.exclude.contains(&category) {
            tracing::debug!(
                resource_type = %record.resource_type,
                %category,
                "skipping excluded category"
            );
            return None;
        }

        Some(ClassifiedRecord::new(record, category, matched))
    }

    pub fn classify_all<'a>(&self, records: &'a [ResourceRecord]) -> Vec<ClassifiedRecord<'a>> {
        let classified: Vec<ClassifiedRecord<'a>> = records
            .iter()
            .filter_map(|record| self.classify(record))
            .collect();

        tracing::info!(
            total = records.len(),
            classified = classified.len(),
            "resources classified"
        );

        classified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ClassificationTable {
        ClassificationTable::from_types([
            ("google_compute_network", Category::Network),
            ("google_compute_subnetwork", Category::Subnet),
        ])
    }

    fn category(classifier: &Classifier, record: &ResourceRecord) -> Option<Category> {
        classifier.classify(record).map(|c| c.category)
    }

    #[test]
    fn test_exact_match() {
        let classifier = Classifier::new(table());
        let record = ResourceRecord::new("google_compute_network", "vpc");
        let classified = classifier.classify(&record).unwrap();
        assert_eq!(classified.category, Category::Network);
        assert_eq!(classified.matched, MatchKind::Exact);
        assert!(classified.is_linkable());
    }

    #[test]
    fn test_unknown_other_policy() {
        let classifier = Classifier::new(table().with_unknown(UnknownPolicy::Other));
        let record = ResourceRecord::new("google_pubsub_topic", "events");
        let classified = classifier.classify(&record).unwrap();
        assert_eq!(classified.category, Category::Other);
        assert_eq!(classified.matched, MatchKind::Unknown);
        assert!(!classified.is_linkable());
    }

    #[test]
    fn test_unknown_skip_policy() {
        let classifier = Classifier::new(table().with_unknown(UnknownPolicy::Skip));
        let record = ResourceRecord::new("google_pubsub_topic", "events");
        assert_eq!(category(&classifier, &record), None);
    }

    #[test]
    fn test_fallback_order_first_match_wins() {
        let classifier = Classifier::new(
            table()
                .with_fallbacks(vec![
                    KeywordFallback::new("iam", Category::Iam),
                    KeywordFallback::new("project", Category::Project),
                ])
                .with_unknown(UnknownPolicy::Skip),
        );
        let record = ResourceRecord::new("google_project_iam_member", "binding");
        let classified = classifier.classify(&record).unwrap();
        assert_eq!(classified.category, Category::Iam);
        assert_eq!(classified.matched, MatchKind::Keyword);
        assert!(!classified.is_linkable());
    }

    #[test]
    fn test_exact_match_beats_fallback() {
        let fallbacks = vec![KeywordFallback::new("compute", Category::ComputeInstance)];
        let classifier = Classifier::new(table().with_fallbacks(fallbacks));
        let record = ResourceRecord::new("google_compute_subnetwork", "sub");
        let classified = classifier.classify(&record).unwrap();
        assert_eq!(classified.category, Category::Subnet);
        assert_eq!(classified.matched, MatchKind::Exact);
    }

    #[test]
    fn test_excluded_category() {
        let mut table = table();
        table.exclude.insert(Category::Subnet);
        let classifier = Classifier::new(table);
        let record = ResourceRecord::new("google_compute_subnetwork", "sub");
        assert_eq!(category(&classifier, &record), None);
    }

    #[test]
    fn test_data_sources_filtered_when_disabled() {
        let mut table = table();
        table.include_data_sources = false;
        let classifier = Classifier::new(table);
        let record =
            ResourceRecord::new("google_compute_network", "default").with_mode(ResourceMode::Data);
        assert_eq!(category(&classifier, &record), None);
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let classifier = Classifier::new(table().with_unknown(UnknownPolicy::Skip));
        let records = vec![
            ResourceRecord::new("google_compute_subnetwork", "a"),
            ResourceRecord::new("google_dns_zone", "b"),
            ResourceRecord::new("google_compute_network", "c"),
        ];
        let classified = classifier.classify_all(&records);
        let names: Vec<&str> = classified.iter().map(|c| c.record.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_unknown_policy_deserialization() {
        let policy: UnknownPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, UnknownPolicy::Skip);
    }
}
