//! Configuration file loading.
//!
//! Finds an optional TOML file and applies its per-provider overrides on top
//! of the built-in [`ProviderProfile`] tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::classify::UnknownPolicy;
use crate::graph::ReferenceRule;
use crate::providers::ProviderProfile;
use crate::resource::Category;

pub const LOCAL_CONFIG: &str = "tfdiagram.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub gcp: ProviderOverrides,
    pub oci: ProviderOverrides,
}

/// Optional changes to one provider's tables and styling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderOverrides {
    pub unknown: Option<UnknownPolicy>,
    pub include_data_sources: Option<bool>,
    pub exclude: Vec<Category>,
    /// Extra or replacement `type = "category"` entries.
    pub types: BTreeMap<String, Category>,
    /// Appended after the built-in rules.
    pub rules: Vec<ReferenceRule>,
    pub title: Option<String>,
    pub background: Option<String>,
}

impl AppConfig {
    pub fn for_provider(&self, name: &str) -> Option<&ProviderOverrides> {
        match name {
            "gcp" => Some(&self.gcp),
            "oci" => Some(&self.oci),
            _ => None,
        }
    }

    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl ProviderOverrides {
    pub fn apply(&self, profile: &mut ProviderProfile) {
        let table = &mut profile.classification;

        if let Some(unknown) = self.unknown {
            table.unknown = unknown;
        }
        if let Some(include) = self.include_data_sources {
            table.include_data_sources = include;
        }
        table.exclude.extend(self.exclude.iter().copied());
        table
            .types
            .extend(self.types.iter().map(|(ty, category)| (ty.clone(), *category)));

        profile.rules.extend(self.rules.iter().cloned());

        if let Some(title) = &self.title {
            profile.style.title = title.clone();
        }
        if let Some(background) = &self.background {
            profile.style.background = background.clone();
        }
    }
}

/// Find and load configuration.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. `tfdiagram.toml` in the working directory
/// 3. `tfdiagram/config.toml` under the platform config directory
/// 4. Built-in defaults
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = explicit_path {
        tracing::info!(path = %path.display(), "loading configuration from explicit path");
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        return load_config_file(path);
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.exists() {
        tracing::info!(path = %local.display(), "loading configuration from working directory");
        return load_config_file(local);
    }

    match dirs::config_dir() {
        Some(dir) => {
            let system = dir.join("tfdiagram").join("config.toml");
            if system.exists() {
                tracing::info!(path = %system.display(), "loading configuration from system path");
                return load_config_file(&system);
            }
            tracing::debug!(path = %system.display(), "system configuration file not found");
        }
        None => tracing::debug!("could not determine platform config directory"),
    }

    tracing::debug!("no configuration file found, using defaults");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml(&content, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use crate::providers::{Provider, gcp::GcpProvider};

    const SAMPLE: &str = r#"
[gcp]
unknown = "skip"
include_data_sources = false
exclude = ["iam"]
title = "Staging"

[gcp.types]
google_dns_managed_zone = "network"

[[gcp.rules]]
applies_to = ["compute-instance"]
field = "service_account.email"
target = "iam"
kind = "attaches-to"
"#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml(SAMPLE, Path::new("sample.toml")).unwrap();
        assert_eq!(config.gcp.unknown, Some(UnknownPolicy::Skip));
        assert_eq!(config.gcp.exclude, vec![Category::Iam]);
        assert_eq!(config.gcp.rules[0].kind, EdgeKind::AttachesTo);
        assert!(config.oci.types.is_empty());
    }

    #[test]
    fn test_apply_overrides() {
        let config = AppConfig::from_toml(SAMPLE, Path::new("sample.toml")).unwrap();
        let mut profile = GcpProvider.profile();
        let rule_count = profile.rules.len();

        config.gcp.apply(&mut profile);

        let table = &profile.classification;
        assert_eq!(table.unknown, UnknownPolicy::Skip);
        assert!(!table.include_data_sources);
        assert!(table.exclude.contains(&Category::Iam));
        assert_eq!(table.lookup("google_dns_managed_zone"), Some(Category::Network));
        assert_eq!(profile.rules.len(), rule_count + 1);
        assert_eq!(profile.style.title, "Staging");
        assert_eq!(profile.style.background, "transparent");
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut profile = GcpProvider.profile();
        let before = profile.clone();
        ProviderOverrides::default().apply(&mut profile);
        assert_eq!(profile.classification, before.classification);
        assert_eq!(profile.rules, before.rules);
        assert_eq!(profile.style, before.style);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = AppConfig::from_toml("[aws]\nunknown = \"skip\"", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_bad_category_rejected() {
        let result = AppConfig::from_toml("[oci]\nexclude = [\"vm\"]", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = load_config(Some(Path::new("/nonexistent/tfdiagram.toml")));
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_explicit_file_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[oci]\nbackground = \"transparent\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.oci.background.as_deref(), Some("transparent"));
        assert!(config.for_provider("oci").is_some());
        assert!(config.for_provider("aws").is_none());
    }
}
