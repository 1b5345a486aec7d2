//! Schema tree loading for the Stage 2 generator

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CodegenError, Result};
use crate::schema::{ProviderSchema, Registry, RegistryEntry};

/// Load `providers/registry.json`.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let data = std::fs::read(path).map_err(|e| {
        CodegenError::generate(format!("cannot read registry {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&data).map_err(|e| {
        CodegenError::generate(format!("cannot parse registry {}: {}", path.display(), e))
    })
}

/// Load one provider schema file.
pub fn load_provider_schema(path: &Path) -> Result<ProviderSchema> {
    let data = std::fs::read(path).map_err(|e| {
        CodegenError::generate(format!("cannot read schema {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&data).map_err(|e| {
        CodegenError::generate(format!("cannot parse schema {}: {}", path.display(), e))
    })
}

/// Group registry entries by cloud provider. The `BTreeMap` keeps cloud
/// iteration order deterministic.
pub fn group_by_cloud(registry: &Registry) -> BTreeMap<String, Vec<RegistryEntry>> {
    let mut groups: BTreeMap<String, Vec<RegistryEntry>> = BTreeMap::new();
    for entry in registry.providers.values() {
        groups
            .entry(entry.cloud_provider.clone())
            .or_default()
            .push(entry.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_is_sorted_by_cloud() {
        let mut registry = Registry::default();
        for (kind, cloud) in [("GcpVpc", "gcp"), ("AwsVpc", "aws"), ("AwsAlb", "aws")] {
            registry.providers.insert(
                kind.to_string(),
                RegistryEntry {
                    cloud_provider: cloud.to_string(),
                    api_version: "v1".to_string(),
                    schema_file: format!("{}/{}.json", cloud, kind.to_lowercase()),
                },
            );
        }
        let groups = group_by_cloud(&registry);
        let clouds: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(clouds, ["aws", "gcp"]);
        assert_eq!(groups["aws"].len(), 2);
    }
}
