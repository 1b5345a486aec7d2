//! Registry building and schema output writing
//!
//! Output determinism is a contract: two runs over the same descriptor image
//! must produce byte-identical files. Ordering therefore always happens at
//! the data-structure level (sorted schema list, `BTreeMap` registry keys),
//! never inherited from traversal order.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::schema::{MetadataSchema, ProviderSchema, Registry, RegistryEntry};
use crate::utils::schema_file_name;

/// Build a registry from parsed provider schemas. Each kind maps to its
/// cloud provider, API version and the relative path of its schema file.
pub fn build_registry(schemas: &[ProviderSchema]) -> Registry {
    let mut registry = Registry::default();
    for schema in schemas {
        registry.providers.insert(
            schema.kind.clone(),
            RegistryEntry {
                cloud_provider: schema.cloud_provider.clone(),
                api_version: schema.api_version.clone(),
                schema_file: format!(
                    "{}/{}",
                    schema.cloud_provider,
                    schema_file_name(&schema.kind)
                ),
            },
        );
    }
    registry
}

/// Sort provider schemas alphabetically by kind for deterministic output.
pub fn sort_schemas_by_kind(schemas: &mut [ProviderSchema]) {
    schemas.sort_by(|a, b| a.kind.cmp(&b.kind));
}

/// Write a single provider schema to `providers/{cloud}/{kind}.json`.
pub fn write_provider_schema(schema: &ProviderSchema, base_dir: &Path) -> Result<PathBuf> {
    let dir = base_dir.join("providers").join(&schema.cloud_provider);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(schema_file_name(&schema.kind));
    write_json(&path, schema)?;
    Ok(path)
}

/// Write the provider registry to `providers/registry.json`.
pub fn write_registry(schemas: &[ProviderSchema], base_dir: &Path) -> Result<PathBuf> {
    let dir = base_dir.join("providers");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("registry.json");
    write_json(&path, &build_registry(schemas))?;
    Ok(path)
}

/// Write the shared metadata schema to `shared/metadata.json`.
pub fn write_metadata_schema(schema: &MetadataSchema, base_dir: &Path) -> Result<PathBuf> {
    let dir = base_dir.join("shared");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("metadata.json");
    write_json(&path, schema)?;
    Ok(path)
}

/// Serialize `value` as two-space-indented JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    std::fs::write(path, data)?;
    Ok(())
}
