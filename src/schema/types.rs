//! Intermediate representation for provider schemas
//!
//! These types define the JSON documents bridging Stage 1 (proto2schema) and
//! Stage 2 (generator). They are also read directly at runtime by the MCP
//! resource template handlers, so field names and omission rules are part of
//! the persisted contract and must stay stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Top-level schema for an OpenMCF provider kind.
///
/// One schema is produced per provider (e.g., `AwsAlb`, `GcpGkeCluster`).
/// Consumed by the Stage 2 generator and by MCP resource template handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSchema {
    pub name: String,
    pub kind: String,
    pub cloud_provider: String,
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub proto_package: String,
    pub proto_files: ProtoFiles,
    pub spec: SpecSchema,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<TypeSchema>,
}

/// Proto source files (paths inside the descriptor image) defining a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtoFiles {
    pub api: String,
    pub spec: String,
}

/// Schema of the `{Kind}Spec` message for a provider.
///
/// Field order is proto declaration order, never resorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

/// A nested message type referenced by a spec, keyed by bare type name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proto_type: String,
    pub fields: Vec<FieldSchema>,
}

/// A single field in a spec or nested type.
///
/// ValueOrRef fields are simplified to their scalar type with `referenceKind`
/// metadata preserved. This keeps the MCP tool schema small while retaining
/// cross-resource relationship information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,
    pub json_name: String,
    pub proto_field: String,
    pub r#type: TypeSpec,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference_kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference_field_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recommended_default: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oneof_group: String,
}

/// Type of a field.
///
/// `kind` is an open string rather than a closed enum: well-known protobuf
/// types collapse to their lower-cased bare name, so the set of kinds is not
/// fixed at compile time. Stage 2 matches on the known kind strings and
/// passes everything else through unchecked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<Box<TypeSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Box<TypeSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<TypeSpec>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enum_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl TypeSpec {
    /// A plain scalar type spec with the given kind.
    pub fn scalar(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }
}

/// Validation rules extracted from `buf.validate` field annotations.
///
/// Numeric bounds are always inclusive: exclusive `gt`/`lt` source rules are
/// normalized by one at extraction time. A field with no rules carries no
/// `Validation` at all (`None`), never an empty struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub r#enum: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub r#const: String,
}

impl Validation {
    /// True when no rule family is set at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Schema of the shared `CloudResourceMetadata` message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<TypeSchema>,
}

/// Index of all generated provider schemas.
///
/// The `BTreeMap` keeps registry keys sorted in the persisted JSON, which is
/// what makes `registry.json` byte-stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Registry {
    pub providers: BTreeMap<String, RegistryEntry>,
}

/// One registry entry mapping a provider kind to its schema file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub cloud_provider: String,
    pub api_version: String,
    pub schema_file: String,
}
