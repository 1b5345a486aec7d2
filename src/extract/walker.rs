//! Descriptor walker and schema builder
//!
//! `SchemaExtractor` owns the traversal from a provider's descriptors to a
//! complete `ProviderSchema`: locating the API and Spec messages, walking
//! fields recursively, collapsing well-known wrapper types, and accumulating
//! nested types. One nested-type accumulator lives for exactly one
//! provider's extraction; it never leaks across providers.

use std::collections::BTreeMap;

use tracing::warn;

use crate::descriptor::proto::{field_type, DescriptorProto, EnumDescriptorProto, FieldDescriptorProto};
use crate::descriptor::{DescriptorIndex, TypeLoc};
use crate::error::{CodegenError, Result};
use crate::extract::options::decode_mcf_options;
use crate::extract::validation::{extract_string_const, extract_validation, reconcile_required};
use crate::schema::{
    FieldSchema, MetadataSchema, ProtoFiles, ProviderSchema, SpecSchema, TypeSchema, TypeSpec,
};
use crate::utils::to_pascal_case;

// Fully-qualified proto type names that receive special handling.
const FQN_STRING_VALUE_OR_REF: &str = "org.openmcf.shared.foreignkey.v1.StringValueOrRef";
const FQN_INT32_VALUE_OR_REF: &str = "org.openmcf.shared.foreignkey.v1.Int32ValueOrRef";
const FQN_PROTOBUF_STRUCT: &str = "google.protobuf.Struct";
const FQN_PROTOBUF_TIMESTAMP: &str = "google.protobuf.Timestamp";

// Well-known in-image locations.
const KIND_ENUM_PROTO: &str = "org/openmcf/shared/cloudresourcekind/cloud_resource_kind.proto";
const KIND_ENUM_NAME: &str = "CloudResourceKind";
const METADATA_PROTO: &str = "org/openmcf/shared/metadata.proto";
const METADATA_MESSAGE: &str = "CloudResourceMetadata";
const PROVIDER_PATH_PREFIX: &str = "org/openmcf/provider/";

/// Accumulator for nested types during one provider's extraction.
///
/// Keyed by bare type name; the sorted attachment order required for
/// deterministic output falls out of the `BTreeMap` key order.
type NestedTypes = BTreeMap<String, TypeSchema>;

/// Walks provider descriptors and builds schema IR documents.
pub struct SchemaExtractor<'a> {
    index: &'a DescriptorIndex,
    kind_enum: &'a EnumDescriptorProto,
}

impl<'a> SchemaExtractor<'a> {
    /// Create an extractor over a descriptor image.
    ///
    /// Resolves the `CloudResourceKind` enum used for reference-kind
    /// resolution; a missing enum is a fatal setup error.
    pub fn new(index: &'a DescriptorIndex) -> Result<Self> {
        let (_, fd) = index.file_by_name(KIND_ENUM_PROTO).ok_or_else(|| {
            CodegenError::descriptor(format!(
                "{} not found in descriptor image",
                KIND_ENUM_PROTO
            ))
        })?;
        let kind_enum = fd
            .enum_type
            .iter()
            .find(|e| e.name() == KIND_ENUM_NAME)
            .ok_or_else(|| {
                CodegenError::descriptor(format!("{} enum not found", KIND_ENUM_NAME))
            })?;

        Ok(Self { index, kind_enum })
    }

    /// Discover all `{cloud}/{resource}` provider pairs present in the
    /// image, sorted. Cloud segments starting with `_` are skipped.
    pub fn discover_providers(&self) -> Vec<(String, String)> {
        let mut providers: Vec<(String, String)> = self
            .index
            .files()
            .iter()
            .filter_map(|fd| provider_of(fd.name()))
            .collect();
        providers.sort();
        providers.dedup();
        providers
    }

    /// Parse a single provider's `api.proto` and `spec.proto` into a
    /// complete `ProviderSchema`.
    pub fn parse_provider(&self, cloud_provider: &str, resource: &str) -> Result<ProviderSchema> {
        let base = format!("{}{}/{}/v1", PROVIDER_PATH_PREFIX, cloud_provider, resource);
        let api_path = format!("{}/api.proto", base);
        let spec_path = format!("{}/spec.proto", base);

        let (api_idx, api_fd) = self.index.file_by_name(&api_path).ok_or_else(|| {
            CodegenError::extract(format!("{} not found in descriptor image", api_path))
        })?;
        let (kind, api_version, description) = self.extract_resource_info(api_idx)?;

        let (spec_idx, spec_fd) = self.index.file_by_name(&spec_path).ok_or_else(|| {
            CodegenError::extract(format!("{} not found in descriptor image", spec_path))
        })?;

        let spec_name = format!("{}Spec", kind);
        let (msg_idx, spec_msg) = spec_fd
            .message_type
            .iter()
            .enumerate()
            .find(|(_, m)| m.name() == spec_name)
            .ok_or_else(|| {
                CodegenError::extract(format!("message {} not found in {}", spec_name, spec_path))
            })?;
        let spec_loc = TypeLoc {
            file: spec_idx,
            path: vec![4, msg_idx as i32],
        };

        let mut nested_types = NestedTypes::new();
        let fields = self.extract_fields(spec_msg, &spec_loc, &mut nested_types);

        Ok(ProviderSchema {
            name: kind.clone(),
            kind,
            cloud_provider: cloud_provider.to_string(),
            api_version,
            description,
            proto_package: api_fd.package().to_string(),
            proto_files: ProtoFiles {
                api: api_path,
                spec: spec_path,
            },
            spec: SpecSchema {
                name: spec_msg.name().to_string(),
                fields,
            },
            nested_types: nested_types.into_values().collect(),
        })
    }

    /// Parse the shared `CloudResourceMetadata` message.
    pub fn parse_metadata(&self) -> Result<MetadataSchema> {
        let (file_idx, fd) = self.index.file_by_name(METADATA_PROTO).ok_or_else(|| {
            CodegenError::extract(format!("{} not found in descriptor image", METADATA_PROTO))
        })?;
        let (msg_idx, msg) = fd
            .message_type
            .iter()
            .enumerate()
            .find(|(_, m)| m.name() == METADATA_MESSAGE)
            .ok_or_else(|| {
                CodegenError::extract(format!("{} message not found", METADATA_MESSAGE))
            })?;
        let loc = TypeLoc {
            file: file_idx,
            path: vec![4, msg_idx as i32],
        };

        let mut nested_types = NestedTypes::new();
        let fields = self.extract_fields(msg, &loc, &mut nested_types);

        Ok(MetadataSchema {
            name: msg.name().to_string(),
            fields,
            nested_types: nested_types.into_values().collect(),
        })
    }

    /// Find the main resource message in `api.proto` and extract the kind
    /// name, apiVersion and description from its string-const rules.
    ///
    /// Every OpenMCF `api.proto` has exactly one message with field 1
    /// `api_version` and field 2 `kind`, each carrying a string const.
    fn extract_resource_info(&self, file_idx: usize) -> Result<(String, String, String)> {
        let fd = self.index.file(file_idx);
        for (i, msg) in fd.message_type.iter().enumerate() {
            let av_field = msg.field_by_number(1);
            let kind_field = msg.field_by_number(2);

            let (Some(av_field), Some(kind_field)) = (av_field, kind_field) else {
                continue;
            };
            if av_field.name() != "api_version" || kind_field.name() != "kind" {
                continue;
            }

            let api_version = extract_string_const(av_field);
            let kind = extract_string_const(kind_field);

            if !kind.is_empty() && !api_version.is_empty() {
                let description = self
                    .index
                    .leading_comment(file_idx, &[4, i as i32])
                    .to_string();
                return Ok((kind, api_version, description));
            }
        }

        Err(CodegenError::extract(format!(
            "no resource message with api_version/kind const rules found in {}",
            fd.name()
        )))
    }

    /// Extract all field schemas of a message, collecting nested message
    /// types into the accumulator.
    fn extract_fields(
        &self,
        msg: &DescriptorProto,
        loc: &TypeLoc,
        nested_types: &mut NestedTypes,
    ) -> Vec<FieldSchema> {
        msg.field
            .iter()
            .enumerate()
            .map(|(i, field)| self.extract_field(field, i, msg, loc, nested_types))
            .collect()
    }

    /// Extract a single field's schema: type information, validation rules
    /// and OpenMCF custom options.
    fn extract_field(
        &self,
        field: &FieldDescriptorProto,
        field_idx: usize,
        msg: &DescriptorProto,
        loc: &TypeLoc,
        nested_types: &mut NestedTypes,
    ) -> FieldSchema {
        let mcf_opts = field
            .options
            .as_deref()
            .map(decode_mcf_options)
            .unwrap_or_default();
        let validation = extract_validation(field);

        let mut fs = FieldSchema {
            name: to_pascal_case(field.name()),
            json_name: field.json_name(),
            proto_field: field.name().to_string(),
            r#type: self.extract_type_spec(field, nested_types),
            description: self
                .index
                .leading_comment(loc.file, &loc.field_path(field_idx))
                .to_string(),
            ..FieldSchema::default()
        };

        if mcf_opts.default_kind_value != 0 {
            fs.reference_kind = self.resolve_kind_name(mcf_opts.default_kind_value);
        }
        fs.reference_field_path = mcf_opts.default_kind_field_path;
        fs.default = mcf_opts.default;
        fs.recommended_default = mcf_opts.recommended_default;

        fs.required = reconcile_required(field, validation.as_ref());
        fs.validation = validation;

        if let Some(oneof_idx) = field.oneof_index {
            // proto3 optional fields sit in synthetic singleton oneofs that
            // carry no exclusivity semantics.
            if !field.proto3_optional.unwrap_or(false) {
                if let Some(decl) = msg.oneof_decl.get(oneof_idx as usize) {
                    fs.oneof_group = decl.name().to_string();
                }
            }
        }

        fs
    }

    /// Full type specification for a field: maps, repeated fields, then
    /// scalar/message/enum types.
    fn extract_type_spec(
        &self,
        field: &FieldDescriptorProto,
        nested_types: &mut NestedTypes,
    ) -> TypeSpec {
        if field.field_type() == field_type::MESSAGE && field.is_repeated() {
            if let Some((entry, _)) = self.index.resolve_message(field.type_name()) {
                if entry.is_map_entry() {
                    let key_type = entry
                        .field_by_number(1)
                        .map(|f| self.extract_scalar_type(f, nested_types))
                        .unwrap_or_else(|| TypeSpec::scalar("string"));
                    let value_type = entry
                        .field_by_number(2)
                        .map(|f| self.extract_scalar_type(f, nested_types))
                        .unwrap_or_else(|| TypeSpec::scalar("string"));
                    return TypeSpec {
                        kind: "map".to_string(),
                        key_type: Some(Box::new(key_type)),
                        value_type: Some(Box::new(value_type)),
                        ..TypeSpec::default()
                    };
                }
            }
        }

        if field.is_repeated() {
            let element = self.extract_scalar_type(field, nested_types);
            return TypeSpec {
                kind: "array".to_string(),
                element_type: Some(Box::new(element)),
                ..TypeSpec::default()
            };
        }

        self.extract_scalar_type(field, nested_types)
    }

    /// Base type of a field, not considering repeated/map wrappers.
    fn extract_scalar_type(
        &self,
        field: &FieldDescriptorProto,
        nested_types: &mut NestedTypes,
    ) -> TypeSpec {
        match field.field_type() {
            field_type::STRING => TypeSpec::scalar("string"),
            field_type::INT32 | field_type::SINT32 | field_type::SFIXED32 => {
                TypeSpec::scalar("int32")
            }
            field_type::UINT32 | field_type::FIXED32 => TypeSpec::scalar("uint32"),
            field_type::INT64 | field_type::SINT64 | field_type::SFIXED64 => {
                TypeSpec::scalar("int64")
            }
            field_type::UINT64 | field_type::FIXED64 => TypeSpec::scalar("uint64"),
            field_type::BOOL => TypeSpec::scalar("bool"),
            field_type::FLOAT => TypeSpec::scalar("float"),
            field_type::DOUBLE => TypeSpec::scalar("double"),
            field_type::BYTES => TypeSpec::scalar("bytes"),
            field_type::MESSAGE => self.extract_message_type(field, nested_types),
            field_type::ENUM => self.extract_enum_type(field),
            _ => TypeSpec::scalar("string"),
        }
    }

    /// Message-typed fields: ValueOrRef wrappers collapse to their scalar
    /// type, well-known google.protobuf types collapse to IR scalars, and
    /// anything else registers a nested type referenced by name.
    fn extract_message_type(
        &self,
        field: &FieldDescriptorProto,
        nested_types: &mut NestedTypes,
    ) -> TypeSpec {
        let fqn = field.type_name();

        match fqn {
            FQN_STRING_VALUE_OR_REF => return TypeSpec::scalar("string"),
            FQN_INT32_VALUE_OR_REF => return TypeSpec::scalar("int32"),
            FQN_PROTOBUF_STRUCT => return TypeSpec::scalar("object"),
            FQN_PROTOBUF_TIMESTAMP => return TypeSpec::scalar("timestamp"),
            _ => {}
        }

        if let Some(rest) = fqn.strip_prefix("google.protobuf.") {
            return TypeSpec::scalar(&rest.to_lowercase());
        }

        let Some((msg, loc)) = self.index.resolve_message(fqn) else {
            warn!("unresolvable message type {} on field {}", fqn, field.name());
            return TypeSpec {
                kind: "message".to_string(),
                message_type: bare_name(fqn).to_string(),
                ..TypeSpec::default()
            };
        };

        let type_name = msg.name().to_string();
        if !nested_types.contains_key(&type_name) {
            // Register a placeholder before walking the fields so
            // self-referential message types terminate.
            nested_types.insert(
                type_name.clone(),
                TypeSchema {
                    name: type_name.clone(),
                    ..TypeSchema::default()
                },
            );
            let fields = self.extract_fields(msg, &loc, nested_types);
            if let Some(entry) = nested_types.get_mut(&type_name) {
                entry.description = self.index.leading_comment(loc.file, &loc.path).to_string();
                entry.proto_type = fqn.to_string();
                entry.fields = fields;
            }
        }

        TypeSpec {
            kind: "message".to_string(),
            message_type: type_name,
            ..TypeSpec::default()
        }
    }

    /// Enum-typed fields: fully-qualified name plus all value names except
    /// the zero value, which is always excluded.
    fn extract_enum_type(&self, field: &FieldDescriptorProto) -> TypeSpec {
        let fqn = field.type_name();
        match self.index.resolve_enum(fqn) {
            Some((en, package)) => TypeSpec {
                kind: "enum".to_string(),
                enum_type: format!("{}.{}", package, en.name()),
                enum_values: en
                    .value
                    .iter()
                    .filter(|v| v.number() != 0)
                    .map(|v| v.name().to_string())
                    .collect(),
                ..TypeSpec::default()
            },
            None => {
                warn!("unresolvable enum type {} on field {}", fqn, field.name());
                TypeSpec {
                    kind: "enum".to_string(),
                    enum_type: fqn.to_string(),
                    ..TypeSpec::default()
                }
            }
        }
    }

    /// Map a CloudResourceKind enum ordinal to its value name.
    fn resolve_kind_name(&self, value: i32) -> String {
        self.kind_enum
            .value
            .iter()
            .find(|v| v.number() == value)
            .map(|v| v.name().to_string())
            .unwrap_or_default()
    }
}

/// Match a descriptor file path against the provider layout, returning the
/// `(cloud, resource)` pair for `org/openmcf/provider/{cloud}/{resource}/v1/api.proto`.
fn provider_of(file_name: &str) -> Option<(String, String)> {
    let rest = file_name.strip_prefix(PROVIDER_PATH_PREFIX)?;
    let rest = rest.strip_suffix("/v1/api.proto")?;
    let (cloud, resource) = rest.split_once('/')?;
    if cloud.starts_with('_') || resource.contains('/') {
        return None;
    }
    Some((cloud.to_string(), resource.to_string()))
}

fn bare_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_path_matching() {
        assert_eq!(
            provider_of("org/openmcf/provider/aws/eks-cluster/v1/api.proto"),
            Some(("aws".to_string(), "eks-cluster".to_string()))
        );
        assert_eq!(
            provider_of("org/openmcf/provider/aws/eks-cluster/v1/spec.proto"),
            None
        );
        assert_eq!(
            provider_of("org/openmcf/provider/_internal/thing/v1/api.proto"),
            None
        );
        assert_eq!(
            provider_of("org/openmcf/provider/aws/nested/extra/v1/api.proto"),
            None
        );
        assert_eq!(provider_of("org/openmcf/shared/metadata.proto"), None);
    }

    #[test]
    fn bare_name_takes_last_segment() {
        assert_eq!(bare_name("org.demo.v1.VpcConfig"), "VpcConfig");
        assert_eq!(bare_name("VpcConfig"), "VpcConfig");
    }
}
