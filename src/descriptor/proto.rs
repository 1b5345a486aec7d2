//! Hand-declared subset of `google/protobuf/descriptor.proto`
//!
//! `prost-types` ships complete descriptor bindings, but prost silently drops
//! unknown fields when decoding typed messages. The validation rules and the
//! OpenMCF custom options both live in `FieldOptions` extension ranges that
//! no compiled Rust registry knows about, so decoding through `prost-types`
//! would destroy exactly the bytes this pipeline exists to read. These
//! structs declare `FieldOptions` as raw `bytes` instead (wire-compatible:
//! message fields are length-delimited), leaving the extension payload intact
//! for the option decoders in `crate::extract`.
//!
//! Only the descriptor fields the pipeline navigates are declared; prost
//! skips the rest during decoding.

/// A set of compiled proto files, as produced by `buf build` or
/// `protoc --descriptor_set_out`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDescriptorSet {
    #[prost(message, repeated, tag = "1")]
    pub file: Vec<FileDescriptorProto>,
}

/// One compiled proto file.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDescriptorProto {
    /// File path relative to the proto import root, e.g.
    /// `org/openmcf/provider/aws/eks-cluster/v1/api.proto`.
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub package: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub message_type: Vec<DescriptorProto>,
    #[prost(message, repeated, tag = "5")]
    pub enum_type: Vec<EnumDescriptorProto>,
    /// Present only when the image was built with source info retained
    /// (`buf build --include-source-info` or `protoc --include_source_info`).
    #[prost(message, optional, tag = "9")]
    pub source_code_info: Option<SourceCodeInfo>,
}

/// A message type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub field: Vec<FieldDescriptorProto>,
    #[prost(message, repeated, tag = "3")]
    pub nested_type: Vec<DescriptorProto>,
    #[prost(message, repeated, tag = "4")]
    pub enum_type: Vec<EnumDescriptorProto>,
    #[prost(message, optional, tag = "7")]
    pub options: Option<MessageOptions>,
    #[prost(message, repeated, tag = "8")]
    pub oneof_decl: Vec<OneofDescriptorProto>,
}

/// A field inside a message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "3")]
    pub number: Option<i32>,
    /// One of the `field_label` constants.
    #[prost(int32, optional, tag = "4")]
    pub label: Option<i32>,
    /// One of the `field_type` constants.
    #[prost(int32, optional, tag = "5")]
    pub r#type: Option<i32>,
    /// Fully-qualified type name for message/enum fields, with a leading dot.
    /// Backing field for the [`FieldDescriptorProto::type_name`] accessor,
    /// renamed so prost's derived getter does not collide with it.
    #[prost(string, optional, tag = "6")]
    pub type_name_raw: Option<String>,
    /// Raw `FieldOptions` payload. Kept as bytes so extension fields survive
    /// decoding; see the module docs.
    #[prost(bytes = "vec", optional, tag = "8")]
    pub options: Option<Vec<u8>>,
    #[prost(int32, optional, tag = "9")]
    pub oneof_index: Option<i32>,
    /// Backing field for the [`FieldDescriptorProto::json_name`] accessor,
    /// renamed so prost's derived getter does not collide with it.
    #[prost(string, optional, tag = "10")]
    pub json_name_raw: Option<String>,
    #[prost(bool, optional, tag = "17")]
    pub proto3_optional: Option<bool>,
}

/// Message options. Only `map_entry` is needed, to recognize the synthetic
/// entry messages behind map fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageOptions {
    #[prost(bool, optional, tag = "7")]
    pub map_entry: Option<bool>,
}

/// An enum type.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub value: Vec<EnumValueDescriptorProto>,
}

/// One named enum value.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumValueDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub number: Option<i32>,
}

/// A oneof declaration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OneofDescriptorProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
}

/// Source locations and comments for one file.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceCodeInfo {
    #[prost(message, repeated, tag = "1")]
    pub location: Vec<Location>,
}

/// One source location, keyed by its descriptor path (see the path encoding
/// documented in `descriptor.proto`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Location {
    #[prost(int32, repeated, tag = "1")]
    pub path: Vec<i32>,
    #[prost(string, optional, tag = "3")]
    pub leading_comments: Option<String>,
}

/// `FieldDescriptorProto.type` values.
pub mod field_type {
    pub const DOUBLE: i32 = 1;
    pub const FLOAT: i32 = 2;
    pub const INT64: i32 = 3;
    pub const UINT64: i32 = 4;
    pub const INT32: i32 = 5;
    pub const FIXED64: i32 = 6;
    pub const FIXED32: i32 = 7;
    pub const BOOL: i32 = 8;
    pub const STRING: i32 = 9;
    pub const GROUP: i32 = 10;
    pub const MESSAGE: i32 = 11;
    pub const BYTES: i32 = 12;
    pub const UINT32: i32 = 13;
    pub const ENUM: i32 = 14;
    pub const SFIXED32: i32 = 15;
    pub const SFIXED64: i32 = 16;
    pub const SINT32: i32 = 17;
    pub const SINT64: i32 = 18;
}

/// `FieldDescriptorProto.label` values.
pub mod field_label {
    pub const OPTIONAL: i32 = 1;
    pub const REQUIRED: i32 = 2;
    pub const REPEATED: i32 = 3;
}

impl DescriptorProto {
    /// True for the synthetic entry messages generated behind map fields.
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false)
    }

    /// Find a field by its proto field number.
    pub fn field_by_number(&self, number: i32) -> Option<&FieldDescriptorProto> {
        self.field.iter().find(|f| f.number() == number)
    }
}

impl FieldDescriptorProto {
    pub fn field_type(&self) -> i32 {
        self.r#type.unwrap_or(0)
    }

    /// Type name without the leading dot the descriptor format carries.
    pub fn type_name(&self) -> &str {
        let name = self.type_name_raw.as_deref().unwrap_or("");
        name.strip_prefix('.').unwrap_or(name)
    }

    pub fn is_repeated(&self) -> bool {
        self.label() == field_label::REPEATED
    }

    /// JSON name, computed from the proto name when the image omits it.
    pub fn json_name(&self) -> String {
        match self.json_name_raw.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => json_name_of(self.name()),
        }
    }
}

/// protoc's JSON name derivation: drop underscores, uppercase the letter
/// following each one.
fn json_name_of(proto_name: &str) -> String {
    let mut out = String::with_capacity(proto_name.len());
    let mut upper_next = false;
    for c in proto_name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
