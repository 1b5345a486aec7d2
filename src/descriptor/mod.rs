//! Compiled proto descriptor access
//!
//! The extractor consumes a serialized `google.protobuf.FileDescriptorSet`
//! image (a `buf build` / `protoc --descriptor_set_out` artifact) rather than
//! `.proto` source text. This module declares the raw descriptor structs the
//! image is decoded with and builds the name/comment index the walker
//! navigates.

pub mod index;
pub mod proto;

pub use index::{DescriptorIndex, TypeLoc};
pub use proto::{
    field_label, field_type, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet, Location, MessageOptions,
    OneofDescriptorProto, SourceCodeInfo,
};
