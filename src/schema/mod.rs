//! Schema IR types shared by both pipeline stages

mod types;

pub use types::{
    FieldSchema, MetadataSchema, ProtoFiles, ProviderSchema, Registry, RegistryEntry, SpecSchema,
    TypeSchema, TypeSpec, Validation,
};
