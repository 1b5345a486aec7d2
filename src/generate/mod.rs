//! Stage 2 type generator
//!
//! Consumes the schema tree written by Stage 1 and emits, per cloud
//! provider, a Rust module of input-parsing functions plus a kind dispatch
//! table. The `support` module is both compiled here (so its checks are
//! unit-tested) and embedded verbatim into the generated output.

mod emit;
pub mod loader;
pub mod support;

pub use emit::{
    render_cloud_module, render_mod, render_registry, render_support, GenerateSummary,
    GeneratorConfig, RegistryItem, TypeGenerator,
};
