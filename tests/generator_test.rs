//! End-to-end tests for the Stage 2 type generator
//!
//! Runs the extractor over the fixture image, writes the schema tree to
//! disk, and drives the generator over it the way the CLI does.

mod common;

use std::path::Path;

use openmcf_codegen::extract::SchemaExtractor;
use openmcf_codegen::generate::{GeneratorConfig, TypeGenerator};
use openmcf_codegen::output;

fn write_schema_tree(dir: &Path) {
    let index = common::fixture_index();
    let extractor = SchemaExtractor::new(&index).unwrap();

    let mut schemas: Vec<_> = extractor
        .discover_providers()
        .into_iter()
        .map(|(cloud, resource)| extractor.parse_provider(&cloud, &resource).unwrap())
        .collect();
    output::sort_schemas_by_kind(&mut schemas);

    for schema in &schemas {
        output::write_provider_schema(schema, dir).unwrap();
    }
    output::write_registry(&schemas, dir).unwrap();
    output::write_metadata_schema(&extractor.parse_metadata().unwrap(), dir).unwrap();
}

fn generate_into(schemas_dir: &Path, output_dir: &Path) {
    let generator = TypeGenerator::new(GeneratorConfig {
        schemas_dir: schemas_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        module: "crate::gen::cloudresource".to_string(),
    });
    let summary = generator.run().unwrap();
    assert_eq!(summary.providers, 2);
    assert_eq!(summary.clouds, 2);
}

#[test]
fn emits_one_module_per_cloud_plus_shared_files() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_schema_tree(schemas.path());
    generate_into(schemas.path(), out.path());

    for file in ["mod.rs", "support.rs", "registry.rs", "aws.rs", "test.rs"] {
        assert!(out.path().join(file).exists(), "{} missing", file);
    }

    let mod_rs = std::fs::read_to_string(out.path().join("mod.rs")).unwrap();
    assert!(mod_rs.contains("pub mod aws;"));
    assert!(mod_rs.contains("pub mod test;"));
    assert!(mod_rs.contains("pub mod registry;"));
    assert!(mod_rs.contains("pub mod support;"));
    assert!(mod_rs.contains("crate::gen::cloudresource"));
}

#[test]
fn registry_module_dispatches_every_kind() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_schema_tree(schemas.path());
    generate_into(schemas.path(), out.path());

    let registry = std::fs::read_to_string(out.path().join("registry.rs")).unwrap();
    assert!(registry.contains(
        "parsers.insert(\"AwsEksCluster\", aws::parse_aws_eks_cluster as ParserFn);"
    ));
    assert!(registry.contains("parsers.insert(\"Foo\", test::parse_foo as ParserFn);"));
    assert!(registry.contains("pub fn parser_for(kind: &str) -> Option<ParserFn>"));
}

#[test]
fn generated_parsers_open_code_the_rules() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_schema_tree(schemas.path());
    generate_into(schemas.path(), out.path());

    let test_rs = std::fs::read_to_string(out.path().join("test.rs")).unwrap();
    assert!(test_rs.contains("pub fn parse_foo(input: &Value) -> support::ParseResult {"));
    // name: required, minLength 3.
    assert!(test_rs.contains("min_length: Some(3)"));
    assert!(test_rs.contains("None => errors.push(support::FieldError::missing(&p)),"));
    // count: gt=0 arrives as the inclusive bound 1.
    assert!(test_rs.contains("support::check_int32(value, &p, Some(1), None, &mut errors)"));

    let aws_rs = std::fs::read_to_string(out.path().join("aws.rs")).unwrap();
    assert!(aws_rs.contains("pub fn parse_aws_eks_cluster(input: &Value) -> support::ParseResult {"));
    assert!(aws_rs.contains("fn check_aws_eks_cluster_node_group("));
    assert!(aws_rs.contains("support::check_items(items.len(), Some(2), None, &p, &mut errors);"));
    assert!(aws_rs.contains("support::check_unique(items, &p, &mut errors);"));
    assert!(aws_rs.contains("support::check_timestamp(value, &p, &mut errors)"));
    assert!(aws_rs.contains("support::check_enum(value, &p, &[\"DEV\", \"PROD\"], &mut errors)"));
    assert!(aws_rs.contains("support::check_oneof(\"connection\""));
}

#[test]
fn support_module_is_embedded_without_tests() {
    let schemas = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_schema_tree(schemas.path());
    generate_into(schemas.path(), out.path());

    let support = std::fs::read_to_string(out.path().join("support.rs")).unwrap();
    assert!(support.starts_with("// Code generated by generator"));
    assert!(support.contains("pub struct FieldError"));
    assert!(support.contains("pub type ParserFn"));
    assert!(!support.contains("#[cfg(test)]"));
}

#[test]
fn generation_is_byte_identical_across_runs() {
    let schemas = tempfile::tempdir().unwrap();
    write_schema_tree(schemas.path());

    let outs = [tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap()];
    for out in &outs {
        generate_into(schemas.path(), out.path());
    }

    for file in ["mod.rs", "support.rs", "registry.rs", "aws.rs", "test.rs"] {
        let a = std::fs::read(outs[0].path().join(file)).unwrap();
        let b = std::fs::read(outs[1].path().join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}
