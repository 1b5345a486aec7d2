//! Rust code emission for the Stage 2 generator
//!
//! Emits one module per cloud provider with a `parse_{kind}` function per
//! resource kind, a `check_{kind}_{type}` function per nested type, a kind
//! dispatch table, and the embedded runtime support module. Emission is
//! deterministic: clouds, kinds and nested types are rendered in sorted
//! order and two runs over the same schema tree produce byte-identical
//! files.

use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::generate::loader;
use crate::schema::{FieldSchema, ProviderSchema, TypeSchema, TypeSpec, Validation};
use crate::utils::to_snake_case;

const GENERATED_HEADER: &str =
    "// Code generated by generator from OpenMCF provider schemas. DO NOT EDIT.";

/// Configuration for the Stage 2 generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory holding the Stage 1 output (`providers/`, `shared/`).
    pub schemas_dir: PathBuf,
    /// Directory the generated module tree is written to.
    pub output_dir: PathBuf,
    /// Rust module path the tree is mounted at in the consuming crate.
    /// Recorded in the generated docs; the emitted code itself only uses
    /// `super::` paths and is relocatable.
    pub module: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schemas_dir: PathBuf::from("codegen/schemas"),
            output_dir: PathBuf::from("src/gen/cloudresource"),
            module: "crate::gen::cloudresource".to_string(),
        }
    }
}

/// One generated parser, for the dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryItem {
    pub kind: String,
    pub cloud: String,
    /// Function name, e.g. `parse_aws_eks_cluster`.
    pub func_name: String,
}

/// Counts reported after a generator run.
#[derive(Debug, Clone, Copy)]
pub struct GenerateSummary {
    pub providers: usize,
    pub clouds: usize,
}

/// Stage 2 generator: reads the schema tree and emits the parser modules.
pub struct TypeGenerator {
    config: GeneratorConfig,
}

impl TypeGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Load the registry and all provider schemas, then emit the generated
    /// module tree.
    pub fn run(&self) -> Result<GenerateSummary> {
        let registry_path = self
            .config
            .schemas_dir
            .join("providers")
            .join("registry.json");
        let registry = loader::load_registry(&registry_path)?;
        let groups = loader::group_by_cloud(&registry);

        let mut clouds: Vec<(String, Vec<ProviderSchema>)> = Vec::with_capacity(groups.len());
        for (cloud, entries) in &groups {
            let mut schemas = Vec::with_capacity(entries.len());
            for entry in entries {
                let path = self
                    .config
                    .schemas_dir
                    .join("providers")
                    .join(&entry.schema_file);
                schemas.push(loader::load_provider_schema(&path)?);
            }
            schemas.sort_by(|a, b| a.kind.cmp(&b.kind));
            clouds.push((cloud.clone(), schemas));
        }

        info!(
            "loaded {} providers across {} cloud platforms",
            registry.providers.len(),
            clouds.len()
        );

        std::fs::create_dir_all(&self.config.output_dir)?;

        let cloud_names: Vec<&str> = clouds.iter().map(|(c, _)| c.as_str()).collect();
        let mut items = Vec::new();
        for (cloud, schemas) in &clouds {
            let (content, cloud_items) = render_cloud_module(cloud, schemas);
            let file = format!("{}.rs", cloud_mod(cloud));
            std::fs::write(self.config.output_dir.join(file), content)?;
            items.extend(cloud_items);
        }
        items.sort_by(|a, b| a.kind.cmp(&b.kind));

        std::fs::write(
            self.config.output_dir.join("registry.rs"),
            render_registry(&cloud_names, &items),
        )?;
        std::fs::write(self.config.output_dir.join("support.rs"), render_support())?;
        std::fs::write(
            self.config.output_dir.join("mod.rs"),
            render_mod(&self.config.module, &cloud_names),
        )?;

        info!(
            "generated {} provider input types + registry in {}",
            items.len(),
            self.config.output_dir.display()
        );

        Ok(GenerateSummary {
            providers: items.len(),
            clouds: clouds.len(),
        })
    }
}

/// Rust module name for a cloud provider slug (`digital-ocean` ->
/// `digital_ocean`).
fn cloud_mod(cloud: &str) -> String {
    cloud.replace('-', "_")
}

fn line(out: &mut String, indent: usize, text: &str) {
    for _ in 0..indent {
        out.push_str("    ");
    }
    out.push_str(text);
    out.push('\n');
}

fn blank(out: &mut String) {
    out.push('\n');
}

fn quoted(s: &str) -> String {
    format!("{:?}", s)
}

fn opt_u64(value: Option<u64>) -> String {
    match value {
        Some(n) => format!("Some({})", n),
        None => "None".to_string(),
    }
}

fn opt_i64(value: Option<i64>) -> String {
    match value {
        Some(n) => format!("Some({})", n),
        None => "None".to_string(),
    }
}

/// Render one cloud provider module with all its parse and check functions.
pub fn render_cloud_module(cloud: &str, schemas: &[ProviderSchema]) -> (String, Vec<RegistryItem>) {
    let mut out = String::new();
    line(&mut out, 0, GENERATED_HEADER);
    blank(&mut out);
    line(
        &mut out,
        0,
        &format!("//! Input parsers for {} cloud resources.", cloud),
    );
    blank(&mut out);
    line(&mut out, 0, "use serde_json::{Map, Value};");
    blank(&mut out);
    line(&mut out, 0, "use super::support;");

    let mut items = Vec::with_capacity(schemas.len());
    for schema in schemas {
        let kind_snake = to_snake_case(&schema.kind);
        let func_name = format!("parse_{}", kind_snake);

        blank(&mut out);
        render_parse_fn(&mut out, schema, &func_name);

        for nested in &schema.nested_types {
            blank(&mut out);
            render_check_fn(&mut out, &kind_snake, nested);
        }

        items.push(RegistryItem {
            kind: schema.kind.clone(),
            cloud: cloud.to_string(),
            func_name,
        });
    }

    (out, items)
}

fn render_parse_fn(out: &mut String, schema: &ProviderSchema, func_name: &str) {
    let kind_snake = to_snake_case(&schema.kind);

    line(
        out,
        0,
        &format!(
            "/// Validate and normalize input for the `{}` spec.",
            schema.kind
        ),
    );
    line(
        out,
        0,
        &format!(
            "pub fn {}(input: &Value) -> support::ParseResult {{",
            func_name
        ),
    );
    line(out, 1, "let mut errors = Vec::new();");
    line(out, 1, "let path = \"spec\";");
    line(
        out,
        1,
        "let Some(obj) = support::expect_object(input, path, &mut errors) else {",
    );
    line(out, 2, "return Err(errors);");
    line(out, 1, "};");
    line(out, 1, "let mut out = Map::new();");
    render_unknown_keys(out, &schema.spec.fields, 1, "&mut errors");

    for field in &schema.spec.fields {
        blank(out);
        render_field(out, field, &kind_snake, 1, "&mut errors");
    }
    render_oneofs(out, &schema.spec.fields, 1, "&mut errors");

    blank(out);
    line(out, 1, "if errors.is_empty() {");
    line(out, 2, "Ok(Value::Object(out))");
    line(out, 1, "} else {");
    line(out, 2, "Err(errors)");
    line(out, 1, "}");
    line(out, 0, "}");
}

fn render_check_fn(out: &mut String, kind_snake: &str, nested: &TypeSchema) {
    let func_name = format!("check_{}_{}", kind_snake, to_snake_case(&nested.name));

    line(out, 0, &format!("fn {}(", func_name));
    line(out, 1, "value: &Value,");
    line(out, 1, "path: &str,");
    line(out, 1, "errors: &mut Vec<support::FieldError>,");
    line(out, 0, ") -> Option<Value> {");
    line(out, 1, "let obj = support::expect_object(value, path, errors)?;");
    line(out, 1, "let mut out = Map::new();");
    render_unknown_keys(out, &nested.fields, 1, "errors");

    for field in &nested.fields {
        blank(out);
        render_field(out, field, kind_snake, 1, "errors");
    }
    render_oneofs(out, &nested.fields, 1, "errors");

    blank(out);
    line(out, 1, "Some(Value::Object(out))");
    line(out, 0, "}");
}

fn render_unknown_keys(out: &mut String, fields: &[FieldSchema], indent: usize, errors: &str) {
    let mut allowed: Vec<&str> = fields
        .iter()
        .flat_map(|f| [f.json_name.as_str(), f.proto_field.as_str()])
        .collect();
    allowed.sort_unstable();
    allowed.dedup();
    let list = allowed
        .iter()
        .map(|k| quoted(k))
        .collect::<Vec<_>>()
        .join(", ");
    line(
        out,
        indent,
        &format!(
            "support::check_unknown_keys(obj, &[{}], path, {});",
            list, errors
        ),
    );
}

fn render_oneofs(out: &mut String, fields: &[FieldSchema], indent: usize, errors: &str) {
    let mut groups: Vec<&str> = Vec::new();
    for field in fields {
        if !field.oneof_group.is_empty() && !groups.contains(&field.oneof_group.as_str()) {
            groups.push(&field.oneof_group);
        }
    }

    for group in groups {
        let members = fields
            .iter()
            .filter(|f| f.oneof_group == group)
            .map(|f| format!("({}, {})", quoted(&f.json_name), presence_expr(f)))
            .collect::<Vec<_>>()
            .join(", ");
        blank(out);
        line(
            out,
            indent,
            &format!(
                "support::check_oneof({}, &[{}], path, {});",
                quoted(group),
                members,
                errors
            ),
        );
    }
}

fn presence_expr(field: &FieldSchema) -> String {
    if field.json_name == field.proto_field {
        format!("obj.contains_key({})", quoted(&field.json_name))
    } else {
        format!(
            "obj.contains_key({}) || obj.contains_key({})",
            quoted(&field.json_name),
            quoted(&field.proto_field)
        )
    }
}

fn lookup_expr(field: &FieldSchema) -> String {
    if field.json_name == field.proto_field {
        format!("obj.get({})", quoted(&field.json_name))
    } else {
        format!(
            "obj.get({}).or_else(|| obj.get({}))",
            quoted(&field.json_name),
            quoted(&field.proto_field)
        )
    }
}

fn render_field(
    out: &mut String,
    field: &FieldSchema,
    kind_snake: &str,
    indent: usize,
    errors: &str,
) {
    line(out, indent, &format!("// {}", field.proto_field));
    if field.required {
        line(out, indent, "{");
        line(
            out,
            indent + 1,
            &format!(
                "let p = format!(\"{{}}.{{}}\", path, {});",
                quoted(&field.json_name)
            ),
        );
        line(out, indent + 1, &format!("match {} {{", lookup_expr(field)));
        line(out, indent + 2, "Some(value) => {");
        render_field_value(out, field, kind_snake, indent + 3, errors);
        line(out, indent + 2, "}");
        line(
            out,
            indent + 2,
            "None => errors.push(support::FieldError::missing(&p)),",
        );
        line(out, indent + 1, "}");
        line(out, indent, "}");
    } else {
        line(
            out,
            indent,
            &format!("if let Some(value) = {} {{", lookup_expr(field)),
        );
        line(
            out,
            indent + 1,
            &format!(
                "let p = format!(\"{{}}.{{}}\", path, {});",
                quoted(&field.json_name)
            ),
        );
        render_field_value(out, field, kind_snake, indent + 1, errors);
        line(out, indent, "}");
    }
}

/// Statements consuming `value` (with path `p`) and inserting the normalized
/// result into `out`.
fn render_field_value(
    out: &mut String,
    field: &FieldSchema,
    kind_snake: &str,
    indent: usize,
    errors: &str,
) {
    let validation = field.validation.as_ref();
    let insert_key = quoted(&field.json_name);

    match field.r#type.kind.as_str() {
        "array" => {
            let element = field
                .r#type
                .element_type
                .as_deref()
                .cloned()
                .unwrap_or_else(|| TypeSpec::scalar("string"));
            line(
                out,
                indent,
                &format!(
                    "if let Some(items) = support::expect_array(value, &p, {}) {{",
                    errors
                ),
            );
            render_items_rules(out, validation, "items.len()", indent + 1, errors);
            if validation.map_or(false, |v| v.unique) {
                line(
                    out,
                    indent + 1,
                    &format!("support::check_unique(items, &p, {});", errors),
                );
            }
            line(
                out,
                indent + 1,
                "let mut normalized = Vec::with_capacity(items.len());",
            );
            line(
                out,
                indent + 1,
                "for (i, item) in items.iter().enumerate() {",
            );
            line(
                out,
                indent + 2,
                "let ip = format!(\"{}[{}]\", p, i);",
            );
            line(
                out,
                indent + 2,
                &format!(
                    "if let Some(v) = {} {{",
                    value_check_expr(&element, None, kind_snake, "item", "&ip", errors)
                ),
            );
            line(out, indent + 3, "normalized.push(v);");
            line(out, indent + 2, "}");
            line(out, indent + 1, "}");
            line(
                out,
                indent + 1,
                &format!("out.insert({}.to_string(), Value::Array(normalized));", insert_key),
            );
            line(out, indent, "}");
        }

        "map" => {
            let key_kind = field
                .r#type
                .key_type
                .as_deref()
                .map(|t| t.kind.clone())
                .unwrap_or_else(|| "string".to_string());
            let value_type = field
                .r#type
                .value_type
                .as_deref()
                .cloned()
                .unwrap_or_else(|| TypeSpec::scalar("string"));
            line(
                out,
                indent,
                &format!(
                    "if let Some(entries) = support::expect_object(value, &p, {}) {{",
                    errors
                ),
            );
            render_items_rules(out, validation, "entries.len()", indent + 1, errors);
            line(out, indent + 1, "let mut normalized = Map::new();");
            line(out, indent + 1, "for (key, item) in entries {");
            line(
                out,
                indent + 2,
                "let ip = format!(\"{}.{}\", p, key);",
            );
            if key_kind != "string" {
                line(
                    out,
                    indent + 2,
                    &format!(
                        "support::check_map_key(key, {}, &ip, {});",
                        quoted(&key_kind),
                        errors
                    ),
                );
            }
            line(
                out,
                indent + 2,
                &format!(
                    "if let Some(v) = {} {{",
                    value_check_expr(&value_type, None, kind_snake, "item", "&ip", errors)
                ),
            );
            line(out, indent + 3, "normalized.insert(key.clone(), v);");
            line(out, indent + 2, "}");
            line(out, indent + 1, "}");
            line(
                out,
                indent + 1,
                &format!(
                    "out.insert({}.to_string(), Value::Object(normalized));",
                    insert_key
                ),
            );
            line(out, indent, "}");
        }

        _ => {
            line(
                out,
                indent,
                &format!(
                    "if let Some(v) = {} {{",
                    value_check_expr(&field.r#type, validation, kind_snake, "value", "&p", errors)
                ),
            );
            line(
                out,
                indent + 1,
                &format!("out.insert({}.to_string(), v);", insert_key),
            );
            line(out, indent, "}");
        }
    }
}

fn render_items_rules(
    out: &mut String,
    validation: Option<&Validation>,
    len_expr: &str,
    indent: usize,
    errors: &str,
) {
    let (min, max) = match validation {
        Some(v) => (v.min_items, v.max_items),
        None => (None, None),
    };
    if min.is_some() || max.is_some() {
        line(
            out,
            indent,
            &format!(
                "support::check_items({}, {}, {}, &p, {});",
                len_expr,
                opt_u64(min),
                opt_u64(max),
                errors
            ),
        );
    }
}

/// Expression of type `Option<Value>` validating `value_ident` at
/// `path_expr` and producing the normalized value.
fn value_check_expr(
    spec: &TypeSpec,
    validation: Option<&Validation>,
    kind_snake: &str,
    value_ident: &str,
    path_expr: &str,
    errors: &str,
) -> String {
    match spec.kind.as_str() {
        "string" => format!(
            "support::check_string({}, {}, {}, {})",
            value_ident,
            path_expr,
            string_checks_literal(validation),
            errors
        ),
        "int32" => format!(
            "support::check_int32({}, {}, {}, {}, {})",
            value_ident,
            path_expr,
            opt_i64(validation.and_then(|v| v.min)),
            opt_i64(validation.and_then(|v| v.max)),
            errors
        ),
        "int64" => format!(
            "support::check_int64({}, {}, {}, {}, {})",
            value_ident,
            path_expr,
            opt_i64(validation.and_then(|v| v.min)),
            opt_i64(validation.and_then(|v| v.max)),
            errors
        ),
        "uint32" => format!(
            "support::check_uint32({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "uint64" => format!(
            "support::check_uint64({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "bool" => format!(
            "support::check_bool({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "float" | "double" => format!(
            "support::check_number({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "bytes" => format!(
            "support::check_bytes({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "timestamp" => format!(
            "support::check_timestamp({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "object" => format!(
            "support::check_object({}, {}, {})",
            value_ident, path_expr, errors
        ),
        "enum" => {
            let values = spec
                .enum_values
                .iter()
                .map(|v| quoted(v))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "support::check_enum({}, {}, &[{}], {})",
                value_ident, path_expr, values, errors
            )
        }
        "message" => format!(
            "check_{}_{}({}, {}, {})",
            kind_snake,
            to_snake_case(&spec.message_type),
            value_ident,
            path_expr,
            errors
        ),
        // Collapsed well-known types without dedicated checks pass through.
        _ => format!("Some({}.clone())", value_ident),
    }
}

fn string_checks_literal(validation: Option<&Validation>) -> String {
    let Some(v) = validation else {
        return "&support::StringChecks::default()".to_string();
    };

    let mut parts = Vec::new();
    if let Some(n) = v.min_length {
        parts.push(format!("min_length: Some({})", n));
    }
    if let Some(n) = v.max_length {
        parts.push(format!("max_length: Some({})", n));
    }
    if !v.pattern.is_empty() {
        parts.push(format!("pattern: Some({})", quoted(&v.pattern)));
    }
    if !v.r#enum.is_empty() {
        let values = v
            .r#enum
            .iter()
            .map(|s| quoted(s))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("one_of: &[{}]", values));
    }
    if !v.r#const.is_empty() {
        parts.push(format!("const_value: Some({})", quoted(&v.r#const)));
    }

    if parts.is_empty() {
        "&support::StringChecks::default()".to_string()
    } else {
        format!(
            "&support::StringChecks {{ {}, ..Default::default() }}",
            parts.join(", ")
        )
    }
}

/// Render the kind dispatch table module.
pub fn render_registry(clouds: &[&str], items: &[RegistryItem]) -> String {
    let mut out = String::new();
    line(&mut out, 0, GENERATED_HEADER);
    blank(&mut out);
    line(
        &mut out,
        0,
        "//! Kind-name dispatch table for generated cloud resource parsers.",
    );
    blank(&mut out);
    line(&mut out, 0, "use std::collections::HashMap;");
    blank(&mut out);
    line(&mut out, 0, "use once_cell::sync::Lazy;");
    blank(&mut out);
    line(&mut out, 0, "use super::support::ParserFn;");
    if !clouds.is_empty() {
        let modules = clouds
            .iter()
            .map(|c| cloud_mod(c))
            .collect::<Vec<_>>()
            .join(", ");
        line(&mut out, 0, &format!("use super::{{{}}};", modules));
    }
    blank(&mut out);
    line(
        &mut out,
        0,
        "/// All generated parsers keyed by resource kind.",
    );
    line(
        &mut out,
        0,
        "pub static PARSERS: Lazy<HashMap<&'static str, ParserFn>> = Lazy::new(|| {",
    );
    line(
        &mut out,
        1,
        &format!(
            "let mut parsers: HashMap<&'static str, ParserFn> = HashMap::with_capacity({});",
            items.len()
        ),
    );
    for item in items {
        line(
            &mut out,
            1,
            &format!(
                "parsers.insert({}, {}::{} as ParserFn);",
                quoted(&item.kind),
                cloud_mod(&item.cloud),
                item.func_name
            ),
        );
    }
    line(&mut out, 1, "parsers");
    line(&mut out, 0, "});");
    blank(&mut out);
    line(&mut out, 0, "/// Look up the parser for a kind name.");
    line(
        &mut out,
        0,
        "pub fn parser_for(kind: &str) -> Option<ParserFn> {",
    );
    line(&mut out, 1, "PARSERS.get(kind).copied()");
    line(&mut out, 0, "}");
    blank(&mut out);
    line(&mut out, 0, "/// All registered kind names, sorted.");
    line(&mut out, 0, "pub fn kinds() -> Vec<&'static str> {");
    line(
        &mut out,
        1,
        "let mut kinds: Vec<&'static str> = PARSERS.keys().copied().collect();",
    );
    line(&mut out, 1, "kinds.sort_unstable();");
    line(&mut out, 1, "kinds");
    line(&mut out, 0, "}");
    out
}

/// Render the generated tree's `mod.rs`.
pub fn render_mod(module: &str, clouds: &[&str]) -> String {
    let mut out = String::new();
    line(&mut out, 0, GENERATED_HEADER);
    blank(&mut out);
    line(
        &mut out,
        0,
        "//! Generated input parsers for OpenMCF cloud resources.",
    );
    line(&mut out, 0, "//!");
    line(
        &mut out,
        0,
        &format!("//! Mount this tree at `{}` in the consuming crate. Parsers", module),
    );
    line(
        &mut out,
        0,
        "//! validate untyped tool-call input against the provider schemas and",
    );
    line(
        &mut out,
        0,
        "//! dispatch by kind via [`registry::parser_for`].",
    );
    blank(&mut out);
    for cloud in clouds {
        line(&mut out, 0, &format!("pub mod {};", cloud_mod(cloud)));
    }
    line(&mut out, 0, "pub mod registry;");
    line(&mut out, 0, "pub mod support;");
    out
}

/// Render the embedded runtime support module, stripped of its in-crate
/// test module.
pub fn render_support() -> String {
    let src = include_str!("support.rs");
    let body = match src.find("#[cfg(test)]") {
        Some(i) => src[..i].trim_end(),
        None => src.trim_end(),
    };
    format!("{}\n\n{}\n", GENERATED_HEADER, body)
}
