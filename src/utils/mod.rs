//! Naming utilities shared by both pipeline stages
//!
//! Proto field names are snake_case, IR field names are PascalCase, and the
//! generated Rust functions are snake_case again. These helpers perform the
//! conversions in one place so the three name spaces stay consistent.

/// Convert a snake_case proto field name to PascalCase.
///
/// `subnet_ids` becomes `SubnetIds`. Empty segments (leading, trailing or
/// doubled underscores) are skipped.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a PascalCase kind name to snake_case.
///
/// `AwsEksCluster` becomes `aws_eks_cluster`. Used for generated function
/// names in Stage 2 output.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// File name for a provider schema: the lowercased kind plus `.json`.
pub fn schema_file_name(kind: &str) -> String {
    format!("{}.json", kind.to_lowercase())
}
