//! Extraction of `buf.validate` rules from field options
//!
//! The rules arrive inside the `buf.validate.field` extension (field 1159 on
//! `FieldOptions`), located in the raw options payload by the wire decoder
//! and then decoded with the hand-declared rule structs below. Only the rule
//! families the IR consumes are declared; tags follow the protovalidate
//! sources.

use prost::Message;
use tracing::warn;

use crate::descriptor::proto::{field_label, FieldDescriptorProto};
use crate::extract::options::{extension_bytes, FIELD_NUM_BUF_VALIDATE};
use crate::schema::Validation;

/// Subset of `buf.validate.FieldRules`.
///
/// All members are declared `optional` so rule presence survives decoding;
/// protovalidate keeps its numeric bounds in oneofs, which means an explicit
/// `gt = 0` is distinguishable from "no rule" on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldRules {
    #[prost(message, optional, tag = "3")]
    pub int32: Option<Int32Rules>,
    #[prost(message, optional, tag = "4")]
    pub int64: Option<Int64Rules>,
    #[prost(message, optional, tag = "14")]
    pub string: Option<StringRules>,
    #[prost(message, optional, tag = "18")]
    pub repeated: Option<RepeatedRules>,
    #[prost(message, optional, tag = "19")]
    pub map: Option<MapRules>,
    #[prost(bool, optional, tag = "25")]
    pub required: Option<bool>,
}

/// Subset of `buf.validate.StringRules`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringRules {
    #[prost(string, optional, tag = "1")]
    pub r#const: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub min_len: Option<u64>,
    #[prost(uint64, optional, tag = "3")]
    pub max_len: Option<u64>,
    #[prost(string, optional, tag = "6")]
    pub pattern: Option<String>,
    #[prost(string, repeated, tag = "10")]
    pub r#in: Vec<String>,
}

/// Subset of `buf.validate.Int32Rules`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int32Rules {
    #[prost(int32, optional, tag = "2")]
    pub lt: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub lte: Option<i32>,
    #[prost(int32, optional, tag = "4")]
    pub gt: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub gte: Option<i32>,
}

/// Subset of `buf.validate.Int64Rules`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int64Rules {
    #[prost(int64, optional, tag = "2")]
    pub lt: Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub lte: Option<i64>,
    #[prost(int64, optional, tag = "4")]
    pub gt: Option<i64>,
    #[prost(int64, optional, tag = "5")]
    pub gte: Option<i64>,
}

/// Subset of `buf.validate.RepeatedRules`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RepeatedRules {
    #[prost(uint64, optional, tag = "1")]
    pub min_items: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub max_items: Option<u64>,
    #[prost(bool, optional, tag = "3")]
    pub unique: Option<bool>,
}

/// Subset of `buf.validate.MapRules`. Pair counts map onto the same
/// `minItems`/`maxItems` IR members as repeated item counts.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MapRules {
    #[prost(uint64, optional, tag = "1")]
    pub min_pairs: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub max_pairs: Option<u64>,
}

/// Decode the validation rules from a field's raw options payload.
pub fn decode_field_rules(field: &FieldDescriptorProto) -> Option<FieldRules> {
    let raw = field.options.as_deref()?;
    let bytes = extension_bytes(raw, FIELD_NUM_BUF_VALIDATE)?;
    match FieldRules::decode(bytes) {
        Ok(rules) => Some(rules),
        Err(e) => {
            warn!(
                "undecodable buf.validate rules on field {}: {}",
                field.name(),
                e
            );
            None
        }
    }
}

/// Translate a field's validation annotations into the IR `Validation`.
///
/// Returns `None` when no recognized rule is present: absence of rules is
/// represented as absence of the struct, never as an all-defaults value.
pub fn extract_validation(field: &FieldDescriptorProto) -> Option<Validation> {
    let rules = decode_field_rules(field)?;
    let mut v = Validation::default();

    if rules.required.unwrap_or(false) {
        v.required = true;
    }

    if let Some(sr) = &rules.string {
        if let Some(c) = sr.r#const.as_deref().filter(|c| !c.is_empty()) {
            v.r#const = c.to_string();
        }
        if let Some(n) = sr.min_len.filter(|n| *n > 0) {
            v.min_length = Some(n);
        }
        if let Some(n) = sr.max_len.filter(|n| *n > 0) {
            v.max_length = Some(n);
        }
        if let Some(p) = sr.pattern.as_deref().filter(|p| !p.is_empty()) {
            v.pattern = p.to_string();
        }
        if !sr.r#in.is_empty() {
            v.r#enum = sr.r#in.clone();
        }
    }

    if let Some(ir) = &rules.int32 {
        apply_int_bounds(
            &mut v,
            ir.gte.map(i64::from),
            ir.lte.map(i64::from),
            ir.gt.map(i64::from),
            ir.lt.map(i64::from),
        );
    }

    if let Some(ir) = &rules.int64 {
        apply_int_bounds(&mut v, ir.gte, ir.lte, ir.gt, ir.lt);
    }

    if let Some(rr) = &rules.repeated {
        if let Some(n) = rr.min_items.filter(|n| *n > 0) {
            v.min_items = Some(n);
        }
        if let Some(n) = rr.max_items.filter(|n| *n > 0) {
            v.max_items = Some(n);
        }
        if rr.unique.unwrap_or(false) {
            v.unique = true;
        }
    }

    if let Some(mr) = &rules.map {
        if let Some(n) = mr.min_pairs.filter(|n| *n > 0) {
            v.min_items = Some(n);
        }
        if let Some(n) = mr.max_pairs.filter(|n| *n > 0) {
            v.max_items = Some(n);
        }
    }

    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

/// Store numeric bounds as inclusive values. Exclusive `gt`/`lt` rules are
/// normalized by one; the conversion is exact (`gt = 5` stores `min = 6`).
fn apply_int_bounds(
    v: &mut Validation,
    gte: Option<i64>,
    lte: Option<i64>,
    gt: Option<i64>,
    lt: Option<i64>,
) {
    if let Some(n) = gte {
        v.min = Some(n);
    }
    if let Some(n) = lte {
        v.max = Some(n);
    }
    if let Some(n) = gt {
        v.min = Some(n + 1);
    }
    if let Some(n) = lt {
        v.max = Some(n - 1);
    }
}

/// Extract a `buf.validate` string const value from a field. Used to read
/// the `api_version` and `kind` constants from the designated API message.
pub fn extract_string_const(field: &FieldDescriptorProto) -> String {
    decode_field_rules(field)
        .and_then(|rules| rules.string)
        .and_then(|sr| sr.r#const)
        .unwrap_or_default()
}

/// Reconcile wire-level `required` with the decoded rule. The rule is the
/// single source of truth; a proto2 `required` label without a matching rule
/// indicates an inconsistent descriptor and is surfaced as a warning.
pub fn reconcile_required(field: &FieldDescriptorProto, validation: Option<&Validation>) -> bool {
    let rule_required = validation.map_or(false, |v| v.required);
    if field.label() == field_label::REQUIRED && !rule_required {
        warn!(
            "field {} is declared required but carries no required rule",
            field.name()
        );
    }
    rule_required
}
