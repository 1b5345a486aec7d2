//! Runtime support for generated cloud resource input parsers
//!
//! This module is embedded verbatim into Stage 2 output, so it must stay
//! self-contained: `serde_json`, `regex`, `chrono` and `base64` only, no
//! references back into the pipeline crate. Generated parsers call these
//! helpers with literal rule arguments; every helper records violations into
//! a shared error list so a parse reports all problems at once, not just the
//! first.
//!
//! Type mismatches return `None` (the value cannot be normalized); rule
//! violations are recorded but still return the normalized value so the
//! walk continues collecting errors elsewhere.

use std::fmt;

use serde_json::{Map, Number, Value};

/// One input validation violation, anchored to a field path like
/// `spec.nodePools[2].name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(path: &str) -> Self {
        Self::new(path, "required field is missing")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Result of one generated parser: the normalized spec value, or every
/// violation found.
pub type ParseResult = Result<Value, Vec<FieldError>>;

/// Signature of a generated parser, as stored in the kind registry.
pub type ParserFn = fn(&Value) -> ParseResult;

/// String rule arguments for [`check_string`]. Generated code fills only the
/// rules the schema carries.
#[derive(Debug, Default)]
pub struct StringChecks<'a> {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<&'a str>,
    pub one_of: &'a [&'a str],
    pub const_value: Option<&'a str>,
}

pub fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            errors.push(FieldError::new(path, "expected an object"));
            None
        }
    }
}

pub fn expect_array<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a Vec<Value>> {
    match value.as_array() {
        Some(items) => Some(items),
        None => {
            errors.push(FieldError::new(path, "expected an array"));
            None
        }
    }
}

/// Validate a string value against its rules.
pub fn check_string(
    value: &Value,
    path: &str,
    checks: &StringChecks<'_>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(s) = value.as_str() else {
        errors.push(FieldError::new(path, "expected a string"));
        return None;
    };

    let len = s.chars().count() as u64;
    if let Some(min) = checks.min_length {
        if len < min {
            errors.push(FieldError::new(
                path,
                format!("must be at least {} characters, got {}", min, len),
            ));
        }
    }
    if let Some(max) = checks.max_length {
        if len > max {
            errors.push(FieldError::new(
                path,
                format!("must be at most {} characters, got {}", max, len),
            ));
        }
    }
    if let Some(pattern) = checks.pattern {
        match regex::Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(s) {
                    errors.push(FieldError::new(
                        path,
                        format!("must match pattern {}", pattern),
                    ));
                }
            }
            Err(e) => {
                errors.push(FieldError::new(path, format!("invalid schema pattern: {}", e)));
            }
        }
    }
    if !checks.one_of.is_empty() && !checks.one_of.contains(&s) {
        errors.push(FieldError::new(
            path,
            format!("must be one of [{}]", checks.one_of.join(", ")),
        ));
    }
    if let Some(expected) = checks.const_value {
        if s != expected {
            errors.push(FieldError::new(path, format!("must be {}", expected)));
        }
    }

    Some(Value::String(s.to_string()))
}

/// Validate an enum value: a string that is one of the named values.
pub fn check_enum(
    value: &Value,
    path: &str,
    allowed: &[&str],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(s) = value.as_str() else {
        errors.push(FieldError::new(path, "expected a string"));
        return None;
    };
    if !allowed.contains(&s) {
        errors.push(FieldError::new(
            path,
            format!("must be one of [{}]", allowed.join(", ")),
        ));
    }
    Some(Value::String(s.to_string()))
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        // 64-bit integers travel as strings in proto JSON.
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

fn check_bounds(n: i64, min: Option<i64>, max: Option<i64>, path: &str, errors: &mut Vec<FieldError>) {
    if let Some(min) = min {
        if n < min {
            errors.push(FieldError::new(path, format!("must be at least {}", min)));
        }
    }
    if let Some(max) = max {
        if n > max {
            errors.push(FieldError::new(path, format!("must be at most {}", max)));
        }
    }
}

pub fn check_int32(
    value: &Value,
    path: &str,
    min: Option<i64>,
    max: Option<i64>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(n) = integer_of(value) else {
        errors.push(FieldError::new(path, "expected an integer"));
        return None;
    };
    if n < i64::from(i32::MIN) || n > i64::from(i32::MAX) {
        errors.push(FieldError::new(path, "out of range for int32"));
        return None;
    }
    check_bounds(n, min, max, path, errors);
    Some(Value::Number(Number::from(n)))
}

pub fn check_int64(
    value: &Value,
    path: &str,
    min: Option<i64>,
    max: Option<i64>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(n) = integer_of(value) else {
        errors.push(FieldError::new(path, "expected an integer"));
        return None;
    };
    check_bounds(n, min, max, path, errors);
    Some(Value::Number(Number::from(n)))
}

pub fn check_uint32(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    let Some(n) = n.filter(|n| *n <= u64::from(u32::MAX)) else {
        errors.push(FieldError::new(path, "expected an unsigned 32-bit integer"));
        return None;
    };
    Some(Value::Number(Number::from(n)))
}

pub fn check_uint64(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    let Some(n) = n else {
        errors.push(FieldError::new(path, "expected an unsigned integer"));
        return None;
    };
    Some(Value::Number(Number::from(n)))
}

pub fn check_number(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    if value.is_number() {
        Some(value.clone())
    } else {
        errors.push(FieldError::new(path, "expected a number"));
        None
    }
}

pub fn check_bool(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    match value.as_bool() {
        Some(b) => Some(Value::Bool(b)),
        None => {
            errors.push(FieldError::new(path, "expected a boolean"));
            None
        }
    }
}

/// Bytes fields travel as standard base64 strings.
pub fn check_bytes(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    use base64::Engine as _;

    let Some(s) = value.as_str() else {
        errors.push(FieldError::new(path, "expected a base64 string"));
        return None;
    };
    if base64::engine::general_purpose::STANDARD.decode(s).is_err() {
        errors.push(FieldError::new(path, "invalid base64"));
        return None;
    }
    Some(Value::String(s.to_string()))
}

/// Timestamp fields travel as RFC 3339 strings.
pub fn check_timestamp(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    let Some(s) = value.as_str() else {
        errors.push(FieldError::new(path, "expected an RFC 3339 timestamp string"));
        return None;
    };
    if chrono::DateTime::parse_from_rfc3339(s).is_err() {
        errors.push(FieldError::new(path, "invalid RFC 3339 timestamp"));
        return None;
    }
    Some(Value::String(s.to_string()))
}

/// Struct-typed fields accept any JSON object.
pub fn check_object(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    if value.is_object() {
        Some(value.clone())
    } else {
        errors.push(FieldError::new(path, "expected an object"));
        None
    }
}

/// Item/pair count rules shared by arrays and maps.
pub fn check_items(
    len: usize,
    min: Option<u64>,
    max: Option<u64>,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    let len = len as u64;
    if let Some(min) = min {
        if len < min {
            errors.push(FieldError::new(
                path,
                format!("must have at least {} items, got {}", min, len),
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            errors.push(FieldError::new(
                path,
                format!("must have at most {} items, got {}", max, len),
            ));
        }
    }
}

pub fn check_unique(items: &[Value], path: &str, errors: &mut Vec<FieldError>) {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            errors.push(FieldError::new(
                path,
                format!("items must be unique, duplicate at index {}", i),
            ));
        }
    }
}

/// Map keys always arrive as JSON strings; non-string proto key types must
/// still parse as their declared type.
pub fn check_map_key(key: &str, kind: &str, path: &str, errors: &mut Vec<FieldError>) {
    let ok = match kind {
        "int32" | "int64" => key.parse::<i64>().is_ok(),
        "uint32" | "uint64" => key.parse::<u64>().is_ok(),
        "bool" => key == "true" || key == "false",
        _ => true,
    };
    if !ok {
        errors.push(FieldError::new(
            path,
            format!("map key {:?} is not a valid {}", key, kind),
        ));
    }
}

/// Oneof exclusivity: at most one member of a group may be set.
pub fn check_oneof(
    group: &str,
    members: &[(&str, bool)],
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    let set: Vec<&str> = members
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
        .collect();
    if set.len() > 1 {
        let names: Vec<&str> = members.iter().map(|(name, _)| *name).collect();
        errors.push(FieldError::new(
            path,
            format!(
                "only one of [{}] may be set for {}, got [{}]",
                names.join(", "),
                group,
                set.join(", ")
            ),
        ));
    }
}

/// Reject keys that belong to no declared field.
pub fn check_unknown_keys(
    obj: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(FieldError::new(
                path,
                format!("unknown field {:?}", key),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_rules_report_all_violations() {
        let mut errors = Vec::new();
        let checks = StringChecks {
            min_length: Some(5),
            pattern: Some("^[a-z]+$"),
            ..StringChecks::default()
        };
        let out = check_string(&json!("Ab1"), "spec.name", &checks, &mut errors);
        assert_eq!(out, Some(json!("Ab1")));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.path == "spec.name"));
    }

    #[test]
    fn string_type_mismatch_yields_none() {
        let mut errors = Vec::new();
        let out = check_string(&json!(5), "spec.name", &StringChecks::default(), &mut errors);
        assert_eq!(out, None);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn enum_membership() {
        let mut errors = Vec::new();
        assert!(check_enum(&json!("DEV"), "spec.env", &["DEV", "PROD"], &mut errors).is_some());
        assert!(errors.is_empty());
        check_enum(&json!("QA"), "spec.env", &["DEV", "PROD"], &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn int32_bounds_and_range() {
        let mut errors = Vec::new();
        assert_eq!(
            check_int32(&json!(3), "spec.count", Some(1), Some(10), &mut errors),
            Some(json!(3))
        );
        assert!(errors.is_empty());

        check_int32(&json!(0), "spec.count", Some(1), None, &mut errors);
        assert_eq!(errors.len(), 1);

        assert_eq!(
            check_int32(&json!(5_000_000_000i64), "spec.count", None, None, &mut errors),
            None
        );
    }

    #[test]
    fn int64_accepts_decimal_strings() {
        let mut errors = Vec::new();
        assert_eq!(
            check_int64(&json!("9007199254740993"), "spec.big", None, None, &mut errors),
            Some(json!(9007199254740993i64))
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn uint_rejects_negatives() {
        let mut errors = Vec::new();
        assert_eq!(check_uint32(&json!(-1), "spec.port", &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            check_uint32(&json!(8080), "spec.port", &mut errors),
            Some(json!(8080))
        );
    }

    #[test]
    fn bytes_and_timestamp_parse() {
        let mut errors = Vec::new();
        assert!(check_bytes(&json!("aGVsbG8="), "spec.blob", &mut errors).is_some());
        assert!(check_bytes(&json!("not base64!!"), "spec.blob", &mut errors).is_none());
        assert!(
            check_timestamp(&json!("2024-07-01T12:00:00Z"), "spec.at", &mut errors).is_some()
        );
        assert!(check_timestamp(&json!("yesterday"), "spec.at", &mut errors).is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unique_items_flagged() {
        let mut errors = Vec::new();
        let items = vec![json!("a"), json!("b"), json!("a")];
        check_unique(&items, "spec.zones", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("index 2"));
    }

    #[test]
    fn item_counts() {
        let mut errors = Vec::new();
        check_items(0, Some(1), None, "spec.subnets", &mut errors);
        check_items(5, None, Some(3), "spec.subnets", &mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn map_keys_validate_by_kind() {
        let mut errors = Vec::new();
        check_map_key("8080", "int32", "spec.ports.8080", &mut errors);
        assert!(errors.is_empty());
        check_map_key("http", "int32", "spec.ports.http", &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn oneof_allows_at_most_one() {
        let mut errors = Vec::new();
        check_oneof(
            "connection",
            &[("vpcId", true), ("vpcRef", false)],
            "spec",
            &mut errors,
        );
        assert!(errors.is_empty());
        check_oneof(
            "connection",
            &[("vpcId", true), ("vpcRef", true)],
            "spec",
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_keys_rejected() {
        let mut errors = Vec::new();
        let obj = json!({"name": "x", "naem": "y"});
        check_unknown_keys(
            obj.as_object().unwrap(),
            &["name"],
            "spec",
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("naem"));
    }

    #[test]
    fn field_error_display() {
        let e = FieldError::missing("spec.name");
        assert_eq!(e.to_string(), "spec.name: required field is missing");
    }
}
