//! Wire-level decoding of OpenMCF custom field options
//!
//! The OpenMCF protos attach cross-resource default metadata to fields via
//! custom `FieldOptions` extensions. Those extension definitions are not
//! compiled into this binary, so the values survive descriptor decoding only
//! as raw wire bytes (see `crate::descriptor::proto`). This module walks that
//! payload tag by tag and recovers the known extension values by field
//! number.
//!
//! Decoding is strictly best-effort: a malformed tag, a truncated payload or
//! a group wire type stops the walk and returns whatever was decoded up to
//! that point. Missing optional metadata is never fatal to a run.

use prost::bytes::Buf;
use prost::encoding::{decode_key, decode_varint, WireType};

// Extension field numbers on google.protobuf.FieldOptions.
//
// org/openmcf/shared/foreignkey/v1/foreign_key.proto
const FIELD_NUM_DEFAULT_KIND: u32 = 200001;
const FIELD_NUM_DEFAULT_KIND_FIELD_PATH: u32 = 200002;
// org/openmcf/shared/options/options.proto
const FIELD_NUM_DEFAULT: u32 = 60001;
const FIELD_NUM_RECOMMENDED_DEFAULT: u32 = 60002;

/// buf.validate.field extension number on google.protobuf.FieldOptions.
pub const FIELD_NUM_BUF_VALIDATE: u32 = 1159;

/// Custom option values extracted from a field's raw options payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct McfFieldOptions {
    /// Raw CloudResourceKind enum value (varint).
    pub default_kind_value: i32,
    /// Output field path for cross-resource references.
    pub default_kind_field_path: String,
    /// Default value for the field.
    pub default: String,
    /// Recommended default value.
    pub recommended_default: String,
}

/// Walk raw `FieldOptions` wire bytes and extract OpenMCF extension values
/// by field number.
pub fn decode_mcf_options(mut raw: &[u8]) -> McfFieldOptions {
    let mut result = McfFieldOptions::default();

    while !raw.is_empty() {
        let (number, wire_type) = match decode_key(&mut raw) {
            Ok(key) => key,
            Err(_) => return result,
        };

        match wire_type {
            WireType::Varint => {
                let value = match decode_varint(&mut raw) {
                    Ok(v) => v,
                    Err(_) => return result,
                };
                if number == FIELD_NUM_DEFAULT_KIND {
                    result.default_kind_value = value as i32;
                }
            }

            WireType::ThirtyTwoBit => {
                if raw.remaining() < 4 {
                    return result;
                }
                raw.advance(4);
            }

            WireType::SixtyFourBit => {
                if raw.remaining() < 8 {
                    return result;
                }
                raw.advance(8);
            }

            WireType::LengthDelimited => {
                let len = match decode_varint(&mut raw) {
                    Ok(v) => v,
                    Err(_) => return result,
                };
                if (raw.remaining() as u64) < len {
                    return result;
                }
                let (value, rest) = raw.split_at(len as usize);
                match number {
                    FIELD_NUM_DEFAULT_KIND_FIELD_PATH => {
                        result.default_kind_field_path =
                            String::from_utf8_lossy(value).into_owned();
                    }
                    FIELD_NUM_DEFAULT => {
                        result.default = String::from_utf8_lossy(value).into_owned();
                    }
                    FIELD_NUM_RECOMMENDED_DEFAULT => {
                        result.recommended_default = String::from_utf8_lossy(value).into_owned();
                    }
                    _ => {}
                }
                raw = rest;
            }

            // Groups cannot be skipped without tracking nesting; stop here.
            WireType::StartGroup | WireType::EndGroup => return result,
        }
    }

    result
}

/// Find the first length-delimited occurrence of `field` in an options
/// payload and return its bytes. Used to locate message-typed extensions
/// (notably `buf.validate.field`) for typed decoding.
pub fn extension_bytes(mut raw: &[u8], field: u32) -> Option<&[u8]> {
    while !raw.is_empty() {
        let (number, wire_type) = decode_key(&mut raw).ok()?;

        match wire_type {
            WireType::Varint => {
                decode_varint(&mut raw).ok()?;
            }
            WireType::ThirtyTwoBit => {
                if raw.remaining() < 4 {
                    return None;
                }
                raw.advance(4);
            }
            WireType::SixtyFourBit => {
                if raw.remaining() < 8 {
                    return None;
                }
                raw.advance(8);
            }
            WireType::LengthDelimited => {
                let len = decode_varint(&mut raw).ok()?;
                if (raw.remaining() as u64) < len {
                    return None;
                }
                let (value, rest) = raw.split_at(len as usize);
                if number == field {
                    return Some(value);
                }
                raw = rest;
            }
            WireType::StartGroup | WireType::EndGroup => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::encoding::{encode_key, encode_varint};

    fn encode_varint_field(buf: &mut Vec<u8>, number: u32, value: u64) {
        encode_key(number, WireType::Varint, buf);
        encode_varint(value, buf);
    }

    fn encode_bytes_field(buf: &mut Vec<u8>, number: u32, value: &[u8]) {
        encode_key(number, WireType::LengthDelimited, buf);
        encode_varint(value.len() as u64, buf);
        buf.extend_from_slice(value);
    }

    #[test]
    fn decodes_all_known_extensions() {
        let mut raw = Vec::new();
        encode_varint_field(&mut raw, 200001, 42);
        encode_bytes_field(&mut raw, 200002, b"status.outputs.vpc_id");
        encode_bytes_field(&mut raw, 60001, b"10.0.0.0/16");
        encode_bytes_field(&mut raw, 60002, b"t3.medium");

        let opts = decode_mcf_options(&raw);
        assert_eq!(opts.default_kind_value, 42);
        assert_eq!(opts.default_kind_field_path, "status.outputs.vpc_id");
        assert_eq!(opts.default, "10.0.0.0/16");
        assert_eq!(opts.recommended_default, "t3.medium");
    }

    #[test]
    fn skips_unrelated_fields() {
        let mut raw = Vec::new();
        // Unrelated varint, fixed32 and fixed64 fields before the one we want.
        encode_varint_field(&mut raw, 7, 99);
        encode_key(9, WireType::ThirtyTwoBit, &mut raw);
        raw.extend_from_slice(&[1, 2, 3, 4]);
        encode_key(10, WireType::SixtyFourBit, &mut raw);
        raw.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        encode_bytes_field(&mut raw, 60001, b"default-value");

        let opts = decode_mcf_options(&raw);
        assert_eq!(opts.default, "default-value");
        assert_eq!(opts.default_kind_value, 0);
    }

    #[test]
    fn truncated_varint_returns_partial_result() {
        let mut raw = Vec::new();
        encode_bytes_field(&mut raw, 60001, b"kept");
        // A valid tag followed by a truncated varint (continuation bit set,
        // no following byte).
        encode_key(200001, WireType::Varint, &mut raw);
        raw.push(0x80);

        let opts = decode_mcf_options(&raw);
        assert_eq!(opts.default, "kept");
        assert_eq!(opts.default_kind_value, 0);
    }

    #[test]
    fn truncated_length_prefix_returns_partial_result() {
        let mut raw = Vec::new();
        encode_varint_field(&mut raw, 200001, 5);
        encode_key(60001, WireType::LengthDelimited, &mut raw);
        encode_varint(100, &mut raw); // claims 100 bytes, none follow

        let opts = decode_mcf_options(&raw);
        assert_eq!(opts.default_kind_value, 5);
        assert_eq!(opts.default, "");
    }

    #[test]
    fn group_wire_type_stops_decoding() {
        let mut raw = Vec::new();
        encode_varint_field(&mut raw, 200001, 3);
        encode_key(11, WireType::StartGroup, &mut raw);
        encode_bytes_field(&mut raw, 60001, b"never-reached");

        let opts = decode_mcf_options(&raw);
        assert_eq!(opts.default_kind_value, 3);
        assert_eq!(opts.default, "");
    }

    #[test]
    fn empty_and_garbage_buffers_never_panic() {
        assert_eq!(decode_mcf_options(&[]), McfFieldOptions::default());
        assert_eq!(decode_mcf_options(&[0xff]), McfFieldOptions::default());
        assert_eq!(decode_mcf_options(&[0x00]), McfFieldOptions::default());
    }

    #[test]
    fn extension_bytes_finds_embedded_payload() {
        let mut raw = Vec::new();
        encode_varint_field(&mut raw, 3, 1);
        encode_bytes_field(&mut raw, FIELD_NUM_BUF_VALIDATE, b"\x08\x01");
        encode_bytes_field(&mut raw, 60001, b"after");

        assert_eq!(
            extension_bytes(&raw, FIELD_NUM_BUF_VALIDATE),
            Some(&b"\x08\x01"[..])
        );
        assert_eq!(extension_bytes(&raw, 60002), None);
    }
}
