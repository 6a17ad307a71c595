use crate::error::{Error, FieldError};
use crate::hex::{decode_hex, encode_hex, popcount, strip_hex_prefix};
use crate::types::{decode_quantity, parse_quantity, BlockNumber, HexBytes, Quantity, Timestamp};
use serde::Deserialize;
use serde_json::Value;


/// Size of the `logsBloom` filter in bytes (2048 bits)
pub const BLOOM_SIZE: usize = 256;


#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LogsBloom([u8; BLOOM_SIZE]);


impl LogsBloom {
    pub const fn new(bytes: [u8; BLOOM_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses a `0x`-prefixed string of exactly 512 hex digits.
    pub fn parse(s: &str, height: BlockNumber) -> Result<Self, Error> {
        let digits = strip_hex_prefix(s);
        if digits.len() != BLOOM_SIZE * 2 {
            return Err(FieldError::BloomLength { height, digits: digits.len() }.into())
        }

        let bytes = decode_hex(digits).map_err(|source| Error::Format { height, source })?;

        let bytes: [u8; BLOOM_SIZE] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            FieldError::BloomLength { height, digits: bytes.len() * 2 }
        })?;

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; BLOOM_SIZE] {
        &self.0
    }

    pub fn count_ones(&self) -> u64 {
        popcount(&self.0)
    }
}


impl Default for LogsBloom {
    fn default() -> Self {
        Self([0; BLOOM_SIZE])
    }
}


impl std::fmt::Debug for LogsBloom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: BlockNumber,
    pub timestamp: Timestamp,
    pub logs_bloom: LogsBloom,
}


/// Array element as it comes out of the JSON reader.
///
/// Only the fields the pipelines need are kept, everything else
/// is skipped by the deserializer without being materialized.
/// JSON `null` is treated the same as a missing field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub number: Option<Value>,
    pub timestamp: Option<Value>,
    pub logs_bloom: Option<Value>,
}


impl Block {
    /// Validates the required fields of the array element at `index`.
    pub fn from_raw(raw: RawBlock, index: u64) -> Result<Self, Error> {
        let number = quantity_field(raw.number.as_ref(), "number", index)?;
        let timestamp = quantity_field(raw.timestamp.as_ref(), "timestamp", index)?;
        let logs_bloom = string_field(raw.logs_bloom.as_ref(), "logsBloom", index)?;
        Ok(Self {
            number,
            timestamp,
            logs_bloom: LogsBloom::parse(logs_bloom, number)?
        })
    }
}


fn string_field<'a>(
    value: Option<&'a Value>,
    field: &'static str,
    index: u64
) -> Result<&'a str, FieldError>
{
    match value {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(FieldError::WrongType {
            index,
            field,
            found: json_type(other)
        }),
        None => Err(FieldError::Missing { index, field })
    }
}


fn quantity_field<T: Quantity>(
    value: Option<&Value>,
    field: &'static str,
    index: u64
) -> Result<T, FieldError>
{
    let s = string_field(value, field, index)?;
    parse_quantity(s).ok_or_else(|| FieldError::InvalidValue {
        index,
        field,
        value: s.to_string()
    })
}


fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}


/// Transaction log entry.
///
/// Not consumed by the filter pipelines yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: HexBytes,
    pub topics: Vec<HexBytes>,
    #[serde(deserialize_with = "decode_quantity")]
    pub log_index: u32,
}
