use crate::types::BlockNumber;
use std::io;
use thiserror::Error;


pub type Result<T, E = Error> = std::result::Result<T, E>;


#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("block {height}: malformed logsBloom")]
    Format {
        height: BlockNumber,
        #[source]
        source: FormatError
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}


/// The compressed container or the JSON framing around the blocks is broken.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid gzip stream: {0}")]
    Gzip(io::Error),
    #[error("invalid JSON: {0}")]
    Json(serde_json::Error),
    #[error("expected a JSON array at the top level, found {}", describe(.found))]
    NotAnArray {
        found: u8
    },
    #[error("expected `,` or `]` after array element {index}, found {}", describe(.found))]
    UnexpectedToken {
        index: u64,
        found: u8
    },
    #[error("unexpected end of input inside the top-level array")]
    UnexpectedEof,
    #[error("unexpected {} after the end of the top-level array", describe(.found))]
    TrailingData {
        found: u8
    },
}


/// A single array element does not carry the fields a block needs.
///
/// `index` is the position of the element in the source array,
/// `height` is the already decoded block number.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("array element {index}: required field `{field}` is missing")]
    Missing {
        index: u64,
        field: &'static str
    },
    #[error("array element {index}: field `{field}` must be a string, found {found}")]
    WrongType {
        index: u64,
        field: &'static str,
        found: &'static str
    },
    #[error("array element {index}: field `{field}` has invalid value {value:?}")]
    InvalidValue {
        index: u64,
        field: &'static str,
        value: String
    },
    #[error("block {height}: logsBloom must have 512 hex digits, found {digits}")]
    BloomLength {
        height: BlockNumber,
        digits: usize
    },
    #[error("array element {index}: {reason}")]
    Malformed {
        index: u64,
        reason: String
    },
}


#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("hex string has odd length {0}")]
    OddLength(usize),
    #[error("invalid hex digit {ch:?} at offset {offset}")]
    InvalidDigit {
        ch: char,
        offset: usize
    },
}


fn describe(byte: &u8) -> String {
    if byte.is_ascii_graphic() {
        format!("`{}`", *byte as char)
    } else {
        format!("byte 0x{:02x}", byte)
    }
}
