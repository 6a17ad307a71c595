use crate::error::FormatError;


pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}


/// Decodes a hex string, with or without the `0x` prefix.
///
/// Digits are case-insensitive.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, FormatError> {
    let digits = strip_hex_prefix(s);
    let mut bytes = vec![0; digits.len() / 2];

    if digits.len() % 2 == 0 && faster_hex::hex_decode(digits.as_bytes(), &mut bytes).is_ok() {
        return Ok(bytes)
    }

    let invalid = digits.char_indices().find(|(_, ch)| !ch.is_ascii_hexdigit());
    Err(match invalid {
        Some((offset, ch)) => FormatError::InvalidDigit { ch, offset },
        None => FormatError::OddLength(digits.len())
    })
}


pub fn encode_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 + bytes.len() * 2);
    s.push_str("0x");
    s.push_str(&faster_hex::hex_string(bytes));
    s
}


/// Number of bits set to 1 across all bytes
pub fn popcount(data: &[u8]) -> u64 {
    data.iter().map(|b| u64::from(b.count_ones())).sum()
}
