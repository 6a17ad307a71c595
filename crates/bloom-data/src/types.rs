use std::marker::PhantomData;
use std::num::ParseIntError;


pub type BlockNumber = u32;
pub type Timestamp = u64;
pub type HexBytes = String;


/// Unsigned integer that JSON-RPC style sources encode as a string.
///
/// Two literal forms are recognized: plain decimal digits and `0x`-prefixed hex.
/// Leading zeros never switch to octal.
pub trait Quantity: Sized {
    fn from_str_radix(digits: &str, radix: u32) -> Result<Self, ParseIntError>;
}


macro_rules! quantity {
    ($($t:ty),*) => {
        $(
            impl Quantity for $t {
                #[inline]
                fn from_str_radix(digits: &str, radix: u32) -> Result<Self, ParseIntError> {
                    <$t>::from_str_radix(digits, radix)
                }
            }
        )*
    };
}
quantity!(u8, u16, u32, u64);


pub fn parse_quantity<T: Quantity>(s: &str) -> Option<T> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10)
    };

    let valid_digit = |b: u8| if radix == 16 {
        b.is_ascii_hexdigit()
    } else {
        b.is_ascii_digit()
    };

    // `from_str_radix` would also take a leading `+`
    if digits.is_empty() || !digits.bytes().all(valid_digit) {
        return None
    }

    T::from_str_radix(digits, radix).ok()
}


struct QuantityParser<T> {
    phantom_data: PhantomData<T>
}


impl <T> QuantityParser<T> {
    pub fn new() -> Self {
        Self {
            phantom_data: PhantomData
        }
    }
}


impl <'de, T: Quantity> serde::de::Visitor<'de> for QuantityParser<T> {
    type Value = T;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a decimal or 0x-prefixed hex string representing {}", std::any::type_name::<T>())
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        parse_quantity(v).ok_or_else(|| {
            serde::de::Error::custom(
                format!("failed to deserialize `{}` as {}", v, std::any::type_name::<T>())
            )
        })
    }
}


pub fn decode_quantity<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where D: serde::Deserializer<'de>,
          T: Quantity
{
    deserializer.deserialize_str(QuantityParser::<T>::new())
}
