//! Protocol-specific numeric encodings.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 64-bit unsigned integer carried as a decimal JSON string.
///
/// Protobuf-derived JSON (Tempo) encodes `uint64` fields as strings so that
/// JSON consumers with double-precision numbers do not truncate them. An empty
/// string decodes to zero; bare JSON numbers are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uint64String(pub u64);

impl Uint64String {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Uint64String {
    type Err = ParseIntError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() {
            return Ok(Self(0));
        }
        text.parse::<u64>().map(Self)
    }
}

impl From<u64> for Uint64String {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Uint64String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Uint64String {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Uint64String {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(Uint64StringVisitor)
    }
}

struct Uint64StringVisitor;

impl Visitor<'_> for Uint64StringVisitor {
    type Value = Uint64String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or unsigned integer")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> Result<Self::Value, E> {
        text.parse::<Uint64String>()
            .map_err(|err| E::custom(format!("invalid uint64 string {text:?}: {err}")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Uint64String(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(Uint64String)
            .map_err(|_| E::custom(format!("negative value {value} for uint64")))
    }
}

#[cfg(test)]
mod tests {
    use super::Uint64String;

    #[test]
    fn empty_string_decodes_to_zero() {
        let value: Uint64String = serde_json::from_str(r#""""#).expect("empty decodes");
        assert_eq!(value.get(), 0);
    }

    #[test]
    fn large_values_survive_without_float_truncation() {
        let value: Uint64String =
            serde_json::from_str(r#""12345678901234""#).expect("numeric string decodes");
        assert_eq!(value.get(), 12_345_678_901_234);

        let max: Uint64String =
            serde_json::from_str(r#""18446744073709551615""#).expect("u64::MAX decodes");
        assert_eq!(max.get(), u64::MAX);
    }

    #[test]
    fn non_numeric_string_is_a_decode_error() {
        let err = serde_json::from_str::<Uint64String>(r#""abc""#)
            .expect_err("non-numeric must fail");
        assert!(err.to_string().contains("invalid uint64 string"));
    }

    #[test]
    fn bare_numbers_are_accepted_and_strings_are_emitted() {
        let value: Uint64String = serde_json::from_str("42").expect("number decodes");
        assert_eq!(value.get(), 42);
        assert_eq!(
            serde_json::to_string(&value).expect("serializes"),
            r#""42""#
        );
        assert!(serde_json::from_str::<Uint64String>("-1").is_err());
    }
}
