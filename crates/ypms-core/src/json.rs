//! High-performance JSON (de)serialization, using `sonic-rs`.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Deserialize a JSON string into `T`.
pub fn from_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    sonic_rs::from_str(s).map_err(Error::from)
}

/// Deserialize JSON bytes into `T`.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    sonic_rs::from_slice(bytes).map_err(Error::from)
}

/// Serialize `value` to compact JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    sonic_rs::to_string(value).map_err(Error::from)
}

/// Serialize `value` to pretty-printed JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    sonic_rs::to_string_pretty(value).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn round_trips() {
        let p = Point { x: 1, y: 2 };
        let s = to_json(&p).unwrap();
        let back: Point = from_json(&s).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn decode_error_on_garbage() {
        let err = from_json::<Point>("not json").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
