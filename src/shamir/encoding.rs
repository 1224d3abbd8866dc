//! Printable forms of a share.
//!
//! The text form is `ID:DATA` with the identifier in decimal and the data in
//! standard padded base64, e.g. `17:q83vEg==`. The serde form stores the data
//! as the same base64 string.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};

use super::{Share, ShamirError};

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, general_purpose::STANDARD.encode(&self.data))
    }
}

impl FromStr for Share {
    type Err = ShamirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, data) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ShamirError::MalformedShare("expected ID:DATA".to_string()))?;

        let id: u8 = id
            .parse()
            .map_err(|_| ShamirError::MalformedShare(format!("identifier '{}' is not in 0..=255", id)))?;
        if id == 0 {
            return Err(ShamirError::InvalidShareIdentifier);
        }

        let data = general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ShamirError::MalformedShare(format!("bad base64 data: {}", e)))?;

        Ok(Share::new(id, data))
    }
}

/// Serde adapter storing share bytes as base64
pub(crate) mod base64_data {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD.decode(encoded).map_err(de::Error::custom)
    }
}
