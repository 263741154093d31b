//! crates/inc_core/src/ids.rs
//! Registry tokens for sellers, stores and org units, plus the per-sale unit
//! identifier (device serial / IMEI). ASCII-only, strict shapes; no I/O.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const TOKEN_MAX_LEN: usize = 64;
const UNIT_IDENT_MAX_LEN: usize = 128;

/// Token for seller/store/org ids: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let len = s.len();
    if len == 0 || len > TOKEN_MAX_LEN {
        return false;
    }
    s.bytes().all(|b| {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b':' || b == b'-'
    })
}

/// Unit identifiers come from device labels: printable ASCII, no whitespace, 1..=128.
#[inline]
pub fn is_valid_unit_identifier(s: &str) -> bool {
    let len = s.len();
    if len == 0 || len > UNIT_IDENT_MAX_LEN {
        return false;
    }
    s.bytes().all(|b| b.is_ascii_graphic())
}

macro_rules! token_newtype {
    ($(#[$m:meta])* $name:ident, $check:path) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if $check(s) {
                    Ok($name(s.to_owned()))
                } else {
                    Err(CoreError::InvalidId(format!("{}: {s:?}", stringify!($name))))
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                if $check(&value) {
                    Ok($name(value))
                } else {
                    Err(CoreError::InvalidId(format!("{}: {value:?}", stringify!($name))))
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }
    };
}

token_newtype!(
    /// Seller (SEC) token.
    SellerId, is_valid_token
);
token_newtype!(
    /// Store token.
    StoreId, is_valid_token
);
token_newtype!(
    /// Management unit token (ASE / ZSE / ABM / ZSM).
    OrgUnitId, is_valid_token
);
token_newtype!(
    /// Physical-sale identifier; unique per sold unit within a calculation scope.
    UnitIdentifier, is_valid_unit_identifier
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        for ok in ["A", "a", "9", "_", ".", ":", "-", "SEC_001", "store-12.north"] {
            assert!(is_valid_token(ok));
            let _s: SellerId = ok.parse().unwrap();
            let _t: StoreId = ok.parse().unwrap();
        }
        let too_long = "x".repeat(65);
        for bad in ["", " ", "é", "with space", too_long.as_str()] {
            assert!(!is_valid_token(bad));
            assert!(bad.parse::<OrgUnitId>().is_err());
        }
    }

    #[test]
    fn unit_identifier_allows_serial_punctuation() {
        let u: UnitIdentifier = "IMEI#3520-99/01".parse().unwrap();
        assert_eq!(u.as_str(), "IMEI#3520-99/01");
        assert!("".parse::<UnitIdentifier>().is_err());
        assert!("has space".parse::<UnitIdentifier>().is_err());
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let ok: StoreId = serde_json::from_str("\"ST-1\"").unwrap();
        assert_eq!(ok.as_str(), "ST-1");
        assert!(serde_json::from_str::<StoreId>("\"bad id\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"ST-1\"");
    }
}
