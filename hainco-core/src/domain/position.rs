//! Integer-coded enumerations shared by the API and the database
//!
//! All three enums travel as plain integers (`1`, `2`, `3`) both in JSON
//! and in their SMALLINT columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raised when an integer code has no matching variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i64,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} code {} is not recognised", self.kind, self.code)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! int_coded {
    ($name:ident, $kind:literal, { $($(#[$meta:meta])* $variant:ident = $code:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub enum $name {
            $($(#[$meta])* $variant = $code),+
        }

        impl $name {
            pub fn code(self) -> i64 {
                self as i64
            }
        }

        impl TryFrom<i64> for $name {
            type Error = UnknownCode;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok($name::$variant),)+
                    _ => Err(UnknownCode { kind: $kind, code }),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value.code()
            }
        }
    };
}

int_coded!(CanteenPosition, "canteen position", {
    Chef = 1,
    Cashier = 2,
    Server = 3,
});

int_coded!(AdminPosition, "admin position", {
    SuperAdmin = 1,
    SubAdmin = 2,
});

int_coded!(TransactionType, "transaction type", {
    /// Placed from the mobile application
    Order = 1,
    /// Walk-in purchase at the counter
    Buy = 2,
    /// Adjustment made by an admin
    Admin = 3,
});

impl Default for AdminPosition {
    /// Every admin in the first release is a super admin
    fn default() -> Self {
        AdminPosition::SuperAdmin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&CanteenPosition::Cashier).unwrap(), "2");
        assert_eq!(serde_json::to_string(&AdminPosition::SuperAdmin).unwrap(), "1");
        assert_eq!(serde_json::to_string(&TransactionType::Admin).unwrap(), "3");
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let result: Result<CanteenPosition, _> = serde_json::from_str("7");
        assert!(result.is_err());
        assert_eq!(
            TransactionType::try_from(0),
            Err(UnknownCode { kind: "transaction type", code: 0 })
        );
    }

    #[test]
    fn test_admin_position_defaults_to_super_admin() {
        assert_eq!(AdminPosition::default(), AdminPosition::SuperAdmin);
    }
}
