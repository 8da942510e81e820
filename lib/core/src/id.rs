//! Strongly-typed ids for bot bookkeeping.
//!
//! Channel-issued identifiers (user ids, conversation ids, activity ids) are
//! opaque strings owned by the channel. The ids here are minted locally so a
//! single turn or proactive dispatch can be followed through the logs. They
//! use ULIDs, which sort by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an id from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of id that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Generates a ULID-backed id type displayed as `<prefix>_<ulid>`.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Mints a fresh id.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }

            /// Returns the display prefix.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let ulid_str = s
                    .strip_prefix(concat!($prefix, "_"))
                    .unwrap_or(s);

                Ulid::from_str(ulid_str)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Identifies one turn: an inbound activity or a proactive continuation.
    TurnId,
    "turn"
);

define_id!(
    /// Identifies one run of the proactive dispatcher.
    DispatchId,
    "dsp"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_id_display_format() {
        let id = TurnId::new();
        assert!(id.to_string().starts_with("turn_"));
    }

    #[test]
    fn dispatch_id_display_format() {
        let id = DispatchId::new();
        assert!(id.to_string().starts_with("dsp_"));
        assert_eq!(DispatchId::prefix(), "dsp");
    }

    #[test]
    fn parse_with_and_without_prefix() {
        let id = TurnId::new();
        let with_prefix: TurnId = id.to_string().parse().expect("should parse");
        let bare: TurnId = id.as_ulid().to_string().parse().expect("should parse");
        assert_eq!(with_prefix, id);
        assert_eq!(bare, id);
    }

    #[test]
    fn parse_rejects_other_prefixes() {
        let turn = TurnId::new();
        let result: Result<DispatchId, _> = turn.to_string().parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "DispatchId");
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(DispatchId::new(), DispatchId::new());
    }

    #[test]
    fn serializes_as_bare_ulid() {
        let id = DispatchId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.as_ulid()));
    }
}
