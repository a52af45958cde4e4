//! Identifier wrappers for System Initiative API objects.
//!
//! The remote service hands out opaque string ids. Each kind gets its own
//! newtype so a schema id cannot be passed where a change set id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when an identifier string is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! define_opaque_id {
    ($name:ident, $label:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap an id string, rejecting empty or padded values.
            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                if value.is_empty() {
                    return Err(IdParseError::new(format!("Invalid {}: empty", $label)));
                }
                if value.trim() != value || value.contains('/') {
                    return Err(IdParseError::new(format!(
                        "Invalid {}: '{}'",
                        $label, value
                    )));
                }
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_opaque_id!(WorkspaceId, "workspace ID");
define_opaque_id!(ChangeSetId, "change set ID");
define_opaque_id!(SchemaId, "schema ID");
define_opaque_id!(SchemaVariantId, "schema variant ID");
define_opaque_id!(FuncId, "func ID");
define_opaque_id!(ComponentId, "component ID");
define_opaque_id!(JobStateId, "job state ID");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_ulid_style_ids() {
        let id = ChangeSetId::parse("01JQ8Z4M0X3V5T7A9C2E4G6J8K").unwrap();
        assert_eq!(id.as_str(), "01JQ8Z4M0X3V5T7A9C2E4G6J8K");
        assert_eq!(id.to_string(), "01JQ8Z4M0X3V5T7A9C2E4G6J8K");
    }

    #[test]
    fn test_parse_rejects_empty_and_path_breaking_values() {
        assert!(SchemaId::parse("").is_err());
        assert!(SchemaId::parse(" abc").is_err());
        assert!(SchemaId::parse("abc/def").is_err());

        let err = FuncId::parse("").unwrap_err();
        assert!(err.to_string().contains("func ID"));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: SchemaVariantId = serde_json::from_str("\"v-1\"").unwrap();
        assert_eq!(id.as_str(), "v-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"v-1\"");
    }

    #[test]
    fn test_deserialize_applies_parse_rules() {
        assert!(serde_json::from_str::<WorkspaceId>("\"\"").is_err());
        let err = serde_json::from_str::<ChangeSetId>("\"a/b\"").unwrap_err();
        assert!(err.to_string().contains("change set ID"));
    }
}
