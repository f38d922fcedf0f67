//! Strongly-typed record identifiers.
//!
//! Ids are opaque strings: new ones are generated as UUIDv7 text, but any
//! string coming from a caller is accepted verbatim and simply looked up.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an empresa (company).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmpresaId(String);

/// Identifier of a sede (branch).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SedeId(String);

macro_rules! impl_record_id {
    ($t:ty) => {
        impl $t {
            /// Generate a fresh identifier (UUIDv7, time-ordered).
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_record_id!(EmpresaId);
impl_record_id!(SedeId);
