// tga-core/src/core/identifiers.rs
// ============================================================================
// Module: Talos Governance Agent Identifiers
// Description: Canonical opaque identifiers used throughout the execution log.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every identifier that flows through the execution log is a time-ordered
//! 128-bit value rendered in the standard 8-4-4-4-12 lowercase hex form (see
//! [`crate::core::idgen`]). The newtypes here keep those ids from being
//! confused with one another at compile time while staying transparent on
//! the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Shape Validation
// ============================================================================

/// Returns whether `value` has the 8-4-4-4-12 lowercase hex shape that
/// [`crate::core::idgen::generate`] produces.
///
/// This does not check the version nibble or variant bits; callers that
/// need the stricter check use [`super::idgen::is_time_ordered_id`].
#[must_use]
pub fn has_id_shape(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    if groups.len() != lengths.len() {
        return false;
    }
    groups
        .iter()
        .zip(lengths)
        .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_hexdigit()))
}

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a newtype wrapper around a time-ordered id string.
///
/// # Invariants
/// The wrapped string is never validated for the id shape at construction;
/// callers that parse ids from untrusted input (JWS claims, stored rows)
/// must call [`has_id_shape`] themselves and surface a typed error on
/// mismatch.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "` from an owned or borrowed string.")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the inner owned string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

id_newtype!(TraceId, "Identifies one end-to-end execution attempt and its hash chain.");
id_newtype!(PrincipalId, "Identifies the capability issuer bound to a trace.");
id_newtype!(PlanId, "Identifies the higher-level goal a trace belongs to.");
id_newtype!(SessionId, "Identifies a warm-path session cache entry.");
id_newtype!(ToolCallId, "Identifies one dispatched tool invocation.");
id_newtype!(IdempotencyKey, "Lets an external tool recognize a re-dispatched call as the same logical invocation.");

/// The capability's `nonce` claim, used as the session cache's
/// `capability_jti` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityJti(String);

impl CapabilityJti {
    /// Creates a new capability nonce wrapper.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the nonce as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityJti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CapabilityJti {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CapabilityJti {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
