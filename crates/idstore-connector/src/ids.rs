//! Principal references
//!
//! The identity store hands back opaque identifier strings for users,
//! groups and memberships. They carry no meaning here beyond being passed
//! back into later calls, so they are wrapped in newtypes that only allow
//! construction, display and borrowing.
//!
//! ```
//! use idstore_connector::{GroupRef, UserRef};
//!
//! let user = UserRef::new("9067c9b4-1234");
//! let group = GroupRef::new("a1b2c3");
//!
//! fn requires_group(id: &GroupRef) -> &str {
//!     id.as_str()
//! }
//!
//! assert_eq!(requires_group(&group), "a1b2c3");
//! // requires_group(&user); // This would not compile!
//! # let _ = user;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Macro to define an opaque backend reference type
macro_rules! define_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier returned by the directory service.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the reference, returning the raw identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_ref!(
    /// Reference to a user principal.
    UserRef
);

define_ref!(
    /// Reference to a group principal.
    GroupRef
);

define_ref!(
    /// Reference to a user-to-group membership.
    MembershipRef
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_display_is_raw_identifier() {
        let user = UserRef::new("906754a2-0011");
        assert_eq!(user.to_string(), "906754a2-0011");
        assert_eq!(user.as_str(), "906754a2-0011");
    }

    #[test]
    fn test_ref_serializes_transparently() {
        let group = GroupRef::from("g-42");
        let json = serde_json::to_string(&group).unwrap();
        assert_eq!(json, "\"g-42\"");

        let back: GroupRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn test_into_inner() {
        let membership = MembershipRef::from("m-1".to_string());
        assert_eq!(membership.into_inner(), "m-1");
    }
}
