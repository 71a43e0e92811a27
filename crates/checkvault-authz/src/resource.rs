//! Protected resource kinds.
//!
//! # Purpose
//! Names the resources the permission matrix is keyed on.
//!
//! # Key invariants
//! - Wire names are `users`, `checks` and `system`; anything else is unknown
//!   and therefore denied by the matrix.
use serde::{Deserialize, Serialize};

/// Resource kind guarded by the permission matrix.
///
/// # Example
/// ```rust
/// use checkvault_authz::Resource;
///
/// assert_eq!("checks".parse::<Resource>().ok(), Some(Resource::Checks));
/// assert!("ledgers".parse::<Resource>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Account administration.
    Users,
    /// Check/history records.
    Checks,
    /// Process-wide administration.
    System,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Users, Resource::Checks, Resource::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Checks => "checks",
            Resource::System => "system",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Resource {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "users" => Ok(Resource::Users),
            "checks" => Ok(Resource::Checks),
            "system" => Ok(Resource::System),
            _ => Err(()),
        }
    }
}
