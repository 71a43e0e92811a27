use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BankStaff,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::BankStaff, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BankStaff => "bank_staff",
            Role::User => "user",
        }
    }

    /// Elevated roles act on every record regardless of owner.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Admin | Role::BankStaff)
    }

    /// Resolve a role carried by a credential.
    ///
    /// Missing and unrecognized values both collapse to [`Role::User`] so a
    /// stale or tampered role string can never grant elevation.
    pub fn from_claim(value: Option<&str>) -> Role {
        match value {
            None => Role::User,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(role = raw, "unrecognized role in credential; using least privilege");
                Role::User
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Role::Admin),
            "bank_staff" => Ok(Role::BankStaff),
            "user" => Ok(Role::User),
            _ => Err(()),
        }
    }
}

/// Serde adapter for credential claims; see [`Role::from_claim`].
pub(crate) fn deserialize_claim_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(Role::from_claim(raw.as_deref()))
}
