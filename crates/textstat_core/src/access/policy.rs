//! Static role to permission table.
//!
//! # Invariants
//! - The table is built once per process and never mutated.
//! - Unknown roles hold no permissions.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Named capability gating one or more operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    GetTexts,
    ManageTexts,
    AnalyzeTexts,
    GetUsers,
    ManageUsers,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Self::GetTexts,
        Self::ManageTexts,
        Self::AnalyzeTexts,
        Self::GetUsers,
        Self::ManageUsers,
    ];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetTexts => "getTexts",
            Self::ManageTexts => "manageTexts",
            Self::AnalyzeTexts => "analyzeTexts",
            Self::GetUsers => "getUsers",
            Self::ManageUsers => "manageUsers",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AccessPolicyError> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AccessPolicyError::UnknownPermission(value.to_string()))
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named bundle of permissions assigned to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Self::User, Self::Admin];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AccessPolicyError> {
        match value.trim() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "" => Err(AccessPolicyError::EmptyRole),
            other => Err(AccessPolicyError::UnknownRole(other.to_string())),
        }
    }

    fn grants(self) -> &'static [Permission] {
        match self {
            Self::User => &[
                Permission::GetTexts,
                Permission::ManageTexts,
                Permission::AnalyzeTexts,
            ],
            Self::Admin => &[
                Permission::GetUsers,
                Permission::ManageUsers,
                Permission::GetTexts,
                Permission::ManageTexts,
                Permission::AnalyzeTexts,
            ],
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicyError {
    EmptyRole,
    UnknownRole(String),
    UnknownPermission(String),
}

impl Display for AccessPolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role must not be empty"),
            Self::UnknownRole(value) => write!(f, "unknown role: {value}"),
            Self::UnknownPermission(value) => write!(f, "unknown permission: {value}"),
        }
    }
}

impl Error for AccessPolicyError {}

/// Immutable role to permission mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rights: BTreeMap<Role, BTreeSet<Permission>>,
}

impl AccessPolicy {
    /// Builds the standard `user`/`admin` table.
    pub fn standard() -> Self {
        let rights = Role::ALL
            .into_iter()
            .map(|role| (role, role.grants().iter().copied().collect()))
            .collect();
        Self { rights }
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.rights
            .get(&role)
            .is_some_and(|granted| granted.contains(&permission))
    }
}

static STANDARD_POLICY: Lazy<AccessPolicy> = Lazy::new(AccessPolicy::standard);

/// Checks `permission` against the process-wide table.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    STANDARD_POLICY.has_permission(role, permission)
}

/// Like [`has_permission`] for a free-form role name; unknown names get nothing.
pub fn role_has_permission(role_name: &str, permission: Permission) -> bool {
    Role::parse(role_name).is_ok_and(|role| has_permission(role, permission))
}
