//! Tenant role hierarchy.
//!
//! Roles are totally ordered from least to most privileged. Authorization and
//! rule bypass decisions compare positions in this order instead of matching
//! role names, so a new role only needs a slot in the enum.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A user's role within a tenant (or across the platform).
///
/// Variant order is the privilege order: later variants outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Agent,
    TenantAdmin,
    TenantOwner,
    PlatformAdmin,
}

/// Lowest role allowed to bypass a rule's role requirement.
pub const RULE_BYPASS_FLOOR: Role = Role::TenantAdmin;

/// Lowest role allowed to manage workflow rules and triggers.
pub const WORKFLOW_ADMIN_FLOOR: Role = Role::TenantAdmin;

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Agent => "agent",
            Self::TenantAdmin => "tenant_admin",
            Self::TenantOwner => "tenant_owner",
            Self::PlatformAdmin => "platform_admin",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "viewer" => Ok(Self::Viewer),
            "agent" => Ok(Self::Agent),
            "tenant_admin" => Ok(Self::TenantAdmin),
            "tenant_owner" => Ok(Self::TenantOwner),
            "platform_admin" => Ok(Self::PlatformAdmin),
            _ => Err(CoreError::Validation(format!(
                "Invalid role: '{s}'. Must be one of: viewer, agent, tenant_admin, \
                 tenant_owner, platform_admin"
            ))),
        }
    }

    /// Whether this role ranks at or above `threshold`.
    pub fn is_at_least(&self, threshold: Role) -> bool {
        *self >= threshold
    }

    /// Whether this role satisfies a rule that requires `required`.
    ///
    /// An exact match always satisfies. Roles at or above
    /// [`RULE_BYPASS_FLOOR`] also satisfy any requirement below
    /// `platform_admin`; a `platform_admin` requirement is never bypassed.
    pub fn satisfies_requirement(&self, required: Role) -> bool {
        if *self == required {
            return true;
        }
        if required.is_at_least(Role::PlatformAdmin) {
            return false;
        }
        self.is_at_least(RULE_BYPASS_FLOOR)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Role::*;

    #[test]
    fn test_hierarchy_order() {
        assert!(Viewer < Agent);
        assert!(Agent < TenantAdmin);
        assert!(TenantAdmin < TenantOwner);
        assert!(TenantOwner < PlatformAdmin);
    }

    #[test]
    fn test_is_at_least() {
        assert!(TenantOwner.is_at_least(TenantAdmin));
        assert!(TenantAdmin.is_at_least(TenantAdmin));
        assert!(!Agent.is_at_least(TenantAdmin));
    }

    #[test]
    fn test_exact_match_satisfies() {
        assert!(Agent.satisfies_requirement(Agent));
        assert!(PlatformAdmin.satisfies_requirement(PlatformAdmin));
    }

    #[test]
    fn test_non_admin_cannot_bypass() {
        assert!(!Agent.satisfies_requirement(TenantAdmin));
        assert!(!Viewer.satisfies_requirement(Agent));
    }

    #[test]
    fn test_admin_roles_bypass_lower_and_peer_requirements() {
        assert!(TenantOwner.satisfies_requirement(TenantAdmin));
        assert!(TenantAdmin.satisfies_requirement(Agent));
        // Bypass is not rank-based: any admin passes any non-platform requirement.
        assert!(TenantAdmin.satisfies_requirement(TenantOwner));
    }

    #[test]
    fn test_platform_admin_requirement_never_bypassed() {
        assert!(!TenantOwner.satisfies_requirement(PlatformAdmin));
        assert!(!TenantAdmin.satisfies_requirement(PlatformAdmin));
    }

    #[test]
    fn test_role_strings_round_trip() {
        for role in [Viewer, Agent, TenantAdmin, TenantOwner, PlatformAdmin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("superuser").is_err());
    }
}
