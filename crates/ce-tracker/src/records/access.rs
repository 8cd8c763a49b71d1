use serde::{Deserialize, Serialize};

use super::domain::{TenantId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    OrgAdmin,
    Member,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::OrgAdmin => "Organization admin",
            Role::Member => "Member",
        }
    }
}

/// The authenticated user a request is made on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
}

impl Actor {
    pub fn member(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            role: Role::Member,
        }
    }

    pub fn org_admin(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            role: Role::OrgAdmin,
        }
    }

    pub fn superadmin(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            role: Role::Superadmin,
        }
    }

    /// Whether this actor may read or change data owned by `owner` in `tenant`.
    pub fn can_access(&self, owner: UserId, tenant: TenantId) -> bool {
        match self.role {
            Role::Superadmin => true,
            Role::OrgAdmin => tenant == self.tenant_id,
            Role::Member => owner == self.user_id && tenant == self.tenant_id,
        }
    }
}
