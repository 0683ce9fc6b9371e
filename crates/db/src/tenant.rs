use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::tenant_users;

#[derive(
    Debug, Queryable, Serialize, Deserialize, Clone, Hash, PartialEq, Eq,
)]
pub struct Tenant {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// A seat: the join of a user to a tenant. A user with an active seat may
/// log in to the tenant and can be placed on teams and assigned to events.
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct TenantUser {
    pub id: i64,
    pub tenant_id: i64,
    pub user_id: i64,
    // one of "owner", "admin", "member"
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

pub const TENANT_ROLE_OWNER: &str = "owner";
pub const TENANT_ROLE_ADMIN: &str = "admin";
pub const TENANT_ROLE_MEMBER: &str = "member";

impl TenantUser {
    /// Seats whose role carries management rights over the tenant.
    #[diesel::dsl::auto_type(no_type_alias)]
    pub fn is_manager() -> _ {
        let owner: &'static str = TENANT_ROLE_OWNER;
        let admin: &'static str = TENANT_ROLE_ADMIN;
        tenant_users::role
            .eq(owner)
            .or(tenant_users::role.eq(admin))
    }

    #[diesel::dsl::auto_type(no_type_alias)]
    pub fn is_active() -> _ {
        tenant_users::is_active.eq(true)
    }
}
