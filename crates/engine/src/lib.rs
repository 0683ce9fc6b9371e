//! Service layer for the event-staffing core: the team/skill catalog, team
//! membership and skill grants, events and their slots (optionally
//! snapshotted from reusable templates), and the assignment eligibility
//! engine which decides whether a given person may fill a given slot.
//!
//! Every entry point takes the authenticated requester and performs its
//! permission check before touching any data. The hosting transport layer
//! (REST, RPC, whatever) is not this crate's concern.

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub mod assignments;
pub mod error;
pub mod events;
pub mod members;
pub mod permissions;
pub mod teams;

#[cfg(test)]
pub(crate) mod fixtures;

pub const MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../../migrations");

use db::user::User;
use diesel::{connection::LoadConnection, sqlite::Sqlite, Connection};

use crate::{
    error::{ServiceError, ServiceResult},
    permissions::{has_permission, Permission, TenantRef},
};

/// Guard for mutating entry points: the requester must hold an active seat
/// with a manager role in the tenant (or be a platform administrator).
pub(crate) fn require_manager(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    if has_permission(
        Some(requester),
        &Permission::ManageTenant(TenantRef(tenant_id)),
        conn,
    ) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Guard for read-only entry points: any active seat in the tenant will do.
pub(crate) fn require_member(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    if has_permission(
        Some(requester),
        &Permission::ViewTenant(TenantRef(tenant_id)),
        conn,
    ) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub(crate) fn gen_public_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
