use db::{schema::tenant_users, tenant::TenantUser, user::User};
use diesel::dsl::{exists, select};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

#[derive(Debug, Clone, Copy)]
pub struct TenantRef(pub i64);

/// A permission for a given resource on the system.
#[derive(Debug)]
pub enum Permission {
    /// Mutate tenant-scoped catalog, membership, event or assignment data.
    /// Held by seats with the owner or admin role.
    ManageTenant(TenantRef),
    /// Read tenant-scoped data. Held by any active seat.
    ViewTenant(TenantRef),
}

/// Returns whether a requester has the requisite permission on the given
/// object. Platform administrators bypass every tenant-scoped check; that
/// capability is tested first so the bypass never depends on seat state.
#[tracing::instrument(skip(conn))]
pub fn has_permission(
    user: Option<&User>,
    permission: &Permission,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> bool {
    if user.map(|user| user.is_superuser).unwrap_or(false) {
        return true;
    }

    match permission {
        Permission::ManageTenant(TenantRef(tenant_id)) => {
            check_manage_tenant(user, conn, tenant_id)
        }
        Permission::ViewTenant(TenantRef(tenant_id)) => {
            check_view_tenant(user, conn, tenant_id)
        }
    }
}

#[tracing::instrument(skip(conn))]
fn check_manage_tenant(
    user: Option<&User>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    tenant_id: &i64,
) -> bool {
    let user = match user {
        Some(user) => user,
        None => return false,
    };

    select(exists(
        tenant_users::table
            .filter(tenant_users::tenant_id.eq(tenant_id))
            .filter(tenant_users::user_id.eq(user.id))
            .filter(TenantUser::is_active())
            .filter(TenantUser::is_manager()),
    ))
    .get_result::<bool>(conn)
    .unwrap_or(false)
}

#[tracing::instrument(skip(conn))]
fn check_view_tenant(
    user: Option<&User>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    tenant_id: &i64,
) -> bool {
    let user = match user {
        Some(user) => user,
        None => return false,
    };

    select(exists(
        tenant_users::table
            .filter(tenant_users::tenant_id.eq(tenant_id))
            .filter(tenant_users::user_id.eq(user.id))
            .filter(TenantUser::is_active()),
    ))
    .get_result::<bool>(conn)
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use db::tenant::TENANT_ROLE_MEMBER;

    use super::*;
    use crate::fixtures::{insert_seat, insert_user, tenancy, test_conn};

    #[test]
    fn manager_seat_grants_manage_and_view() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);

        assert!(has_permission(
            Some(&t.manager),
            &Permission::ManageTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
        assert!(has_permission(
            Some(&t.manager),
            &Permission::ViewTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
    }

    #[test]
    fn member_seat_grants_view_only() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);

        assert!(!has_permission(
            Some(&t.member),
            &Permission::ManageTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
        assert!(has_permission(
            Some(&t.member),
            &Permission::ViewTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
    }

    #[test]
    fn superuser_bypasses_without_a_seat() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let root = insert_user(&mut conn, "root@example.com", true);

        assert!(has_permission(
            Some(&root),
            &Permission::ManageTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
    }

    #[test]
    fn inactive_seat_grants_nothing() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let parked = insert_user(&mut conn, "parked@example.com", false);
        insert_seat(
            &mut conn,
            t.tenant_id,
            parked.id,
            TENANT_ROLE_MEMBER,
            false,
        );

        assert!(!has_permission(
            Some(&parked),
            &Permission::ViewTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
    }

    #[test]
    fn anonymous_has_no_permission() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);

        assert!(!has_permission(
            None,
            &Permission::ViewTenant(TenantRef(t.tenant_id)),
            &mut conn,
        ));
    }
}
