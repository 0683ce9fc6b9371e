//! Shared fixtures for the service tests: an in-memory database with the
//! migrations applied, and raw inserts for the rows the services themselves
//! do not create (users, tenants, seats).

use std::sync::Once;

use chrono::Utc;
use db::{
    schema::{tenant_users, tenants, users},
    tenant::{Tenant, TENANT_ROLE_ADMIN, TENANT_ROLE_MEMBER},
    user::User,
};
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

static TRACING: Once = Once::new();

/// Installs a log subscriber for the test binary, filtered through
/// `RUST_LOG`, so failing tests come with their query traces.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub(crate) fn test_conn() -> SqliteConnection {
    init_tracing();
    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Database connection failed");
    diesel::sql_query("PRAGMA foreign_keys=ON")
        .execute(&mut conn)
        .expect("Failed to enable foreign keys");
    conn.run_pending_migrations(crate::MIGRATIONS)
        .expect("Failed to run migrations");
    conn
}

pub(crate) fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    is_superuser: bool,
) -> User {
    diesel::insert_into(users::table)
        .values((
            users::public_id.eq(Uuid::now_v7().to_string()),
            users::email.eq(email),
            users::created_at.eq(Utc::now().naive_utc()),
            users::is_superuser.eq(is_superuser),
        ))
        .returning(users::all_columns)
        .get_result::<User>(conn)
        .unwrap()
}

pub(crate) fn insert_tenant(
    conn: &mut SqliteConnection,
    name: &str,
) -> Tenant {
    diesel::insert_into(tenants::table)
        .values((
            tenants::public_id.eq(Uuid::now_v7().to_string()),
            tenants::name.eq(name),
        ))
        .returning(tenants::all_columns)
        .get_result::<Tenant>(conn)
        .unwrap()
}

pub(crate) fn insert_seat(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    user_id: i64,
    role: &str,
    is_active: bool,
) {
    let n = diesel::insert_into(tenant_users::table)
        .values((
            tenant_users::tenant_id.eq(tenant_id),
            tenant_users::user_id.eq(user_id),
            tenant_users::role.eq(role),
            tenant_users::is_active.eq(is_active),
        ))
        .execute(conn)
        .unwrap();
    assert_eq!(n, 1);
}

/// One tenant with a manager (admin seat) and a plain member seat, which is
/// what most service tests need as a starting point.
pub(crate) struct Tenancy {
    pub tenant_id: i64,
    pub manager: User,
    pub member: User,
}

pub(crate) fn tenancy(conn: &mut SqliteConnection) -> Tenancy {
    let tenant_id = insert_tenant(conn, "Hillside Church").id;
    let manager = insert_user(conn, "manager@example.com", false);
    let member = insert_user(conn, "member@example.com", false);
    insert_seat(conn, tenant_id, manager.id, TENANT_ROLE_ADMIN, true);
    insert_seat(conn, tenant_id, member.id, TENANT_ROLE_MEMBER, true);
    Tenancy {
        tenant_id,
        manager,
        member,
    }
}
