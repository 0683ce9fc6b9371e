//! Team/skill catalog: CRUD for teams and the skills attached to them, and
//! maintenance of the per-tenant skill-incompatibility blacklist.

use db::{
    schema::{skill_incompatibilities, skills, teams, tenants},
    team::{canonical_pair, Skill, SkillIncompatibility, Team},
    user::User,
};
use diesel::dsl::{exists, select};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ServiceError, ServiceResult},
    gen_public_id, require_manager, require_member,
};

#[tracing::instrument(skip(conn))]
pub fn create_team(
    requester: &User,
    tenant_id: i64,
    name: &str,
    description: Option<&str>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Team> {
    require_manager(requester, tenant_id, conn)?;

    conn.transaction(|conn| {
        let tenant_exists = select(exists(
            tenants::table.filter(tenants::id.eq(tenant_id)),
        ))
        .get_result::<bool>(conn)?;
        if !tenant_exists {
            return Err(ServiceError::not_found("Tenant not found"));
        }

        let team = diesel::insert_into(teams::table)
            .values((
                teams::public_id.eq(gen_public_id()),
                teams::tenant_id.eq(tenant_id),
                teams::name.eq(name),
                teams::description.eq(description),
            ))
            .returning(teams::all_columns)
            .get_result::<Team>(conn)?;

        Ok(team)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_teams(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<Team>> {
    require_member(requester, tenant_id, conn)?;

    let teams = teams::table
        .filter(teams::tenant_id.eq(tenant_id))
        .order_by(teams::id.asc())
        .load::<Team>(conn)?;

    Ok(teams)
}

#[derive(AsChangeset, Debug, Default, Clone, Serialize, Deserialize)]
#[diesel(table_name = teams)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[tracing::instrument(skip(conn))]
pub fn update_team(
    requester: &User,
    tenant_id: i64,
    team_id: i64,
    update: UpdateTeam,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Team> {
    require_manager(requester, tenant_id, conn)?;

    if update.name.is_none() && update.description.is_none() {
        return Err(ServiceError::invalid("No fields to update"));
    }

    conn.transaction(|conn| {
        let team = diesel::update(
            teams::table
                .filter(teams::id.eq(team_id))
                .filter(teams::tenant_id.eq(tenant_id)),
        )
        .set(&update)
        .returning(teams::all_columns)
        .get_result::<Team>(conn)
        .optional()?;

        team.ok_or_else(|| {
            ServiceError::not_found("Team not found in this tenant")
        })
    })
}

#[tracing::instrument(skip(conn))]
pub fn delete_team(
    requester: &User,
    tenant_id: i64,
    team_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        teams::table
            .filter(teams::id.eq(team_id))
            .filter(teams::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found("Team not found in this tenant"));
    }

    Ok(())
}

#[tracing::instrument(skip(conn))]
pub fn create_skill(
    requester: &User,
    tenant_id: i64,
    team_id: i64,
    name: &str,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Skill> {
    require_manager(requester, tenant_id, conn)?;

    conn.transaction(|conn| {
        let team_in_tenant = select(exists(
            teams::table
                .filter(teams::id.eq(team_id))
                .filter(teams::tenant_id.eq(tenant_id)),
        ))
        .get_result::<bool>(conn)?;
        if !team_in_tenant {
            return Err(ServiceError::not_found(
                "Team not found in this tenant",
            ));
        }

        let skill = diesel::insert_into(skills::table)
            .values((
                skills::public_id.eq(gen_public_id()),
                skills::tenant_id.eq(tenant_id),
                skills::team_id.eq(team_id),
                skills::name.eq(name),
            ))
            .returning(skills::all_columns)
            .get_result::<Skill>(conn)?;

        Ok(skill)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_skills(
    requester: &User,
    tenant_id: i64,
    team_id: Option<i64>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<Skill>> {
    require_member(requester, tenant_id, conn)?;

    let mut query = skills::table
        .filter(skills::tenant_id.eq(tenant_id))
        .into_boxed();
    if let Some(team_id) = team_id {
        query = query.filter(skills::team_id.eq(team_id));
    }

    let skills = query.order_by(skills::id.asc()).load::<Skill>(conn)?;

    Ok(skills)
}

#[tracing::instrument(skip(conn))]
pub fn update_skill(
    requester: &User,
    tenant_id: i64,
    skill_id: i64,
    name: Option<&str>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Skill> {
    require_manager(requester, tenant_id, conn)?;

    let name = match name {
        Some(name) => name,
        None => return Err(ServiceError::invalid("No fields to update")),
    };

    let skill = diesel::update(
        skills::table
            .filter(skills::id.eq(skill_id))
            .filter(skills::tenant_id.eq(tenant_id)),
    )
    .set(skills::name.eq(name))
    .returning(skills::all_columns)
    .get_result::<Skill>(conn)
    .optional()?;

    skill.ok_or_else(|| {
        ServiceError::not_found("Skill not found in this tenant")
    })
}

#[tracing::instrument(skip(conn))]
pub fn delete_skill(
    requester: &User,
    tenant_id: i64,
    skill_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        skills::table
            .filter(skills::id.eq(skill_id))
            .filter(skills::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found(
            "Skill not found in this tenant",
        ));
    }

    Ok(())
}

/// Marks two skills as forbidden from simultaneous use by one person within
/// one event. The pair is normalised into canonical order before storage; a
/// duplicate registration (in either order) is a conflict, not a no-op.
#[tracing::instrument(skip(conn))]
pub fn add_incompatibility(
    requester: &User,
    tenant_id: i64,
    skill_id_1: i64,
    skill_id_2: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<SkillIncompatibility> {
    require_manager(requester, tenant_id, conn)?;

    if skill_id_1 == skill_id_2 {
        return Err(ServiceError::invalid(
            "Cannot mark a skill as incompatible with itself",
        ));
    }

    let (first, second) = canonical_pair(skill_id_1, skill_id_2);

    conn.transaction(|conn| {
        let both_in_tenant = skills::table
            .filter(skills::tenant_id.eq(tenant_id))
            .filter(skills::id.eq_any([first, second]))
            .count()
            .get_result::<i64>(conn)?
            == 2;
        if !both_in_tenant {
            return Err(ServiceError::not_found(
                "One or both skills do not belong to this tenant",
            ));
        }

        let already_listed = select(exists(
            skill_incompatibilities::table
                .filter(skill_incompatibilities::tenant_id.eq(tenant_id))
                .filter(skill_incompatibilities::skill_id_1.eq(first))
                .filter(skill_incompatibilities::skill_id_2.eq(second)),
        ))
        .get_result::<bool>(conn)?;
        if already_listed {
            return Err(ServiceError::conflict(
                "These skills are already marked as incompatible",
            ));
        }

        let row = diesel::insert_into(skill_incompatibilities::table)
            .values((
                skill_incompatibilities::tenant_id.eq(tenant_id),
                skill_incompatibilities::skill_id_1.eq(first),
                skill_incompatibilities::skill_id_2.eq(second),
            ))
            .returning(skill_incompatibilities::all_columns)
            .get_result::<SkillIncompatibility>(conn)?;

        Ok(row)
    })
}

#[tracing::instrument(skip(conn))]
pub fn remove_incompatibility(
    requester: &User,
    tenant_id: i64,
    skill_id_1: i64,
    skill_id_2: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let (first, second) = canonical_pair(skill_id_1, skill_id_2);

    let n = diesel::delete(
        skill_incompatibilities::table
            .filter(skill_incompatibilities::tenant_id.eq(tenant_id))
            .filter(skill_incompatibilities::skill_id_1.eq(first))
            .filter(skill_incompatibilities::skill_id_2.eq(second)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found("Incompatibility not found"));
    }

    Ok(())
}

#[tracing::instrument(skip(conn))]
pub fn list_incompatibilities(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<SkillIncompatibility>> {
    require_member(requester, tenant_id, conn)?;

    let rows = skill_incompatibilities::table
        .filter(skill_incompatibilities::tenant_id.eq(tenant_id))
        .order_by(skill_incompatibilities::id.asc())
        .load::<SkillIncompatibility>(conn)?;

    Ok(rows)
}
