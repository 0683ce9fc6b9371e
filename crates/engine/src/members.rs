//! Team membership and per-membership skill grants. A grant attaches to a
//! membership record, not to the user, so holding the same skill in two
//! teams requires two grants.

use db::{
    member::{MemberSkill, TeamMember},
    schema::{member_skills, skills, team_members, teams, tenant_users},
    team::Skill,
    tenant::TenantUser,
    user::User,
};
use diesel::dsl::{exists, select};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::{
    error::{ServiceError, ServiceResult},
    gen_public_id, require_manager, require_member,
};

/// Adds a user to a team. The user must hold an active seat in the tenant;
/// a plain roster record is not enough to be placed on a team.
#[tracing::instrument(skip(conn))]
pub fn add_member(
    requester: &User,
    tenant_id: i64,
    team_id: i64,
    user_id: i64,
    role: Option<&str>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<TeamMember> {
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

        let has_active_seat = select(exists(
            tenant_users::table
                .filter(tenant_users::tenant_id.eq(tenant_id))
                .filter(tenant_users::user_id.eq(user_id))
                .filter(TenantUser::is_active()),
        ))
        .get_result::<bool>(conn)?;
        if !has_active_seat {
            return Err(ServiceError::not_found(
                "Active user not found or does not belong to this tenant",
            ));
        }

        let already_member = select(exists(
            team_members::table
                .filter(team_members::team_id.eq(team_id))
                .filter(team_members::user_id.eq(user_id)),
        ))
        .get_result::<bool>(conn)?;
        if already_member {
            return Err(ServiceError::conflict(
                "User is already a member of this team",
            ));
        }

        let member = diesel::insert_into(team_members::table)
            .values((
                team_members::public_id.eq(gen_public_id()),
                team_members::tenant_id.eq(tenant_id),
                team_members::team_id.eq(team_id),
                team_members::user_id.eq(user_id),
                team_members::role.eq(role),
            ))
            .returning(team_members::all_columns)
            .get_result::<TeamMember>(conn)?;

        Ok(member)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_members(
    requester: &User,
    tenant_id: i64,
    team_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<TeamMember>> {
    require_member(requester, tenant_id, conn)?;

    let members = team_members::table
        .filter(team_members::tenant_id.eq(tenant_id))
        .filter(team_members::team_id.eq(team_id))
        .order_by(team_members::id.asc())
        .load::<TeamMember>(conn)?;

    Ok(members)
}

#[tracing::instrument(skip(conn))]
pub fn update_member(
    requester: &User,
    tenant_id: i64,
    team_member_id: i64,
    role: Option<&str>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<TeamMember> {
    require_manager(requester, tenant_id, conn)?;

    let role = match role {
        Some(role) => role,
        None => return Err(ServiceError::invalid("No fields to update")),
    };

    let member = diesel::update(
        team_members::table
            .filter(team_members::id.eq(team_member_id))
            .filter(team_members::tenant_id.eq(tenant_id)),
    )
    .set(team_members::role.eq(role))
    .returning(team_members::all_columns)
    .get_result::<TeamMember>(conn)
    .optional()?;

    member.ok_or_else(|| {
        ServiceError::not_found("Team member not found in this tenant")
    })
}

#[tracing::instrument(skip(conn))]
pub fn remove_member(
    requester: &User,
    tenant_id: i64,
    team_member_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        team_members::table
            .filter(team_members::id.eq(team_member_id))
            .filter(team_members::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found(
            "Team member not found in this tenant",
        ));
    }

    Ok(())
}

/// Grants a skill to a team membership. The skill must be owned by the team
/// the membership belongs to; granting a skill from another team is
/// rejected.
#[tracing::instrument(skip(conn))]
pub fn assign_member_skill(
    requester: &User,
    tenant_id: i64,
    team_member_id: i64,
    skill_id: i64,
    proficiency_level: Option<i64>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<MemberSkill> {
    require_manager(requester, tenant_id, conn)?;

    conn.transaction(|conn| {
        let member = team_members::table
            .filter(team_members::id.eq(team_member_id))
            .filter(team_members::tenant_id.eq(tenant_id))
            .first::<TeamMember>(conn)
            .optional()?;
        let member = match member {
            Some(member) => member,
            None => {
                return Err(ServiceError::not_found(
                    "Team member not found in this tenant",
                ))
            }
        };

        let skill = skills::table
            .filter(skills::id.eq(skill_id))
            .filter(skills::tenant_id.eq(tenant_id))
            .first::<Skill>(conn)
            .optional()?;
        let skill = match skill {
            Some(skill) => skill,
            None => {
                return Err(ServiceError::not_found(
                    "Skill not found in this tenant",
                ))
            }
        };

        if skill.team_id != member.team_id {
            return Err(ServiceError::invalid(
                "Skill does not belong to the member's team",
            ));
        }

        let already_granted = select(exists(
            member_skills::table
                .filter(member_skills::team_member_id.eq(team_member_id))
                .filter(member_skills::skill_id.eq(skill_id)),
        ))
        .get_result::<bool>(conn)?;
        if already_granted {
            return Err(ServiceError::conflict(
                "Skill already assigned to this member",
            ));
        }

        let grant = diesel::insert_into(member_skills::table)
            .values((
                member_skills::public_id.eq(gen_public_id()),
                member_skills::tenant_id.eq(tenant_id),
                member_skills::team_member_id.eq(team_member_id),
                member_skills::skill_id.eq(skill_id),
                member_skills::proficiency_level.eq(proficiency_level),
            ))
            .returning(member_skills::all_columns)
            .get_result::<MemberSkill>(conn)?;

        Ok(grant)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_member_skills(
    requester: &User,
    tenant_id: i64,
    team_member_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<MemberSkill>> {
    require_member(requester, tenant_id, conn)?;

    let grants = member_skills::table
        .filter(member_skills::tenant_id.eq(tenant_id))
        .filter(member_skills::team_member_id.eq(team_member_id))
        .order_by(member_skills::id.asc())
        .load::<MemberSkill>(conn)?;

    Ok(grants)
}

/// Only the proficiency level of a grant is mutable; to change the skill
/// itself, remove the grant and create a new one.
#[tracing::instrument(skip(conn))]
pub fn update_member_skill(
    requester: &User,
    tenant_id: i64,
    member_skill_id: i64,
    proficiency_level: Option<i64>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<MemberSkill> {
    require_manager(requester, tenant_id, conn)?;

    let proficiency_level = match proficiency_level {
        Some(level) => level,
        None => return Err(ServiceError::invalid("No fields to update")),
    };

    let grant = diesel::update(
        member_skills::table
            .filter(member_skills::id.eq(member_skill_id))
            .filter(member_skills::tenant_id.eq(tenant_id)),
    )
    .set(member_skills::proficiency_level.eq(proficiency_level))
    .returning(member_skills::all_columns)
    .get_result::<MemberSkill>(conn)
    .optional()?;

    grant.ok_or_else(|| ServiceError::not_found("Member skill not found"))
}

#[tracing::instrument(skip(conn))]
pub fn remove_member_skill(
    requester: &User,
    tenant_id: i64,
    member_skill_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        member_skills::table
            .filter(member_skills::id.eq(member_skill_id))
            .filter(member_skills::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found("Member skill not found"));
    }

    Ok(())
}
