//! The assignment eligibility engine. Given (event, slot, candidate), this
//! decides whether the candidate may fill one unit of the slot, and persists
//! the assignment when they may.
//!
//! Every call is a fresh decision against current data; nothing is cached
//! between calls and deleting an assignment simply removes the row. The
//! whole decision runs inside one transaction so that two concurrent
//! decisions for the same person cannot both pass the incompatibility check
//! against the same pre-existing state.

use db::{
    assignment::EventAssignment,
    event::EventSlot,
    schema::{
        event_assignments, event_slots, member_skills,
        skill_incompatibilities, team_members, tenant_users,
    },
    team::canonical_pair,
    tenant::TenantUser,
    user::User,
};
use diesel::dsl::{exists, select};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::{
    error::{ServiceError, ServiceResult},
    gen_public_id, require_manager, require_member,
};

/// Assigns a user to a slot of an event, enforcing the eligibility rules in
/// order: the slot must resolve in the tenant and event, the user must hold
/// an active seat, be a member of the slot's team, hold the slot's skill
/// through that membership, not already be assigned to a different team
/// within the event, and not accumulate a blacklisted skill pair within the
/// event. The checks short-circuit on first failure and the rejection
/// messages are part of the public contract.
#[tracing::instrument(skip(conn))]
pub fn create_assignment(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    slot_id: i64,
    user_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<EventAssignment> {
    require_manager(requester, tenant_id, conn)?;

    conn.transaction(|conn| {
        let slot = event_slots::table
            .filter(event_slots::id.eq(slot_id))
            .filter(event_slots::tenant_id.eq(tenant_id))
            .first::<EventSlot>(conn)
            .optional()?;
        let slot = match slot {
            Some(slot) if slot.event_id == event_id => slot,
            _ => {
                return Err(ServiceError::not_found("Event slot not found"))
            }
        };

        let has_active_seat = select(exists(
            tenant_users::table
                .filter(tenant_users::tenant_id.eq(tenant_id))
                .filter(tenant_users::user_id.eq(user_id))
                .filter(TenantUser::is_active()),
        ))
        .get_result::<bool>(conn)?;
        if !has_active_seat {
            return Err(ServiceError::not_found(
                "Active user not found in this tenant",
            ));
        }

        let membership_id = team_members::table
            .filter(team_members::tenant_id.eq(tenant_id))
            .filter(team_members::team_id.eq(slot.team_id))
            .filter(team_members::user_id.eq(user_id))
            .select(team_members::id)
            .first::<i64>(conn)
            .optional()?;
        let membership_id = match membership_id {
            Some(id) => id,
            None => {
                return Err(ServiceError::invalid(
                    "User is not a member of the required team",
                ))
            }
        };

        let has_skill = select(exists(
            member_skills::table
                .filter(member_skills::team_member_id.eq(membership_id))
                .filter(member_skills::skill_id.eq(slot.skill_id)),
        ))
        .get_result::<bool>(conn)?;
        if !has_skill {
            return Err(ServiceError::invalid(
                "User does not have the required skill",
            ));
        }

        let existing =
            EventAssignment::held_in_event(event_id, user_id, conn)?;

        if let Some(first) = existing.first() {
            // All of a person's assignments within one event share a team
            // (this very check maintains that), so the first row is enough
            // to compare against.
            if first.team_id != slot.team_id {
                return Err(ServiceError::invalid(
                    "User can only be assigned to one team per event",
                ));
            }

            // The new skill is checked pairwise against the person's entire
            // accumulated skill set for this event, not just the latest
            // assignment.
            for held in &existing {
                let (first_skill, second_skill) =
                    canonical_pair(held.skill_id, slot.skill_id);
                let blacklisted = select(exists(
                    skill_incompatibilities::table
                        .filter(
                            skill_incompatibilities::tenant_id.eq(tenant_id),
                        )
                        .filter(
                            skill_incompatibilities::skill_id_1
                                .eq(first_skill),
                        )
                        .filter(
                            skill_incompatibilities::skill_id_2
                                .eq(second_skill),
                        ),
                ))
                .get_result::<bool>(conn)?;
                if blacklisted {
                    return Err(ServiceError::invalid(
                        "These skills cannot be used simultaneously \
                         by the same person",
                    ));
                }
            }
        }

        let assignment = diesel::insert_into(event_assignments::table)
            .values((
                event_assignments::public_id.eq(gen_public_id()),
                event_assignments::tenant_id.eq(tenant_id),
                event_assignments::event_id.eq(event_id),
                event_assignments::slot_id.eq(slot_id),
                event_assignments::user_id.eq(user_id),
            ))
            .returning(event_assignments::all_columns)
            .get_result::<EventAssignment>(conn)
            .map_err(|_| {
                ServiceError::Internal(
                    "Failed to create assignment".to_string(),
                )
            })?;

        Ok(assignment)
    })
}

/// Deleting an assignment has no side effects beyond removing the row;
/// eligibility is always recomputed live from current data.
#[tracing::instrument(skip(conn))]
pub fn delete_assignment(
    requester: &User,
    tenant_id: i64,
    assignment_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        event_assignments::table
            .filter(event_assignments::id.eq(assignment_id))
            .filter(event_assignments::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found("Assignment not found"));
    }

    Ok(())
}

#[tracing::instrument(skip(conn))]
pub fn list_assignments(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<EventAssignment>> {
    require_member(requester, tenant_id, conn)?;

    let assignments = event_assignments::table
        .filter(event_assignments::tenant_id.eq(tenant_id))
        .filter(event_assignments::event_id.eq(event_id))
        .order_by(event_assignments::id.asc())
        .load::<EventAssignment>(conn)?;

    Ok(assignments)
}
