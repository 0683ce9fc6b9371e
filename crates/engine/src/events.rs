//! Event and slot lifecycle, including reusable templates and the
//! template-to-event snapshot performed at event creation.

use chrono::NaiveDateTime;
use db::{
    event::{Event, EventSlot, EVENT_STATUSES, EVENT_STATUS_DRAFT},
    schema::{
        event_slots, event_template_slots, event_templates, events, skills,
        teams,
    },
    template::{EventTemplate, EventTemplateSlot},
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
pub fn create_template(
    requester: &User,
    tenant_id: i64,
    name: &str,
    description: Option<&str>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<EventTemplate> {
    require_manager(requester, tenant_id, conn)?;

    let template = diesel::insert_into(event_templates::table)
        .values((
            event_templates::public_id.eq(gen_public_id()),
            event_templates::tenant_id.eq(tenant_id),
            event_templates::name.eq(name),
            event_templates::description.eq(description),
        ))
        .returning(event_templates::all_columns)
        .get_result::<EventTemplate>(conn)?;

    Ok(template)
}

#[tracing::instrument(skip(conn))]
pub fn add_template_slot(
    requester: &User,
    tenant_id: i64,
    template_id: i64,
    team_id: i64,
    skill_id: i64,
    quantity: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<EventTemplateSlot> {
    require_manager(requester, tenant_id, conn)?;

    if quantity < 1 {
        return Err(ServiceError::invalid("Quantity must be at least 1"));
    }

    conn.transaction(|conn| {
        let template_in_tenant = select(exists(
            event_templates::table
                .filter(event_templates::id.eq(template_id))
                .filter(event_templates::tenant_id.eq(tenant_id)),
        ))
        .get_result::<bool>(conn)?;
        if !template_in_tenant {
            return Err(ServiceError::not_found(
                "Template not found in this tenant",
            ));
        }

        check_slot_requirement(tenant_id, team_id, skill_id, conn)?;

        let slot = diesel::insert_into(event_template_slots::table)
            .values((
                event_template_slots::public_id.eq(gen_public_id()),
                event_template_slots::tenant_id.eq(tenant_id),
                event_template_slots::template_id.eq(template_id),
                event_template_slots::team_id.eq(team_id),
                event_template_slots::skill_id.eq(skill_id),
                event_template_slots::quantity.eq(quantity),
            ))
            .returning(event_template_slots::all_columns)
            .get_result::<EventTemplateSlot>(conn)?;

        Ok(slot)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_templates(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<EventTemplate>> {
    require_member(requester, tenant_id, conn)?;

    let templates = event_templates::table
        .filter(event_templates::tenant_id.eq(tenant_id))
        .order_by(event_templates::id.asc())
        .load::<EventTemplate>(conn)?;

    Ok(templates)
}

#[tracing::instrument(skip(conn))]
pub fn list_template_slots(
    requester: &User,
    tenant_id: i64,
    template_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<EventTemplateSlot>> {
    require_member(requester, tenant_id, conn)?;

    let slots = event_template_slots::table
        .filter(event_template_slots::tenant_id.eq(tenant_id))
        .filter(event_template_slots::template_id.eq(template_id))
        .order_by(event_template_slots::id.asc())
        .load::<EventTemplateSlot>(conn)?;

    Ok(slots)
}

/// Deleting a template cascades to its slots. Events created from it keep
/// their own copied slots; only their provenance reference is nulled.
#[tracing::instrument(skip(conn))]
pub fn delete_template(
    requester: &User,
    tenant_id: i64,
    template_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        event_templates::table
            .filter(event_templates::id.eq(template_id))
            .filter(event_templates::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found(
            "Template not found in this tenant",
        ));
    }

    Ok(())
}

/// Creates an event, optionally instantiating it from a template. The
/// template's slots are copied into the event inside the same transaction;
/// later edits to the template do not propagate.
#[tracing::instrument(skip(conn))]
pub fn create_event(
    requester: &User,
    tenant_id: i64,
    name: &str,
    date: NaiveDateTime,
    template_id: Option<i64>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Event> {
    require_manager(requester, tenant_id, conn)?;

    conn.transaction(|conn| {
        if let Some(template_id) = template_id {
            let template_in_tenant = select(exists(
                event_templates::table
                    .filter(event_templates::id.eq(template_id))
                    .filter(event_templates::tenant_id.eq(tenant_id)),
            ))
            .get_result::<bool>(conn)?;
            if !template_in_tenant {
                return Err(ServiceError::not_found(
                    "Template not found in this tenant",
                ));
            }
        }

        let event = diesel::insert_into(events::table)
            .values((
                events::public_id.eq(gen_public_id()),
                events::tenant_id.eq(tenant_id),
                events::template_id.eq(template_id),
                events::name.eq(name),
                events::date.eq(date),
                events::status.eq(EVENT_STATUS_DRAFT),
            ))
            .returning(events::all_columns)
            .get_result::<Event>(conn)?;

        if let Some(template_id) = template_id {
            let template_slots = event_template_slots::table
                .filter(event_template_slots::template_id.eq(template_id))
                .order_by(event_template_slots::id.asc())
                .load::<EventTemplateSlot>(conn)?;

            for slot in template_slots {
                let n = diesel::insert_into(event_slots::table)
                    .values((
                        event_slots::public_id.eq(gen_public_id()),
                        event_slots::tenant_id.eq(tenant_id),
                        event_slots::event_id.eq(event.id),
                        event_slots::team_id.eq(slot.team_id),
                        event_slots::skill_id.eq(slot.skill_id),
                        event_slots::quantity.eq(slot.quantity),
                    ))
                    .execute(conn)?;
                debug_assert_eq!(n, 1);
            }
        }

        Ok(event)
    })
}

#[tracing::instrument(skip(conn))]
pub fn get_event(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Event> {
    require_member(requester, tenant_id, conn)?;

    let event = events::table
        .filter(events::id.eq(event_id))
        .filter(events::tenant_id.eq(tenant_id))
        .first::<Event>(conn)
        .optional()?;

    event.ok_or_else(|| {
        ServiceError::not_found("Event not found in this tenant")
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_events(
    requester: &User,
    tenant_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<Event>> {
    require_member(requester, tenant_id, conn)?;

    let events = events::table
        .filter(events::tenant_id.eq(tenant_id))
        .order_by(events::date.asc())
        .load::<Event>(conn)?;

    Ok(events)
}

#[derive(AsChangeset, Debug, Default, Clone, Serialize, Deserialize)]
#[diesel(table_name = events)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub status: Option<String>,
}

#[tracing::instrument(skip(conn))]
pub fn update_event(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    update: UpdateEvent,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Event> {
    require_manager(requester, tenant_id, conn)?;

    if update.name.is_none()
        && update.date.is_none()
        && update.status.is_none()
    {
        return Err(ServiceError::invalid("No fields to update"));
    }

    if let Some(status) = update.status.as_deref() {
        if !EVENT_STATUSES.contains(&status) {
            return Err(ServiceError::invalid("Invalid event status"));
        }
    }

    conn.transaction(|conn| {
        let event = diesel::update(
            events::table
                .filter(events::id.eq(event_id))
                .filter(events::tenant_id.eq(tenant_id)),
        )
        .set(&update)
        .returning(events::all_columns)
        .get_result::<Event>(conn)
        .optional()?;

        event.ok_or_else(|| {
            ServiceError::not_found("Event not found in this tenant")
        })
    })
}

#[tracing::instrument(skip(conn))]
pub fn delete_event(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        events::table
            .filter(events::id.eq(event_id))
            .filter(events::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found(
            "Event not found in this tenant",
        ));
    }

    Ok(())
}

/// Adds a slot to an event directly (without going through a template).
/// The team check runs before the skill-in-team check; the distinction in
/// the rejection messages is relied upon by callers.
#[tracing::instrument(skip(conn))]
pub fn create_slot(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    team_id: i64,
    skill_id: i64,
    quantity: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<EventSlot> {
    require_manager(requester, tenant_id, conn)?;

    if quantity < 1 {
        return Err(ServiceError::invalid("Quantity must be at least 1"));
    }

    conn.transaction(|conn| {
        let event_in_tenant = select(exists(
            events::table
                .filter(events::id.eq(event_id))
                .filter(events::tenant_id.eq(tenant_id)),
        ))
        .get_result::<bool>(conn)?;
        if !event_in_tenant {
            return Err(ServiceError::not_found(
                "Event not found in this tenant",
            ));
        }

        check_slot_requirement(tenant_id, team_id, skill_id, conn)?;

        let slot = diesel::insert_into(event_slots::table)
            .values((
                event_slots::public_id.eq(gen_public_id()),
                event_slots::tenant_id.eq(tenant_id),
                event_slots::event_id.eq(event_id),
                event_slots::team_id.eq(team_id),
                event_slots::skill_id.eq(skill_id),
                event_slots::quantity.eq(quantity),
            ))
            .returning(event_slots::all_columns)
            .get_result::<EventSlot>(conn)?;

        Ok(slot)
    })
}

#[tracing::instrument(skip(conn))]
pub fn list_slots(
    requester: &User,
    tenant_id: i64,
    event_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<Vec<EventSlot>> {
    require_member(requester, tenant_id, conn)?;

    let slots = event_slots::table
        .filter(event_slots::tenant_id.eq(tenant_id))
        .filter(event_slots::event_id.eq(event_id))
        .order_by(event_slots::id.asc())
        .load::<EventSlot>(conn)?;

    Ok(slots)
}

#[tracing::instrument(skip(conn))]
pub fn update_slot(
    requester: &User,
    tenant_id: i64,
    slot_id: i64,
    quantity: Option<i64>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<EventSlot> {
    require_manager(requester, tenant_id, conn)?;

    let quantity = match quantity {
        Some(quantity) => quantity,
        None => return Err(ServiceError::invalid("No fields to update")),
    };
    if quantity < 1 {
        return Err(ServiceError::invalid("Quantity must be at least 1"));
    }

    let slot = diesel::update(
        event_slots::table
            .filter(event_slots::id.eq(slot_id))
            .filter(event_slots::tenant_id.eq(tenant_id)),
    )
    .set(event_slots::quantity.eq(quantity))
    .returning(event_slots::all_columns)
    .get_result::<EventSlot>(conn)
    .optional()?;

    slot.ok_or_else(|| ServiceError::not_found("Event slot not found"))
}

#[tracing::instrument(skip(conn))]
pub fn delete_slot(
    requester: &User,
    tenant_id: i64,
    slot_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    require_manager(requester, tenant_id, conn)?;

    let n = diesel::delete(
        event_slots::table
            .filter(event_slots::id.eq(slot_id))
            .filter(event_slots::tenant_id.eq(tenant_id)),
    )
    .execute(conn)?;

    if n == 0 {
        return Err(ServiceError::not_found("Event slot not found"));
    }

    Ok(())
}

/// A slot's (team, skill) requirement must name a team in the tenant and a
/// skill owned by that team, in that order of checks.
fn check_slot_requirement(
    tenant_id: i64,
    team_id: i64,
    skill_id: i64,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> ServiceResult<()> {
    let team_in_tenant = select(exists(
        teams::table
            .filter(teams::id.eq(team_id))
            .filter(teams::tenant_id.eq(tenant_id)),
    ))
    .get_result::<bool>(conn)?;
    if !team_in_tenant {
        return Err(ServiceError::not_found("Team not found in this tenant"));
    }

    let skill_in_team = select(exists(
        skills::table
            .filter(skills::id.eq(skill_id))
            .filter(skills::tenant_id.eq(tenant_id))
            .filter(skills::team_id.eq(team_id)),
    ))
    .get_result::<bool>(conn)?;
    if !skill_in_team {
        return Err(ServiceError::not_found("Skill not found in this team"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        fixtures::{insert_tenant, insert_user, tenancy, test_conn},
        teams::{create_skill, create_team},
    };

    fn sunday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn event_from_template_snapshots_the_slots() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let team = create_team(
            &t.manager, t.tenant_id, "Sound", None, &mut conn,
        )
        .unwrap();
        let foh = create_skill(
            &t.manager, t.tenant_id, team.id, "FOH", &mut conn,
        )
        .unwrap();

        let template = create_template(
            &t.manager,
            t.tenant_id,
            "Sunday service",
            None,
            &mut conn,
        )
        .unwrap();
        add_template_slot(
            &t.manager,
            t.tenant_id,
            template.id,
            team.id,
            foh.id,
            2,
            &mut conn,
        )
        .unwrap();

        let event = create_event(
            &t.manager,
            t.tenant_id,
            "Sunday",
            sunday_morning(),
            Some(template.id),
            &mut conn,
        )
        .unwrap();
        assert_eq!(event.status, "draft");
        assert_eq!(event.template_id, Some(template.id));

        let slots =
            list_slots(&t.manager, t.tenant_id, event.id, &mut conn)
                .unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(
            (slots[0].team_id, slots[0].skill_id, slots[0].quantity),
            (team.id, foh.id, 2)
        );

        // growing the template afterwards does not touch the event
        let monitor = create_skill(
            &t.manager, t.tenant_id, team.id, "Monitor", &mut conn,
        )
        .unwrap();
        add_template_slot(
            &t.manager,
            t.tenant_id,
            template.id,
            team.id,
            monitor.id,
            1,
            &mut conn,
        )
        .unwrap();
        assert_eq!(
            list_slots(&t.manager, t.tenant_id, event.id, &mut conn)
                .unwrap()
                .len(),
            1
        );

        // deleting the template nulls the provenance reference but leaves
        // the copied slot alone
        delete_template(&t.manager, t.tenant_id, template.id, &mut conn)
            .unwrap();
        let event =
            get_event(&t.manager, t.tenant_id, event.id, &mut conn)
                .unwrap();
        assert_eq!(event.template_id, None);
        assert_eq!(
            list_slots(&t.manager, t.tenant_id, event.id, &mut conn)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn event_without_template_starts_empty() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);

        let event = create_event(
            &t.manager,
            t.tenant_id,
            "Ad-hoc",
            sunday_morning(),
            None,
            &mut conn,
        )
        .unwrap();
        assert!(
            list_slots(&t.manager, t.tenant_id, event.id, &mut conn)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn template_must_belong_to_the_tenant() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let other_tenant = insert_tenant(&mut conn, "Rival Church");
        let root = insert_user(&mut conn, "root@example.com", true);
        let foreign_template = create_template(
            &root, other_tenant.id, "Their template", None, &mut conn,
        )
        .unwrap();

        let err = create_event(
            &t.manager,
            t.tenant_id,
            "Sunday",
            sunday_morning(),
            Some(foreign_template.id),
            &mut conn,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ServiceError::not_found("Template not found in this tenant")
        );
    }

    #[test]
    fn slot_requirement_checks_team_before_skill() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let sound = create_team(
            &t.manager, t.tenant_id, "Sound", None, &mut conn,
        )
        .unwrap();
        let worship = create_team(
            &t.manager, t.tenant_id, "Worship", None, &mut conn,
        )
        .unwrap();
        let vocals = create_skill(
            &t.manager, t.tenant_id, worship.id, "Vocals", &mut conn,
        )
        .unwrap();
        let event = create_event(
            &t.manager,
            t.tenant_id,
            "Sunday",
            sunday_morning(),
            None,
            &mut conn,
        )
        .unwrap();

        let err = create_slot(
            &t.manager,
            t.tenant_id,
            event.id,
            9999,
            vocals.id,
            1,
            &mut conn,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ServiceError::not_found("Team not found in this tenant")
        );

        // the team resolves, but the skill is owned by another team
        let err = create_slot(
            &t.manager,
            t.tenant_id,
            event.id,
            sound.id,
            vocals.id,
            1,
            &mut conn,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ServiceError::not_found("Skill not found in this team")
        );
    }

    #[test]
    fn update_event_guards_payload_and_status() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let event = create_event(
            &t.manager,
            t.tenant_id,
            "Sunday",
            sunday_morning(),
            None,
            &mut conn,
        )
        .unwrap();

        let err = update_event(
            &t.manager,
            t.tenant_id,
            event.id,
            UpdateEvent::default(),
            &mut conn,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::invalid("No fields to update"));

        let err = update_event(
            &t.manager,
            t.tenant_id,
            event.id,
            UpdateEvent {
                status: Some("archived".to_string()),
                ..Default::default()
            },
            &mut conn,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::invalid("Invalid event status"));

        let updated = update_event(
            &t.manager,
            t.tenant_id,
            event.id,
            UpdateEvent {
                status: Some("published".to_string()),
                ..Default::default()
            },
            &mut conn,
        )
        .unwrap();
        assert_eq!(updated.status, "published");
    }

    #[test]
    fn update_slot_changes_quantity_only() {
        let mut conn = test_conn();
        let t = tenancy(&mut conn);
        let team = create_team(
            &t.manager, t.tenant_id, "Sound", None, &mut conn,
        )
        .unwrap();
        let foh = create_skill(
            &t.manager, t.tenant_id, team.id, "FOH", &mut conn,
        )
        .unwrap();
        let event = create_event(
            &t.manager,
            t.tenant_id,
            "Sunday",
            sunday_morning(),
            None,
            &mut conn,
        )
        .unwrap();
        let slot = create_slot(
            &t.manager,
            t.tenant_id,
            event.id,
            team.id,
            foh.id,
            1,
            &mut conn,
        )
        .unwrap();

        let err = update_slot(
            &t.manager, t.tenant_id, slot.id, None, &mut conn,
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::invalid("No fields to update"));

        let updated = update_slot(
            &t.manager, t.tenant_id, slot.id, Some(3), &mut conn,
        )
        .unwrap();
        assert_eq!(updated.quantity, 3);
    }
}
