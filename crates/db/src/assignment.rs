use chrono::NaiveDateTime;
use diesel::connection::LoadConnection;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use serde::Serialize;

use crate::schema::{event_assignments, event_slots};

/// The record that one person fills one unit of one slot in one event.
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct EventAssignment {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub event_id: i64,
    pub slot_id: i64,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
}

/// An existing assignment joined to its slot's requirement, as consumed by
/// the eligibility checks.
#[derive(Debug, Queryable, Clone, PartialEq, Eq)]
pub struct AssignedRequirement {
    pub assignment_id: i64,
    pub team_id: i64,
    pub skill_id: i64,
}

impl EventAssignment {
    /// Every assignment this user already holds within the event, joined to
    /// the slots to recover each one's (team, skill) requirement.
    #[tracing::instrument(name = "EventAssignment::held_in_event", skip(conn))]
    pub fn held_in_event(
        event_id: i64,
        user_id: i64,
        conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
    ) -> Result<Vec<AssignedRequirement>, diesel::result::Error> {
        event_assignments::table
            .inner_join(event_slots::table)
            .filter(event_assignments::event_id.eq(event_id))
            .filter(event_assignments::user_id.eq(user_id))
            .order_by(event_assignments::id.asc())
            .select((
                event_assignments::id,
                event_slots::team_id,
                event_slots::skill_id,
            ))
            .load::<AssignedRequirement>(conn)
    }
}
