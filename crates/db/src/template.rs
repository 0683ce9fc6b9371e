use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

/// A reusable event definition. Creating an event from a template copies the
/// template's slots into the event at that moment; the template can then be
/// edited or deleted without affecting the event.
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct EventTemplate {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// "`quantity` people from `team_id` holding `skill_id`."
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct EventTemplateSlot {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub template_id: i64,
    pub team_id: i64,
    pub skill_id: i64,
    pub quantity: i64,
}
