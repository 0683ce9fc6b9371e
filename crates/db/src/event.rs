use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

pub const EVENT_STATUS_DRAFT: &str = "draft";
pub const EVENT_STATUS_PUBLISHED: &str = "published";
pub const EVENT_STATUS_COMPLETED: &str = "completed";
pub const EVENT_STATUS_CANCELLED: &str = "cancelled";

pub const EVENT_STATUSES: [&str; 4] = [
    EVENT_STATUS_DRAFT,
    EVENT_STATUS_PUBLISHED,
    EVENT_STATUS_COMPLETED,
    EVENT_STATUS_CANCELLED,
];

#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct Event {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    /// Provenance only: the template the event was instantiated from, nulled
    /// if that template is later deleted. Not a live join.
    pub template_id: Option<i64>,
    pub name: String,
    pub date: NaiveDateTime,
    // one of "draft", "published", "completed", "cancelled"
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct EventSlot {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub event_id: i64,
    pub team_id: i64,
    pub skill_id: i64,
    pub quantity: i64,
}

#[cfg(test)]
mod test_serialization {
    use chrono::NaiveDate;

    use super::{Event, EVENT_STATUS_DRAFT};

    #[test]
    fn event_serializes_nullable_provenance_as_null() {
        let date = NaiveDate::from_ymd_opt(2026, 9, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let event = Event {
            id: 1,
            public_id: "0192d3ce-4c00-7000-8000-000000000000".to_string(),
            tenant_id: 1,
            template_id: None,
            name: "Sunday".to_string(),
            date,
            status: EVENT_STATUS_DRAFT.to_string(),
            created_at: date,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["template_id"], serde_json::Value::Null);
        assert_eq!(value["status"], "draft");
    }
}
