use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Queryable, Serialize, Deserialize, Clone, Hash, PartialEq, Eq,
)]
pub struct Team {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A capability tag. Each skill is owned by exactly one team; people are
/// granted skills through their membership of that team.
#[derive(
    Debug, Queryable, Serialize, Deserialize, Clone, Hash, PartialEq, Eq,
)]
pub struct Skill {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub team_id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// An unordered pair of skills which must never both be held by one person
/// within one event. Stored with `skill_id_1 < skill_id_2` so lookups and
/// uniqueness are independent of the order the caller supplied.
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct SkillIncompatibility {
    pub id: i64,
    pub tenant_id: i64,
    pub skill_id_1: i64,
    pub skill_id_2: i64,
    pub created_at: NaiveDateTime,
}

/// Normalises an unordered skill pair into its canonical stored form. Apply
/// at every write and lookup boundary; never store or query with
/// caller-supplied order.
pub fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    (a.min(b), a.max(b))
}
