use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

/// The join of a user to a team. Skill grants hang off this record rather
/// than off the user directly, so a grant is always scoped to one team.
#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct TeamMember {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub role: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct MemberSkill {
    pub id: i64,
    pub public_id: String,
    pub tenant_id: i64,
    pub team_member_id: i64,
    pub skill_id: i64,
    pub proficiency_level: Option<i64>,
    pub created_at: NaiveDateTime,
}
