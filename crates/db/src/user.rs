use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Queryable, Serialize, Clone, Hash, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub username: Option<String>,
    pub email: String,
    pub created_at: NaiveDateTime,
    /// Platform administrators bypass every tenant-scoped permission check.
    pub is_superuser: bool,
}
