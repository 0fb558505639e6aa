use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

/// A directory entry. The credential hash is deliberately absent; see
/// [`AccountCredentials`].
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "email": "siti@office.local",
        "name": "Siti Rahma",
        "role": "staff",
        "position": "Secretary",
        "department": "General Affairs",
        "phone": "+62811000111",
        "image": null,
        "created_at": "2024-01-01T08:00:00",
        "updated_at": "2024-01-01T08:00:00"
    })
)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

/// Account plus its stored argon2 hash, only handed out for login.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: Role,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

/// Lowercased, trimmed form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
