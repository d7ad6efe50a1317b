//! User entity model and DTOs.

use ott_core::enums::UserStatus;
use ott_core::error::CoreError;
use ott_core::password::{hash_password, MIN_PASSWORD_LENGTH};
use ott_core::repository::{Entity, FileSlot, MediaKind};
use ott_core::types::{DbId, Timestamp};
use ott_core::validation::{Check, DefaultValue, FieldKind, FieldRule, Payload, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `users` table. The password hash never leaves the server.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    pub image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub status: Option<UserStatus>,
    pub image: Option<String>,
}

pub static USER_SCHEMA: Schema = Schema::new(
    "User",
    &[
        FieldRule::required("name", FieldKind::Text),
        FieldRule::required("email", FieldKind::Text).checks(&[Check::Email]),
        FieldRule::required("password", FieldKind::Text)
            .checks(&[Check::MinLength(MIN_PASSWORD_LENGTH)]),
        FieldRule::optional("status", FieldKind::Text)
            .checks(&[Check::OneOf(UserStatus::VALUES)])
            .default_to(DefaultValue::Text("ACTIVE")),
        FieldRule::optional("image", FieldKind::Text),
    ],
);

impl Entity for User {
    type Create = CreateUser;
    type Update = UpdateUser;

    const NAME: &'static str = "User";
    const LABEL: &'static str = "User";
    const PLURAL: &'static str = "Users";
    const COUNT_KEY: &'static str = "totalUsers";
    const FILE_SLOTS: &'static [FileSlot] = &[FileSlot::single("image", "image", MediaKind::Image)];
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email"];
    const FILTER_FIELDS: &'static [&'static str] = &["status"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn id(&self) -> DbId {
        self.id
    }

    fn artifacts(&self) -> Vec<String> {
        self.image.iter().cloned().collect()
    }

    /// Replace the plaintext password with its hash.
    fn prepare(payload: &mut Payload) -> Result<(), CoreError> {
        if let Some(Value::String(password)) = payload.remove("password") {
            payload.insert("passwordHash".into(), Value::String(hash_password(&password)?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            status: UserStatus::Active,
            image: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["status"], "ACTIVE");
    }

    #[test]
    fn prepare_hashes_password() {
        let mut payload = Payload::new();
        payload.insert("password".into(), Value::from("secret1"));
        User::prepare(&mut payload).unwrap();
        assert!(payload.get("password").is_none());
        let hash = payload["passwordHash"].as_str().unwrap();
        assert!(ott_core::password::verify_password("secret1", hash).unwrap());
    }
}
