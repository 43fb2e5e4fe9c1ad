use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{NewUser, User};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// REST DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserReq {
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body for every message-only outcome: `{"msg": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub msg: String,
}

impl MessageDto {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            cpf: user.cpf,
            email: user.email,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            name: req.name,
            cpf: req.cpf,
            email: req.email,
            phone: req.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn create_request_phone_is_optional() {
        let req: CreateUserReq =
            serde_json::from_str(r#"{"name":"Ana","cpf":"111","email":"a@x.com"}"#).unwrap();
        let new_user = NewUser::from(req);
        assert_eq!(new_user.cpf, "111");
        assert_eq!(new_user.email, "a@x.com");
        assert_eq!(new_user.phone, None);
    }

    #[test]
    fn user_dto_serializes_all_fields() {
        let at = Utc.with_ymd_and_hms(2023, 11, 14, 12, 0, 0).unwrap();
        let dto = UserDto::from(User {
            id: 3,
            name: "Ana".to_string(),
            cpf: "111".to_string(),
            email: "a@x.com".to_string(),
            phone: Some("555-0100".to_string()),
            created_at: at,
        });

        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["id"], 3);
        assert_eq!(v["cpf"], "111");
        assert_eq!(v["phone"], "555-0100");
        assert_eq!(v["created_at"], "2023-11-14T12:00:00Z");
    }
}
