//! Uniform `{code, payload}` result descriptor.
//!
//! Every service outcome converts into exactly one descriptor. The REST layer
//! turns `code` into the response status and sends `payload` either as the
//! data itself or wrapped as `{"msg": ...}`.

use crate::contract::model::User;
use crate::contract::outcome::{Creation, Lookup, Removal, UniqueField};

pub const CODE_OK: u16 = 200;
pub const CODE_CREATED: u16 = 201;
pub const CODE_NOT_FOUND: u16 = 404;
pub const CODE_CONFLICT: u16 = 409;

pub const MSG_USER_NOT_FOUND: &str = "User not found";
pub const MSG_CPF_EXISTS: &str = "Cpf already exists";
pub const MSG_EMAIL_EXISTS: &str = "Email already exists";
pub const MSG_USER_CREATED: &str = "User create with successful";
pub const MSG_USER_REMOVED: &str = "User removed with successful";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<T> {
    Data(T),
    Message(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDescriptor<T> {
    pub code: u16,
    pub payload: Payload<T>,
}

impl<T> ResultDescriptor<T> {
    pub fn data(code: u16, data: T) -> Self {
        Self {
            code,
            payload: Payload::Data(data),
        }
    }

    pub fn message(code: u16, msg: &'static str) -> Self {
        Self {
            code,
            payload: Payload::Message(msg),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Transform the data payload, leaving messages untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultDescriptor<U> {
        let payload = match self.payload {
            Payload::Data(d) => Payload::Data(f(d)),
            Payload::Message(m) => Payload::Message(m),
        };
        ResultDescriptor {
            code: self.code,
            payload,
        }
    }
}

impl UniqueField {
    pub fn conflict_message(self) -> &'static str {
        match self {
            UniqueField::Cpf => MSG_CPF_EXISTS,
            UniqueField::Email => MSG_EMAIL_EXISTS,
        }
    }
}

impl From<Vec<User>> for ResultDescriptor<Vec<User>> {
    fn from(users: Vec<User>) -> Self {
        Self::data(CODE_OK, users)
    }
}

impl From<Lookup> for ResultDescriptor<User> {
    fn from(lookup: Lookup) -> Self {
        match lookup {
            Lookup::Found(user) => Self::data(CODE_OK, user),
            Lookup::NotFound => Self::message(CODE_NOT_FOUND, MSG_USER_NOT_FOUND),
        }
    }
}

// Creation and removal carry no data; `()` marks the absent payload type.
impl From<Creation> for ResultDescriptor<()> {
    fn from(creation: Creation) -> Self {
        match creation {
            Creation::Created => Self::message(CODE_CREATED, MSG_USER_CREATED),
            Creation::Conflict(field) => Self::message(CODE_CONFLICT, field.conflict_message()),
        }
    }
}

impl From<Removal> for ResultDescriptor<()> {
    fn from(removal: Removal) -> Self {
        match removal {
            Removal::Removed => Self::message(CODE_OK, MSG_USER_REMOVED),
            Removal::NotFound => Self::message(CODE_NOT_FOUND, MSG_USER_NOT_FOUND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Ana".to_string(),
            cpf: "111".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lookup_maps_to_200_or_404() {
        let user = sample_user();
        let found = ResultDescriptor::from(Lookup::Found(user.clone()));
        assert_eq!(found, ResultDescriptor::data(200, user));

        let missing = ResultDescriptor::from(Lookup::NotFound);
        assert_eq!(missing.code, 404);
        assert_eq!(missing.payload, Payload::Message("User not found"));
        assert!(!missing.is_success());
    }

    #[test]
    fn creation_conflicts_name_the_field() {
        let cpf = ResultDescriptor::from(Creation::Conflict(UniqueField::Cpf));
        assert_eq!(cpf, ResultDescriptor::message(409, "Cpf already exists"));

        let email = ResultDescriptor::from(Creation::Conflict(UniqueField::Email));
        assert_eq!(email, ResultDescriptor::message(409, "Email already exists"));

        let created = ResultDescriptor::from(Creation::Created);
        assert_eq!(
            created,
            ResultDescriptor::message(201, "User create with successful")
        );
        assert!(created.is_success());
    }

    #[test]
    fn removal_maps_to_200_or_404() {
        assert_eq!(
            ResultDescriptor::from(Removal::Removed),
            ResultDescriptor::message(200, "User removed with successful")
        );
        assert_eq!(
            ResultDescriptor::from(Removal::NotFound),
            ResultDescriptor::message(404, "User not found")
        );
    }

    #[test]
    fn empty_list_is_still_success() {
        let d = ResultDescriptor::from(Vec::<User>::new());
        assert_eq!(d.code, 200);
        assert_eq!(d.payload, Payload::Data(vec![]));
    }

    #[test]
    fn map_keeps_messages() {
        let d: ResultDescriptor<User> = ResultDescriptor::from(Lookup::NotFound);
        let mapped = d.map(|u| u.id);
        assert_eq!(mapped, ResultDescriptor::message(404, "User not found"));

        let d = ResultDescriptor::from(Lookup::Found(sample_user())).map(|u| u.id);
        assert_eq!(d.payload, Payload::Data(1));
    }
}
