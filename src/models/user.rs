use serde::{Deserialize, Serialize};

/// A participant in a numbered room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned primary key, never reused
    pub id: i64,
    /// Numeric display name
    pub name: i64,
    /// Room number the user belongs to
    pub room: i64,
    /// Unix seconds at creation
    pub created_at: i64,
    /// Unix seconds of the last write; equal to `created_at` since users are immutable
    pub updated_at: i64,
}

/// Body of `PUT /user`.
///
/// Both fields are optional at the decoding layer so that a missing or null
/// field is reported as a validation failure instead of a decoder rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<i64>,
    pub room: Option<i64>,
}

/// A create payload with every required field present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewUser {
    pub name: i64,
    pub room: i64,
}

impl CreateUserRequest {
    /// Returns the complete payload, or the name of the first missing field.
    pub fn into_new_user(self) -> Result<NewUser, &'static str> {
        let name = self.name.ok_or("name")?;
        let room = self.room.ok_or("room")?;

        Ok(NewUser { name, room })
    }
}
