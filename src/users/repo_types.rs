use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates::iso_date;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Case-insensitive; anything but male/female is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// User record in `users.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique across all users.
    pub username: String,
    /// Argon2 PHC string.
    #[serde(rename = "password")]
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub gender: Gender,
    #[serde(with = "iso_date")]
    pub birthday: Date,
}
