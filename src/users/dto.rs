use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates::iso_date;
use crate::orders::repo_types::Order;
use crate::users::repo_types::Gender;

/// Request body for `POST /register`. Fields are optional so missing ones
/// produce a validation message rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub surname: String,
    pub gender: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /user/:username`; absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub surname: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
}

/// Profile returned by `GET /user/:username`, with the user's orders.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub gender: Gender,
    #[serde(with = "iso_date")]
    pub birthday: Date,
    pub orders: Vec<Order>,
}
