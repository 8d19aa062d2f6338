use time::Date;
use tracing::{info, instrument, warn};

use crate::{
    dates::{age_on, parse_iso_date, today},
    db::{Collection, RecordStore},
    error::{AppError, AppResult},
    orders::repo_types::Order,
    users::{
        dto::{LoginRequest, RegisterRequest, UpdateUserRequest, UserProfile},
        password::{hash_password, verify_password},
        repo_types::{Gender, User},
    },
};

pub const MIN_AGE: i32 = 18;

/// Trimmed, non-empty value of an optional field.
fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_gender(raw: Option<&str>) -> AppResult<Gender> {
    raw.and_then(Gender::parse)
        .ok_or_else(|| AppError::invalid("Gender must be male or female"))
}

pub(crate) fn validate_birthday(raw: Option<&str>, on: Date) -> AppResult<Date> {
    let birthday = raw
        .and_then(parse_iso_date)
        .ok_or_else(|| AppError::invalid("Birthday must be YYYY-MM-DD"))?;
    if age_on(birthday, on) < MIN_AGE {
        return Err(AppError::BusinessRule(format!(
            "You must be at least {MIN_AGE} to register"
        )));
    }
    Ok(birthday)
}

#[instrument(skip(store, req), fields(username = ?req.username))]
pub async fn register(store: &RecordStore, req: RegisterRequest) -> AppResult<User> {
    let (Some(username), Some(password)) = (
        required(req.username.as_deref()),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::invalid("Username and password required"));
    };
    let gender = parse_gender(req.gender.as_deref())?;
    let name = required(req.name.as_deref()).ok_or_else(|| AppError::invalid("Name is required"))?;
    let birthday = validate_birthday(req.birthday.as_deref(), today())?;

    let _lock = store.lock(&[Collection::Users]).await;
    let mut users = User::load_all(store).await?;
    if User::find(&users, username).is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let user = User {
        username: username.to_string(),
        password_hash: hash_password(password)?,
        name: name.to_string(),
        surname: req.surname.trim().to_string(),
        gender,
        birthday,
    };
    users.push(user.clone());
    User::save_all(store, &users).await?;

    info!(%username, "user registered");
    Ok(user)
}

#[instrument(skip(store, req), fields(username = ?req.username))]
pub async fn login(store: &RecordStore, req: LoginRequest) -> AppResult<User> {
    let (Some(username), Some(password)) = (
        required(req.username.as_deref()),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::invalid("Username and password required"));
    };

    let user = User::find_by_username(store, username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !verify_password(password, &user.password_hash)? {
        warn!(%username, "login wrong password");
        return Err(AppError::invalid("Wrong password"));
    }

    info!(%username, "user logged in");
    Ok(user)
}

#[instrument(skip(store))]
pub async fn profile(store: &RecordStore, username: &str) -> AppResult<UserProfile> {
    let user = User::find_by_username(store, username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let orders = Order::load_all(store).await?;

    Ok(UserProfile {
        orders: Order::by_user(&orders, &user.username),
        username: user.username,
        name: user.name,
        surname: user.surname,
        gender: user.gender,
        birthday: user.birthday,
    })
}

#[instrument(skip(store, req))]
pub async fn update(store: &RecordStore, username: &str, req: UpdateUserRequest) -> AppResult<()> {
    // validate before touching the record so a bad gender leaves it unchanged
    let gender = req
        .gender
        .as_deref()
        .map(|g| parse_gender(Some(g)))
        .transpose()?;

    let _lock = store.lock(&[Collection::Users]).await;
    let mut users = User::load_all(store).await?;
    let user = User::find_mut(&mut users, username)
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        user.password_hash = hash_password(password)?;
    }
    if let Some(surname) = req.surname {
        user.surname = surname.trim().to_string();
    }
    if let Some(gender) = gender {
        user.gender = gender;
    }

    User::save_all(store, &users).await?;
    info!(%username, "user updated");
    Ok(())
}
