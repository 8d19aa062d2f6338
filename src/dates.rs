use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `YYYY-MM-DD` serde representation for `Date` fields.
pub mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(super::ISO_DATE)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("expected YYYY-MM-DD, got {raw:?}")))
    }
}

pub fn parse_iso_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), ISO_DATE).ok()
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Whole years between `birthday` and `on`.
pub fn age_on(birthday: Date, on: Date) -> i32 {
    let mut age = on.year() - birthday.year();
    if (on.month() as u8, on.day()) < (birthday.month() as u8, birthday.day()) {
        age -= 1;
    }
    age
}
