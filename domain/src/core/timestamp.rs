//! Wall-clock timestamps shared by all entities.
//!
//! Entities record local time and serialize it as `YYYY-MM-DD HH:MM:SS`,
//! the format front ends already parse.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serializer};

/// Display/serialization format for entity timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Serde adapter for `DateTime<Local>` fields.
pub mod local_time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<DateTime<Local>>` fields.
pub mod local_time_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Local>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&v.format(TIMESTAMP_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Local>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        raw.map(|r| parse(&r).map_err(serde::de::Error::custom))
            .transpose()
    }
}

fn parse(raw: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| e.to_string())?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("nonexistent local time: {}", raw))
}
