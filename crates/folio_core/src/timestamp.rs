use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{StoreError, StoreResult};

/// UTC wall-clock time at whole-second precision.
///
/// Every backend can hold a second-precision value losslessly, so entities read
/// back from SQLite, Postgres and MySQL compare equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    pub fn from_datetime(value: OffsetDateTime) -> Self {
        let utc = value.to_offset(UtcOffset::UTC);
        Self(utc.replace_nanosecond(0).unwrap_or(utc))
    }

    pub fn from_unix(seconds: i64) -> StoreResult<Self> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|err| StoreError::validation(format!("timestamp {seconds}: {err}")))
    }

    pub fn unix(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn as_datetime(self) -> OffsetDateTime {
        self.0
    }

    /// Naive UTC form for columns without zone information.
    pub fn to_primitive(self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.0.date(), self.0.time())
    }

    pub fn from_primitive(value: PrimitiveDateTime) -> Self {
        Self::from_datetime(value.assume_utc())
    }

    pub fn to_rfc3339(self) -> String {
        // Formatting a UTC second-precision value with Rfc3339 cannot fail.
        self.0.format(&Rfc3339).unwrap_or_default()
    }

    pub fn parse_rfc3339(value: &str) -> StoreResult<Self> {
        OffsetDateTime::parse(value, &Rfc3339)
            .map(Self::from_datetime)
            .map_err(|err| StoreError::storage(format!("invalid timestamp '{value}': {err}")))
    }

    pub fn checked_add_seconds(self, seconds: i64) -> Option<Self> {
        self.0
            .checked_add(time::Duration::seconds(seconds))
            .map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Timestamp::parse_rfc3339(&value).map_err(serde::de::Error::custom)
    }
}
