use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;
use ulid::{Generator, Ulid};
use uuid::Uuid;

use crate::IdError;

/// Length of the canonical Crockford base32 text form.
pub const ID_LEN: usize = 26;

/// Monotonic ULID source. The lock covers only the in-memory timestamp and
/// counter step.
pub struct IdGenerator {
    inner: Mutex<Generator>,
}

static GLOBAL_GENERATOR: Lazy<IdGenerator> = Lazy::new(IdGenerator::new);

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    pub fn global() -> &'static IdGenerator {
        &GLOBAL_GENERATOR
    }

    pub fn next(&self) -> Ulid {
        let mut generator = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match generator.generate() {
                Ok(ulid) => return ulid,
                // Random component exhausted for this millisecond; wait for the clock to move.
                Err(_) => std::thread::yield_now(),
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_ulid(kind: &'static str, value: &str) -> Result<Ulid, IdError> {
    if value.is_empty() {
        return Err(IdError::empty(kind));
    }
    if value.len() != ID_LEN {
        return Err(IdError::invalid(
            kind,
            value,
            format!("expected {ID_LEN} characters, got {}", value.len()),
        ));
    }
    // 26 base32 digits carry 130 bits; the leading digit may only use the low three.
    if !matches!(value.as_bytes()[0], b'0'..=b'7') {
        return Err(IdError::invalid(kind, value, "timestamp overflow"));
    }
    Ulid::from_string(value).map_err(|err| IdError::invalid(kind, value, err.to_string()))
}

/// Shared behaviour of every nominal identifier kind.
pub trait EntityId:
    Copy
    + Eq
    + Ord
    + Hash
    + fmt::Display
    + fmt::Debug
    + Send
    + Sync
    + From<Ulid>
    + Into<Ulid>
    + 'static
{
    const KIND: &'static str;

    fn ulid(&self) -> Ulid;

    fn generate() -> Self {
        Self::from(IdGenerator::global().next())
    }

    fn parse(value: &str) -> Result<Self, IdError> {
        parse_ulid(Self::KIND, value).map(Self::from)
    }

    fn validate(value: &str) -> Result<(), IdError> {
        parse_ulid(Self::KIND, value).map(|_| ())
    }

    /// Creation time embedded in the identifier, at millisecond precision.
    fn time(&self) -> Result<OffsetDateTime, IdError> {
        let millis = i128::from(self.ulid().timestamp_ms());
        OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000)
            .map_err(|err| IdError::invalid(Self::KIND, self.to_string(), err.to_string()))
    }

    fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.ulid().to_bytes())
    }

    fn from_uuid(uuid: Uuid) -> Self {
        Self::from(Ulid::from_bytes(*uuid.as_bytes()))
    }

    fn to_bytes(&self) -> [u8; 16] {
        self.ulid().to_bytes()
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        let raw: [u8; 16] = bytes.try_into().map_err(|_| {
            IdError::invalid(
                Self::KIND,
                format!("{} bytes", bytes.len()),
                "expected 16 bytes",
            )
        })?;
        Ok(Self::from(Ulid::from_bytes(raw)))
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(Ulid);

        impl $name {
            pub fn new() -> Self {
                <Self as EntityId>::generate()
            }

            pub fn parse(value: &str) -> Result<Self, IdError> {
                <Self as EntityId>::parse(value)
            }

            pub fn validate(value: &str) -> Result<(), IdError> {
                <Self as EntityId>::validate(value)
            }

            pub fn time(&self) -> Result<OffsetDateTime, IdError> {
                <Self as EntityId>::time(self)
            }
        }

        impl EntityId for $name {
            const KIND: &'static str = $kind;

            fn ulid(&self) -> Ulid {
                self.0
            }
        }

        impl From<Ulid> for $name {
            fn from(value: Ulid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Ulid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                <Self as EntityId>::parse(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                <Self as EntityId>::parse(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

entity_id!(UserId, "user");
entity_id!(RoleId, "role");
entity_id!(PermissionId, "permission");
entity_id!(RouteId, "route");
entity_id!(AdminRouteId, "admin route");
entity_id!(ContentDataId, "content data");
entity_id!(AdminContentDataId, "admin content data");
entity_id!(ContentFieldId, "content field");
entity_id!(AdminContentFieldId, "admin content field");
entity_id!(FieldId, "field");
entity_id!(AdminFieldId, "admin field");
entity_id!(DatatypeId, "datatype");
entity_id!(AdminDatatypeId, "admin datatype");
entity_id!(DatatypeFieldId, "datatype field");
entity_id!(MediaId, "media");
entity_id!(MediaDimensionId, "media dimension");
entity_id!(SessionId, "session");
entity_id!(TokenId, "token");
entity_id!(UserOauthId, "user oauth");
entity_id!(UserSshKeyId, "user ssh key");
entity_id!(
    /// Identifies one recorded change event.
    EventId,
    "event"
);
entity_id!(
    /// Identifies the process or host that originated a mutation.
    NodeId,
    "node"
);
entity_id!(BackupId, "backup");
entity_id!(BackupSetId, "backup set");
entity_id!(TableId, "table");
