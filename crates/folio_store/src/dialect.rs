//! Backend dialects.
//!
//! Each dialect fixes the native Rust shape of identifier, timestamp and flag
//! columns for one engine, and how statements are rendered for it:
//!
//! | dialect  | id            | timestamp                  | flag      |
//! |----------|---------------|----------------------------|-----------|
//! | SQLite   | `TEXT` (26)   | `TEXT` RFC 3339            | `INTEGER` |
//! | Postgres | `uuid`        | `timestamp with time zone` | `boolean` |
//! | MySQL    | `BINARY(16)`  | `DATETIME`                 | `TINYINT` |

use sea_orm::sea_query::{
    MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SqliteQueryBuilder,
    Value as SeaValue,
};
use sea_orm::{DatabaseBackend, Statement, TryGetable};
use time::{OffsetDateTime, PrimitiveDateTime};
use ulid::Ulid;
use uuid::Uuid;

use folio_core::{StoreError, StoreResult, Timestamp, parse_ulid};

pub trait Dialect: Send + Sync + 'static {
    const NAME: &'static str;
    const BACKEND: DatabaseBackend;
    /// Whether an insert can hand back the stored row with `RETURNING`.
    const RETURNING: bool;

    type Id: TryGetable + Clone + Send + Sync + 'static;
    type Time: TryGetable + Send + Sync + 'static;
    type Flag: TryGetable + Send + Sync + 'static;

    fn id_value(id: Option<Ulid>) -> SeaValue;
    fn id_from_native(value: Self::Id) -> StoreResult<Ulid>;
    fn time_value(ts: Option<Timestamp>) -> SeaValue;
    fn time_from_native(value: Self::Time) -> StoreResult<Timestamp>;
    fn flag_value(flag: bool) -> SeaValue;
    fn flag_from_native(value: Self::Flag) -> bool;

    fn build<S: QueryStatementWriter>(stmt: &S) -> Statement {
        let (sql, values) = match Self::BACKEND {
            DatabaseBackend::Postgres => stmt.build(PostgresQueryBuilder),
            DatabaseBackend::MySql => stmt.build(MysqlQueryBuilder),
            _ => stmt.build(SqliteQueryBuilder),
        };
        Statement::from_sql_and_values(Self::BACKEND, sql, values)
    }
}

pub struct Sqlite;

pub struct Postgres;

pub struct MySql;

impl Dialect for Sqlite {
    const NAME: &'static str = "sqlite";
    const BACKEND: DatabaseBackend = DatabaseBackend::Sqlite;
    const RETURNING: bool = true;

    type Id = String;
    type Time = String;
    type Flag = i64;

    fn id_value(id: Option<Ulid>) -> SeaValue {
        SeaValue::from(id.map(|id| id.to_string()))
    }

    fn id_from_native(value: String) -> StoreResult<Ulid> {
        parse_ulid("stored", &value).map_err(|err| StoreError::storage(err.to_string()))
    }

    fn time_value(ts: Option<Timestamp>) -> SeaValue {
        SeaValue::from(ts.map(Timestamp::to_rfc3339))
    }

    fn time_from_native(value: String) -> StoreResult<Timestamp> {
        Timestamp::parse_rfc3339(&value)
    }

    fn flag_value(flag: bool) -> SeaValue {
        SeaValue::from(i64::from(flag))
    }

    fn flag_from_native(value: i64) -> bool {
        value != 0
    }
}

impl Dialect for Postgres {
    const NAME: &'static str = "postgres";
    const BACKEND: DatabaseBackend = DatabaseBackend::Postgres;
    const RETURNING: bool = true;

    type Id = Uuid;
    type Time = OffsetDateTime;
    type Flag = bool;

    fn id_value(id: Option<Ulid>) -> SeaValue {
        SeaValue::from(id.map(|id| Uuid::from_bytes(id.to_bytes())))
    }

    fn id_from_native(value: Uuid) -> StoreResult<Ulid> {
        Ok(Ulid::from_bytes(*value.as_bytes()))
    }

    fn time_value(ts: Option<Timestamp>) -> SeaValue {
        SeaValue::from(ts.map(Timestamp::as_datetime))
    }

    fn time_from_native(value: OffsetDateTime) -> StoreResult<Timestamp> {
        Ok(Timestamp::from_datetime(value))
    }

    fn flag_value(flag: bool) -> SeaValue {
        SeaValue::from(flag)
    }

    fn flag_from_native(value: bool) -> bool {
        value
    }
}

impl Dialect for MySql {
    const NAME: &'static str = "mysql";
    const BACKEND: DatabaseBackend = DatabaseBackend::MySql;
    // MySQL has no RETURNING; inserts are followed by a read of the new row.
    const RETURNING: bool = false;

    type Id = Vec<u8>;
    type Time = PrimitiveDateTime;
    type Flag = i8;

    fn id_value(id: Option<Ulid>) -> SeaValue {
        SeaValue::from(id.map(|id| id.to_bytes().to_vec()))
    }

    fn id_from_native(value: Vec<u8>) -> StoreResult<Ulid> {
        let raw: [u8; 16] = value
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::storage(format!("invalid id length {}", value.len())))?;
        Ok(Ulid::from_bytes(raw))
    }

    fn time_value(ts: Option<Timestamp>) -> SeaValue {
        SeaValue::from(ts.map(Timestamp::to_primitive))
    }

    fn time_from_native(value: PrimitiveDateTime) -> StoreResult<Timestamp> {
        Ok(Timestamp::from_primitive(value))
    }

    fn flag_value(flag: bool) -> SeaValue {
        SeaValue::from(i8::from(flag))
    }

    fn flag_from_native(value: i8) -> bool {
        value != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{EntityId, UserId};

    fn id_roundtrip<D: Dialect>(native: impl Fn(Ulid) -> D::Id) {
        let id = UserId::new();
        let back = D::id_from_native(native(id.ulid())).expect("decode");
        assert_eq!(UserId::from(back), id);
    }

    #[test]
    fn native_ids_roundtrip_on_every_dialect() {
        id_roundtrip::<Sqlite>(|id| id.to_string());
        id_roundtrip::<Postgres>(|id| Uuid::from_bytes(id.to_bytes()));
        id_roundtrip::<MySql>(|id| id.to_bytes().to_vec());
    }

    #[test]
    fn native_times_roundtrip_on_every_dialect() {
        let ts = Timestamp::now();
        assert_eq!(Sqlite::time_from_native(ts.to_rfc3339()).expect("sqlite"), ts);
        assert_eq!(Postgres::time_from_native(ts.as_datetime()).expect("pg"), ts);
        assert_eq!(MySql::time_from_native(ts.to_primitive()).expect("mysql"), ts);
    }

    #[test]
    fn malformed_native_ids_are_rejected() {
        assert!(Sqlite::id_from_native("not-an-id".to_string()).is_err());
        assert!(MySql::id_from_native(vec![1, 2, 3]).is_err());
    }

    #[test]
    fn null_ids_render_as_sql_null() {
        assert_eq!(Sqlite::id_value(None), SeaValue::String(None));
        assert!(Sqlite::flag_from_native(1));
        assert!(!MySql::flag_from_native(0));
    }
}
