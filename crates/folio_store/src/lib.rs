//! sea-orm backed persistence for the folio content store.
//!
//! One [`Store`] per backend dialect exposes typed repositories over every
//! table. Mutations run as audited commands that emit exactly one change
//! event per committed write; reads bypass the command layer.

pub mod command;
pub mod config;
pub mod datastore;
mod db;
pub mod dialect;
pub mod migration;
pub mod record;
pub mod recorder;
pub mod store;

pub use folio_core::*;

pub use command::{
    AuditedCommand, CommandScope, CreateCommand, DeleteCommand, DeleteRecord, InsertRecord, Inserted,
    RecordingMode, UpdateCommand, UpdateRecord, run_create, run_delete, run_update,
};
pub use config::{DatabaseConfig, FolioConfig, PoolConfig};
pub use datastore::{AnyStore, open_store};
pub use dialect::{Dialect, MySql, Postgres, Sqlite};
pub use record::Record;
pub use recorder::TableRecorder;
pub use store::{MysqlStore, PostgresStore, Repo, SqliteStore, Store};
