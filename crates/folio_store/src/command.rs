//! Audited commands.
//!
//! Every mutation runs as a command bound to one table, one connection, one
//! parameter set and one audit context. The shared protocol in [`run_create`],
//! [`run_update`] and [`run_delete`] issues the write, and only once it has
//! succeeded hands exactly one [`ChangeEvent`] to the bound recorder.

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::{Asterisk, Expr, Query, SelectStatement, SimpleExpr};
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

use folio_core::{
    AuditContext, ChangeEvent, ChangeRecorder, EntityId, ExecContext, Operation, StoreError,
    StoreResult, TableKind,
};

use crate::dialect::Dialect;
use crate::record::{Record, id_value};

/// What a command does when the recorder rejects an event for a write that
/// already committed. The write itself is never reverted.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    Warn,
    #[default]
    Error,
}

pub trait AuditedCommand: Send + Sync {
    type Connection: ConnectionTrait;

    fn context(&self) -> &ExecContext;
    fn audit_context(&self) -> &AuditContext;
    fn table_name(&self) -> TableKind;
    fn connection(&self) -> &Self::Connection;
    fn recorder(&self) -> &dyn ChangeRecorder;
    fn recording_mode(&self) -> RecordingMode;
}

#[async_trait]
pub trait CreateCommand: AuditedCommand {
    type Params: Serialize + Send + Sync;
    type Row: Send;
    type Entity: Serialize + Send;

    fn params(&self) -> &Self::Params;
    /// Identifier of the row the backend reports as created.
    fn get_id(&self, row: &Self::Row) -> StoreResult<Ulid>;
    /// `Err` means nothing was written. Once the insert has committed a row
    /// must come back, even when reading it back failed.
    async fn execute(&self) -> Result<Self::Row, DbErr>;
    fn map_row(&self, row: Self::Row) -> StoreResult<Self::Entity>;
}

#[async_trait]
pub trait UpdateCommand: AuditedCommand {
    type Id: EntityId;
    type Params: Serialize + Send + Sync;

    fn params(&self) -> &Self::Params;
    fn entity_id(&self) -> Self::Id;
    /// Rows affected.
    async fn execute(&self) -> Result<u64, DbErr>;
}

#[async_trait]
pub trait DeleteCommand: AuditedCommand {
    type Id: EntityId;

    fn params(&self) -> &Self::Id;
    /// Rows affected.
    async fn execute(&self) -> Result<u64, DbErr>;
}

// Writes consult the context once, before they start. An in-flight write is
// never dropped, so a committed row always reaches the recorder.

pub async fn run_create<C: CreateCommand>(cmd: &C) -> StoreResult<C::Entity> {
    let table = cmd.table_name();
    cmd.context().check()?;
    let row = cmd
        .execute()
        .await
        .map_err(|err| StoreError::write(table, Operation::Insert, err))?;
    let entity_id = cmd.get_id(&row)?;
    let entity = cmd.map_row(row);
    let payload = match &entity {
        Ok(entity) => encode_payload(table, Operation::Insert, entity),
        Err(_) => None,
    };
    record(cmd, Operation::Insert, entity_id, payload).await?;
    entity
}

pub async fn run_update<C: UpdateCommand>(cmd: &C) -> StoreResult<()> {
    let table = cmd.table_name();
    let entity_id = cmd.entity_id();
    cmd.context().check()?;
    let affected = cmd
        .execute()
        .await
        .map_err(|err| StoreError::write(table, Operation::Update, err))?;
    if affected == 0 {
        return Err(StoreError::not_found(table, entity_id.to_string()));
    }
    let payload = encode_payload(table, Operation::Update, cmd.params());
    record(cmd, Operation::Update, entity_id.ulid(), payload).await
}

pub async fn run_delete<C: DeleteCommand>(cmd: &C) -> StoreResult<()> {
    let table = cmd.table_name();
    let entity_id = *cmd.params();
    cmd.context().check()?;
    let affected = cmd
        .execute()
        .await
        .map_err(|err| StoreError::write(table, Operation::Delete, err))?;
    if affected == 0 {
        return Err(StoreError::not_found(table, entity_id.to_string()));
    }
    record(cmd, Operation::Delete, entity_id.ulid(), None).await
}

fn encode_payload<T: Serialize + ?Sized>(
    table: TableKind,
    operation: Operation,
    value: &T,
) -> Option<JsonValue> {
    match serde_json::to_value(value) {
        Ok(payload) => Some(payload),
        Err(err) => {
            log::warn!("change payload for {operation} on {table} not encoded: {err}");
            None
        }
    }
}

async fn record<C: AuditedCommand + ?Sized>(
    cmd: &C,
    operation: Operation,
    entity_id: Ulid,
    payload: Option<JsonValue>,
) -> StoreResult<()> {
    let table = cmd.table_name();
    let event = ChangeEvent::new(
        table,
        operation,
        entity_id,
        cmd.audit_context().clone(),
        payload,
    );
    let event_id = event.event_id;
    match cmd.recorder().record(event).await {
        Ok(()) => {
            log::debug!("recorded {operation} on {table} {entity_id} as event {event_id}");
            Ok(())
        }
        Err(err) => match cmd.recording_mode() {
            RecordingMode::Warn => {
                log::warn!(
                    "change event for {operation} on {table} {entity_id} not recorded: {}",
                    err.message()
                );
                Ok(())
            }
            RecordingMode::Error => Err(StoreError::recording(table, entity_id, err.message())),
        },
    }
}

/// Connection, context, attribution and recorder shared by one command.
pub struct CommandScope<'a, C> {
    pub conn: &'a C,
    pub ctx: &'a ExecContext,
    pub audit: &'a AuditContext,
    pub recorder: &'a dyn ChangeRecorder,
    pub mode: RecordingMode,
}

impl<C> Clone for CommandScope<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CommandScope<'_, C> {}

pub(crate) fn select_by_id<D: Dialect, R: Record<D>>(id: R::Id) -> SelectStatement {
    Query::select()
        .column(Asterisk)
        .from(R::TABLE_IDEN)
        .and_where(Expr::col(R::ID_COLUMN).eq(id_value::<D>(id)))
        .to_owned()
}

fn split_values<C>(values: Vec<(C, sea_orm::sea_query::Value)>) -> (Vec<C>, Vec<SimpleExpr>) {
    values
        .into_iter()
        .map(|(col, value)| (col, SimpleExpr::from(value)))
        .unzip()
}

/// A committed insert: the identifier it was stored under and the row as
/// read back.
pub struct Inserted<R> {
    pub id: Ulid,
    pub row: Result<R, DbErr>,
}

/// Inserts one row of `R`. The identifier is assigned here, never by the caller.
pub struct InsertRecord<'a, D: Dialect, R: Record<D>, C> {
    scope: CommandScope<'a, C>,
    id: R::Id,
    params: &'a R::Create,
    _dialect: PhantomData<fn() -> D>,
}

impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> InsertRecord<'a, D, R, C> {
    pub fn new(scope: CommandScope<'a, C>, params: &'a R::Create) -> Self {
        Self {
            scope,
            id: R::Id::generate(),
            params,
            _dialect: PhantomData,
        }
    }

    pub fn id(&self) -> R::Id {
        self.id
    }
}

pub struct UpdateRecord<'a, D: Dialect, R: Record<D>, C> {
    scope: CommandScope<'a, C>,
    params: &'a R::Update,
    _dialect: PhantomData<fn() -> D>,
}

impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> UpdateRecord<'a, D, R, C> {
    pub fn new(scope: CommandScope<'a, C>, params: &'a R::Update) -> Self {
        Self {
            scope,
            params,
            _dialect: PhantomData,
        }
    }
}

pub struct DeleteRecord<'a, D: Dialect, R: Record<D>, C> {
    scope: CommandScope<'a, C>,
    id: R::Id,
    _dialect: PhantomData<fn() -> D>,
}

impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> DeleteRecord<'a, D, R, C> {
    pub fn new(scope: CommandScope<'a, C>, id: R::Id) -> Self {
        Self {
            scope,
            id,
            _dialect: PhantomData,
        }
    }
}

macro_rules! audited_command {
    ($command:ident) => {
        impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> AuditedCommand
            for $command<'a, D, R, C>
        {
            type Connection = C;

            fn context(&self) -> &ExecContext {
                self.scope.ctx
            }

            fn audit_context(&self) -> &AuditContext {
                self.scope.audit
            }

            fn table_name(&self) -> TableKind {
                R::TABLE
            }

            fn connection(&self) -> &C {
                self.scope.conn
            }

            fn recorder(&self) -> &dyn ChangeRecorder {
                self.scope.recorder
            }

            fn recording_mode(&self) -> RecordingMode {
                self.scope.mode
            }
        }
    };
}

audited_command!(InsertRecord);
audited_command!(UpdateRecord);
audited_command!(DeleteRecord);

#[async_trait]
impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> CreateCommand for InsertRecord<'a, D, R, C> {
    type Params = R::Create;
    type Row = Inserted<R>;
    type Entity = R::Entity;

    fn params(&self) -> &R::Create {
        self.params
    }

    fn get_id(&self, row: &Inserted<R>) -> StoreResult<Ulid> {
        Ok(row.id)
    }

    async fn execute(&self) -> Result<Inserted<R>, DbErr> {
        let (columns, values) = split_values(R::insert_values(self.id, self.params));
        let mut insert = Query::insert();
        insert
            .into_table(R::TABLE_IDEN)
            .columns(columns)
            .values(values)
            .map_err(|err| DbErr::Custom(err.to_string()))?;
        let conn = self.connection();
        let row = if D::RETURNING {
            insert.returning_all();
            let stored = conn
                .query_one(D::build(&insert))
                .await?
                .ok_or(DbErr::RecordNotInserted)?;
            R::from_row(&stored)
        } else {
            conn.execute(D::build(&insert)).await?;
            match conn.query_one(D::build(&select_by_id::<D, R>(self.id))).await {
                Ok(Some(stored)) => R::from_row(&stored),
                Ok(None) => Err(DbErr::RecordNotFound(format!("{} {}", R::TABLE, self.id))),
                Err(err) => Err(err),
            }
        };
        Ok(Inserted {
            id: self.id.ulid(),
            row,
        })
    }

    fn map_row(&self, inserted: Inserted<R>) -> StoreResult<R::Entity> {
        let row = inserted.row.map_err(|err| {
            StoreError::storage(format!(
                "{} {} committed but could not be read back: {err}",
                R::TABLE,
                inserted.id
            ))
        })?;
        row.into_entity()
    }
}

#[async_trait]
impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> UpdateCommand for UpdateRecord<'a, D, R, C> {
    type Id = R::Id;
    type Params = R::Update;

    fn params(&self) -> &R::Update {
        self.params
    }

    fn entity_id(&self) -> R::Id {
        R::update_id(self.params)
    }

    async fn execute(&self) -> Result<u64, DbErr> {
        let values = R::update_values(self.params)
            .into_iter()
            .map(|(col, value)| (col, SimpleExpr::from(value)));
        let update = Query::update()
            .table(R::TABLE_IDEN)
            .values(values)
            .and_where(Expr::col(R::ID_COLUMN).eq(id_value::<D>(self.entity_id())))
            .to_owned();
        let result = self.connection().execute(D::build(&update)).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<'a, D: Dialect, R: Record<D>, C: ConnectionTrait> DeleteCommand for DeleteRecord<'a, D, R, C> {
    type Id = R::Id;

    fn params(&self) -> &R::Id {
        &self.id
    }

    async fn execute(&self) -> Result<u64, DbErr> {
        let delete = Query::delete()
            .from_table(R::TABLE_IDEN)
            .and_where(Expr::col(R::ID_COLUMN).eq(id_value::<D>(self.id)))
            .to_owned();
        let result = self.connection().execute(D::build(&delete)).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use folio_core::{MemoryRecorder, RecordError, UserId};

    struct StubUpdate {
        ctx: ExecContext,
        audit: AuditContext,
        recorder: MemoryRecorder,
        mode: RecordingMode,
        id: UserId,
        affected: u64,
        fail: bool,
    }

    impl StubUpdate {
        fn new(affected: u64) -> Self {
            Self {
                ctx: ExecContext::background(),
                audit: AuditContext::system(),
                recorder: MemoryRecorder::new(),
                mode: RecordingMode::Error,
                id: UserId::new(),
                affected,
                fail: false,
            }
        }
    }

    impl AuditedCommand for StubUpdate {
        type Connection = sea_orm::DatabaseConnection;

        fn context(&self) -> &ExecContext {
            &self.ctx
        }

        fn audit_context(&self) -> &AuditContext {
            &self.audit
        }

        fn table_name(&self) -> TableKind {
            TableKind::Users
        }

        fn connection(&self) -> &sea_orm::DatabaseConnection {
            unreachable!("stub commands never touch a connection")
        }

        fn recorder(&self) -> &dyn ChangeRecorder {
            &self.recorder
        }

        fn recording_mode(&self) -> RecordingMode {
            self.mode
        }
    }

    #[async_trait]
    impl UpdateCommand for StubUpdate {
        type Id = UserId;
        type Params = UserId;

        fn params(&self) -> &UserId {
            &self.id
        }

        fn entity_id(&self) -> UserId {
            self.id
        }

        async fn execute(&self) -> Result<u64, DbErr> {
            if self.fail {
                return Err(DbErr::Custom("constraint violated".to_string()));
            }
            Ok(self.affected)
        }
    }

    #[tokio::test]
    async fn successful_update_records_supplied_id() {
        let cmd = StubUpdate::new(1);
        run_update(&cmd).await.expect("update");
        let events = cmd.recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, Operation::Update);
        assert_eq!(events[0].entity::<UserId>(), cmd.id);
    }

    #[tokio::test]
    async fn failed_write_records_nothing() {
        let mut cmd = StubUpdate::new(1);
        cmd.fail = true;
        let err = run_update(&cmd).await.expect_err("write error");
        assert!(matches!(
            err,
            StoreError::Write {
                table: TableKind::Users,
                operation: Operation::Update,
                ..
            }
        ));
        assert!(cmd.recorder.is_empty());
    }

    #[tokio::test]
    async fn zero_rows_is_not_found_without_event() {
        let cmd = StubUpdate::new(0);
        let err = run_update(&cmd).await.expect_err("not found");
        assert!(err.is_not_found());
        assert!(cmd.recorder.is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_skips_write_and_event() {
        let cmd = StubUpdate::new(1);
        cmd.ctx.cancel();
        let err = run_update(&cmd).await.expect_err("cancelled");
        assert!(matches!(err, StoreError::Cancelled));
        assert!(cmd.recorder.is_empty());
    }

    struct RejectingRecorder {
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl ChangeRecorder for RejectingRecorder {
        async fn record(&self, _event: ChangeEvent) -> Result<(), RecordError> {
            let mut attempts = self.attempts.lock().expect("lock");
            *attempts += 1;
            Err(RecordError::new("sink offline"))
        }
    }

    struct RejectedUpdate {
        inner: StubUpdate,
        recorder: RejectingRecorder,
    }

    impl AuditedCommand for RejectedUpdate {
        type Connection = sea_orm::DatabaseConnection;

        fn context(&self) -> &ExecContext {
            self.inner.context()
        }

        fn audit_context(&self) -> &AuditContext {
            self.inner.audit_context()
        }

        fn table_name(&self) -> TableKind {
            self.inner.table_name()
        }

        fn connection(&self) -> &sea_orm::DatabaseConnection {
            self.inner.connection()
        }

        fn recorder(&self) -> &dyn ChangeRecorder {
            &self.recorder
        }

        fn recording_mode(&self) -> RecordingMode {
            self.inner.mode
        }
    }

    #[async_trait]
    impl UpdateCommand for RejectedUpdate {
        type Id = UserId;
        type Params = UserId;

        fn params(&self) -> &UserId {
            &self.inner.id
        }

        fn entity_id(&self) -> UserId {
            self.inner.id
        }

        async fn execute(&self) -> Result<u64, DbErr> {
            Ok(1)
        }
    }

    fn rejected(mode: RecordingMode) -> RejectedUpdate {
        let mut inner = StubUpdate::new(1);
        inner.mode = mode;
        RejectedUpdate {
            inner,
            recorder: RejectingRecorder {
                attempts: Mutex::new(0),
            },
        }
    }

    #[tokio::test]
    async fn recording_failure_follows_mode() {
        let cmd = rejected(RecordingMode::Warn);
        run_update(&cmd).await.expect("warn mode keeps the write");
        assert_eq!(*cmd.recorder.attempts.lock().expect("lock"), 1);

        let cmd = rejected(RecordingMode::Error);
        let err = run_update(&cmd).await.expect_err("error mode surfaces");
        match err {
            StoreError::Recording { entity_id, .. } => assert_eq!(entity_id, cmd.inner.id.ulid()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    struct StubEntity {
        encodable: bool,
    }

    impl Serialize for StubEntity {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.encodable {
                serializer.serialize_str("stub")
            } else {
                Err(serde::ser::Error::custom("unencodable"))
            }
        }
    }

    struct StubCreate {
        ctx: ExecContext,
        audit: AuditContext,
        recorder: MemoryRecorder,
        id: UserId,
        committed: AtomicBool,
        stall: Option<Duration>,
        read_back_fails: bool,
        encodable: bool,
    }

    impl StubCreate {
        fn new(ctx: ExecContext) -> Self {
            Self {
                ctx,
                audit: AuditContext::system(),
                recorder: MemoryRecorder::new(),
                id: UserId::new(),
                committed: AtomicBool::new(false),
                stall: None,
                read_back_fails: false,
                encodable: true,
            }
        }
    }

    impl AuditedCommand for StubCreate {
        type Connection = sea_orm::DatabaseConnection;

        fn context(&self) -> &ExecContext {
            &self.ctx
        }

        fn audit_context(&self) -> &AuditContext {
            &self.audit
        }

        fn table_name(&self) -> TableKind {
            TableKind::Users
        }

        fn connection(&self) -> &sea_orm::DatabaseConnection {
            unreachable!("stub commands never touch a connection")
        }

        fn recorder(&self) -> &dyn ChangeRecorder {
            &self.recorder
        }

        fn recording_mode(&self) -> RecordingMode {
            RecordingMode::Error
        }
    }

    #[async_trait]
    impl CreateCommand for StubCreate {
        type Params = UserId;
        type Row = Inserted<UserId>;
        type Entity = StubEntity;

        fn params(&self) -> &UserId {
            &self.id
        }

        fn get_id(&self, row: &Inserted<UserId>) -> StoreResult<Ulid> {
            Ok(row.id)
        }

        async fn execute(&self) -> Result<Inserted<UserId>, DbErr> {
            self.committed.store(true, Ordering::SeqCst);
            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }
            let row = if self.read_back_fails {
                Err(DbErr::Custom("connection reset".to_string()))
            } else {
                Ok(self.id)
            };
            Ok(Inserted {
                id: self.id.ulid(),
                row,
            })
        }

        fn map_row(&self, inserted: Inserted<UserId>) -> StoreResult<StubEntity> {
            inserted
                .row
                .map_err(|err| StoreError::storage(err.to_string()))?;
            Ok(StubEntity {
                encodable: self.encodable,
            })
        }
    }

    #[tokio::test]
    async fn deadline_passing_mid_write_still_records_the_commit() {
        let ctx = ExecContext::background().with_timeout(Duration::from_millis(10));
        let mut cmd = StubCreate::new(ctx);
        cmd.stall = Some(Duration::from_millis(50));
        run_create(&cmd).await.expect("committed write succeeds");
        assert!(cmd.committed.load(Ordering::SeqCst));
        let events = cmd.recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity::<UserId>(), cmd.id);
    }

    #[tokio::test]
    async fn cancelled_create_never_starts_the_write() {
        let cmd = StubCreate::new(ExecContext::background());
        cmd.ctx.cancel();
        let err = run_create(&cmd).await.err().expect("cancelled");
        assert!(matches!(err, StoreError::Cancelled));
        assert!(!cmd.committed.load(Ordering::SeqCst));
        assert!(cmd.recorder.is_empty());
    }

    #[tokio::test]
    async fn failed_read_back_still_records_the_insert() {
        let mut cmd = StubCreate::new(ExecContext::background());
        cmd.read_back_fails = true;
        let err = run_create(&cmd).await.err().expect("read back error");
        assert!(matches!(err, StoreError::Storage { .. }));
        let events = cmd.recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, Operation::Insert);
        assert_eq!(events[0].entity::<UserId>(), cmd.id);
        assert!(events[0].payload.is_none());
    }

    #[tokio::test]
    async fn unencodable_payload_is_dropped_but_event_recorded() {
        let mut cmd = StubCreate::new(ExecContext::background());
        cmd.encodable = false;
        run_create(&cmd).await.expect("create");
        let events = cmd.recorder.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].payload.is_none());
    }

    #[tokio::test]
    async fn expired_context_skips_update() {
        let mut cmd = StubUpdate::new(1);
        cmd.ctx = ExecContext::background().with_timeout(Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(5)).await;
        let err = run_update(&cmd).await.expect_err("expired");
        assert!(matches!(err, StoreError::Cancelled));
        assert!(cmd.recorder.is_empty());
    }

    #[test]
    fn recording_mode_defaults_to_error() {
        assert_eq!(RecordingMode::default(), RecordingMode::Error);
        let mode: RecordingMode = serde_json::from_str("\"warn\"").expect("mode");
        assert_eq!(mode, RecordingMode::Warn);
    }
}
