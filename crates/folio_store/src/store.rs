use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sea_orm::sea_query::{
    Alias, Asterisk, Expr, Func, Order, Query, QueryStatementWriter, SimpleExpr,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, QueryResult};
use sea_orm_migration::MigratorTrait;

use folio_core::{
    AuditContext, ChangeEvent, ChangeRecorder, ContentData, ContentDataId, ContentField,
    ContentFieldWithDef, Datatype, DatatypeId, ExecContext, Field, Route, RouteId,
    Session, StoreError, StoreResult, TableKind, Token, User, UserId, UserOauth, UserSshKey, Validate,
    ViewSource,
};

use crate::command::{
    CommandScope, DeleteRecord, InsertRecord, RecordingMode, UpdateRecord, run_create,
    run_delete, run_update, select_by_id,
};
use crate::db::*;
use crate::dialect::{Dialect, MySql, Postgres, Sqlite};
use crate::migration::Migrator;
use crate::record::{
    ContentDataRow, ContentFieldRow, DatatypeRow, FieldRow, Record, RouteRow, SessionRow,
    TokenRow, UserOauthRow, UserRow, UserSshKeyRow, id_value,
};
use crate::recorder::{TableRecorder, list_change_events};

pub type SqliteStore = Store<Sqlite>;
pub type PostgresStore = Store<Postgres>;
pub type MysqlStore = Store<MySql>;

/// Per-backend façade over every table.
///
/// Reads go straight to the connection. Mutations run as audited commands
/// and report to the bound [`ChangeRecorder`], by default a
/// [`TableRecorder`] on the same database.
pub struct Store<D: Dialect> {
    conn: DatabaseConnection,
    recorder: Arc<dyn ChangeRecorder>,
    recording_mode: RecordingMode,
    queries: Arc<AtomicU64>,
    _dialect: PhantomData<fn() -> D>,
}

impl<D: Dialect> Clone for Store<D> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            recorder: Arc::clone(&self.recorder),
            recording_mode: self.recording_mode,
            queries: Arc::clone(&self.queries),
            _dialect: PhantomData,
        }
    }
}

impl<D: Dialect> Store<D> {
    /// Connects and applies pending migrations.
    pub async fn connect<C>(options: C) -> StoreResult<Self>
    where
        C: Into<ConnectOptions>,
    {
        let conn = Database::connect(options).await?;
        let backend = conn.get_database_backend();
        if backend != D::BACKEND {
            return Err(StoreError::storage(format!(
                "connection is {backend:?}, store expects {}",
                D::NAME
            )));
        }
        Migrator::up(&conn, None).await?;
        log::debug!("{} store ready", D::NAME);
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        let recorder = Arc::new(TableRecorder::<D>::new(conn.clone()));
        Self {
            conn,
            recorder,
            recording_mode: RecordingMode::default(),
            queries: Arc::new(AtomicU64::new(0)),
            _dialect: PhantomData,
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn ChangeRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_recording_mode(mut self, mode: RecordingMode) -> Self {
        self.recording_mode = mode;
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn recording_mode(&self) -> RecordingMode {
        self.recording_mode
    }

    /// Statements issued by this store's reads and writes. Change-event
    /// recording is not counted.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn users(&self) -> Repo<'_, D, UserRow<D>> {
        Repo::new(self)
    }

    pub fn ssh_keys(&self) -> Repo<'_, D, UserSshKeyRow<D>> {
        Repo::new(self)
    }

    pub fn sessions(&self) -> Repo<'_, D, SessionRow<D>> {
        Repo::new(self)
    }

    pub fn tokens(&self) -> Repo<'_, D, TokenRow<D>> {
        Repo::new(self)
    }

    pub fn oauth(&self) -> Repo<'_, D, UserOauthRow<D>> {
        Repo::new(self)
    }

    pub fn routes(&self) -> Repo<'_, D, RouteRow<D>> {
        Repo::new(self)
    }

    pub fn datatypes(&self) -> Repo<'_, D, DatatypeRow<D>> {
        Repo::new(self)
    }

    pub fn fields(&self) -> Repo<'_, D, FieldRow<D>> {
        Repo::new(self)
    }

    pub fn content_data(&self) -> Repo<'_, D, ContentDataRow<D>> {
        Repo::new(self)
    }

    pub fn content_fields(&self) -> Repo<'_, D, ContentFieldRow<D>> {
        Repo::new(self)
    }

    pub async fn list_change_events(
        &self,
        ctx: &ExecContext,
        limit: u64,
    ) -> StoreResult<Vec<ChangeEvent>> {
        ctx.check()?;
        self.count_statements(1);
        ctx.run(list_change_events::<D, _>(&self.conn, limit)).await
    }

    /// Content fields of one content row joined with their field definitions,
    /// in one statement.
    pub async fn content_fields_with_defs(
        &self,
        ctx: &ExecContext,
        content_data_id: ContentDataId,
    ) -> StoreResult<Vec<ContentFieldWithDef>> {
        let select = Query::select()
            .columns([
                (FolioContentFields::Table, FolioContentFields::ContentFieldId),
                (FolioContentFields::Table, FolioContentFields::RouteId),
                (FolioContentFields::Table, FolioContentFields::ContentDataId),
                (FolioContentFields::Table, FolioContentFields::FieldId),
                (FolioContentFields::Table, FolioContentFields::FieldValue),
                (FolioContentFields::Table, FolioContentFields::AuthorId),
                (FolioContentFields::Table, FolioContentFields::DateCreated),
                (FolioContentFields::Table, FolioContentFields::DateModified),
            ])
            .expr_as(
                Expr::col((FolioFields::Table, FolioFields::Label)),
                Alias::new("field_label"),
            )
            .expr_as(
                Expr::col((FolioFields::Table, FolioFields::Type)),
                Alias::new("field_type"),
            )
            .from(FolioContentFields::Table)
            .inner_join(
                FolioFields::Table,
                Expr::col((FolioContentFields::Table, FolioContentFields::FieldId))
                    .equals((FolioFields::Table, FolioFields::FieldId)),
            )
            .and_where(
                Expr::col((FolioContentFields::Table, FolioContentFields::ContentDataId))
                    .eq(id_value::<D>(content_data_id)),
            )
            .order_by(
                (FolioContentFields::Table, FolioContentFields::ContentFieldId),
                Order::Asc,
            )
            .to_owned();
        let rows = self.fetch_all(ctx, &select).await?;
        rows.iter()
            .map(|row| -> StoreResult<ContentFieldWithDef> {
                let content_field = <ContentFieldRow<D> as Record<D>>::from_row(row)?.into_entity()?;
                Ok(ContentFieldWithDef {
                    content_field,
                    label: row.try_get("", "field_label")?,
                    field_type: row.try_get("", "field_type")?,
                })
            })
            .collect()
    }

    fn count_statements(&self, n: u64) {
        self.queries.fetch_add(n, Ordering::Relaxed);
    }

    fn scope<'a>(
        &'a self,
        ctx: &'a ExecContext,
        audit: &'a AuditContext,
    ) -> CommandScope<'a, DatabaseConnection> {
        CommandScope {
            conn: &self.conn,
            ctx,
            audit,
            recorder: self.recorder.as_ref(),
            mode: self.recording_mode,
        }
    }

    async fn fetch_one<S: QueryStatementWriter>(
        &self,
        ctx: &ExecContext,
        stmt: &S,
    ) -> StoreResult<Option<QueryResult>> {
        ctx.check()?;
        let stmt = D::build(stmt);
        self.count_statements(1);
        ctx.run(async move { self.conn.query_one(stmt).await.map_err(StoreError::from) })
            .await
    }

    async fn fetch_all<S: QueryStatementWriter>(
        &self,
        ctx: &ExecContext,
        stmt: &S,
    ) -> StoreResult<Vec<QueryResult>> {
        ctx.check()?;
        let stmt = D::build(stmt);
        self.count_statements(1);
        ctx.run(async move { self.conn.query_all(stmt).await.map_err(StoreError::from) })
            .await
    }
}

fn decode<D: Dialect, R: Record<D>>(row: &QueryResult) -> StoreResult<R::Entity> {
    R::from_row(row)?.into_entity()
}

/// Typed operations over one table of a [`Store`].
pub struct Repo<'s, D: Dialect, R: Record<D>> {
    store: &'s Store<D>,
    _record: PhantomData<fn() -> R>,
}

impl<'s, D: Dialect, R: Record<D>> Repo<'s, D, R> {
    fn new(store: &'s Store<D>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn count(&self, ctx: &ExecContext) -> StoreResult<i64> {
        let select = Query::select()
            .expr_as(Func::count(Expr::col(R::ID_COLUMN)), Alias::new("row_count"))
            .from(R::TABLE_IDEN)
            .to_owned();
        match self.store.fetch_one(ctx, &select).await? {
            Some(row) => Ok(row.try_get("", "row_count")?),
            None => Ok(0),
        }
    }

    pub async fn find(&self, ctx: &ExecContext, id: R::Id) -> StoreResult<Option<R::Entity>> {
        let select = select_by_id::<D, R>(id);
        self.store
            .fetch_one(ctx, &select)
            .await?
            .map(|row| decode::<D, R>(&row))
            .transpose()
    }

    pub async fn get(&self, ctx: &ExecContext, id: R::Id) -> StoreResult<R::Entity> {
        self.find(ctx, id)
            .await?
            .ok_or_else(|| StoreError::not_found(R::TABLE, id.to_string()))
    }

    /// All rows in identifier (creation) order.
    pub async fn list(&self, ctx: &ExecContext) -> StoreResult<Vec<R::Entity>> {
        let select = Query::select()
            .column(Asterisk)
            .from(R::TABLE_IDEN)
            .order_by(R::ID_COLUMN, Order::Asc)
            .to_owned();
        self.list_where(ctx, select).await
    }

    pub async fn create(
        &self,
        ctx: &ExecContext,
        audit: &AuditContext,
        params: &R::Create,
    ) -> StoreResult<R::Entity> {
        params.validate()?;
        let cmd = InsertRecord::<D, R, _>::new(self.store.scope(ctx, audit), params);
        self.store.count_statements(if D::RETURNING { 1 } else { 2 });
        run_create(&cmd).await
    }

    pub async fn update(
        &self,
        ctx: &ExecContext,
        audit: &AuditContext,
        params: &R::Update,
    ) -> StoreResult<()> {
        params.validate()?;
        let cmd = UpdateRecord::<D, R, _>::new(self.store.scope(ctx, audit), params);
        self.store.count_statements(1);
        run_update(&cmd).await
    }

    pub async fn delete(
        &self,
        ctx: &ExecContext,
        audit: &AuditContext,
        id: R::Id,
    ) -> StoreResult<()> {
        let cmd = DeleteRecord::<D, R, _>::new(self.store.scope(ctx, audit), id);
        self.store.count_statements(1);
        run_delete(&cmd).await
    }

    async fn list_by(
        &self,
        ctx: &ExecContext,
        column: R::Column,
        value: impl Into<SimpleExpr>,
    ) -> StoreResult<Vec<R::Entity>> {
        let select = Query::select()
            .column(Asterisk)
            .from(R::TABLE_IDEN)
            .and_where(Expr::col(column).eq(value))
            .order_by(R::ID_COLUMN, Order::Asc)
            .to_owned();
        self.list_where(ctx, select).await
    }

    async fn find_by(
        &self,
        ctx: &ExecContext,
        column: R::Column,
        value: impl Into<SimpleExpr>,
    ) -> StoreResult<Option<R::Entity>> {
        let select = Query::select()
            .column(Asterisk)
            .from(R::TABLE_IDEN)
            .and_where(Expr::col(column).eq(value))
            .order_by(R::ID_COLUMN, Order::Asc)
            .limit(1)
            .to_owned();
        self.store
            .fetch_one(ctx, &select)
            .await?
            .map(|row| decode::<D, R>(&row))
            .transpose()
    }

    async fn list_where(
        &self,
        ctx: &ExecContext,
        select: sea_orm::sea_query::SelectStatement,
    ) -> StoreResult<Vec<R::Entity>> {
        let rows = self.store.fetch_all(ctx, &select).await?;
        rows.iter().map(decode::<D, R>).collect()
    }
}

impl<D: Dialect> Repo<'_, D, UserRow<D>> {
    pub async fn get_by_email(&self, ctx: &ExecContext, email: &str) -> StoreResult<User> {
        self.find_by(ctx, FolioUsers::Email, email)
            .await?
            .ok_or_else(|| StoreError::not_found(TableKind::Users, email))
    }

    pub async fn get_by_username(&self, ctx: &ExecContext, username: &str) -> StoreResult<User> {
        self.find_by(ctx, FolioUsers::Username, username)
            .await?
            .ok_or_else(|| StoreError::not_found(TableKind::Users, username))
    }
}

impl<D: Dialect> Repo<'_, D, UserSshKeyRow<D>> {
    pub async fn list_by_user(&self, ctx: &ExecContext, user: UserId) -> StoreResult<Vec<UserSshKey>> {
        self.list_by(ctx, FolioUserSshKeys::UserId, id_value::<D>(user))
            .await
    }

    pub async fn find_by_fingerprint(
        &self,
        ctx: &ExecContext,
        fingerprint: &str,
    ) -> StoreResult<Option<UserSshKey>> {
        self.find_by(ctx, FolioUserSshKeys::Fingerprint, fingerprint)
            .await
    }
}

impl<D: Dialect> Repo<'_, D, SessionRow<D>> {
    pub async fn list_by_user(&self, ctx: &ExecContext, user: UserId) -> StoreResult<Vec<Session>> {
        self.list_by(ctx, FolioSessions::UserId, id_value::<D>(user))
            .await
    }
}

impl<D: Dialect> Repo<'_, D, TokenRow<D>> {
    pub async fn list_by_user(&self, ctx: &ExecContext, user: UserId) -> StoreResult<Vec<Token>> {
        self.list_by(ctx, FolioTokens::UserId, id_value::<D>(user)).await
    }
}

impl<D: Dialect> Repo<'_, D, UserOauthRow<D>> {
    pub async fn find_by_user(
        &self,
        ctx: &ExecContext,
        user: UserId,
    ) -> StoreResult<Option<UserOauth>> {
        self.find_by(ctx, FolioUserOauth::UserId, id_value::<D>(user))
            .await
    }
}

impl<D: Dialect> Repo<'_, D, RouteRow<D>> {
    pub async fn get_by_slug(&self, ctx: &ExecContext, slug: &str) -> StoreResult<Route> {
        self.find_by(ctx, FolioRoutes::Slug, slug)
            .await?
            .ok_or_else(|| StoreError::not_found(TableKind::Routes, slug))
    }
}

impl<D: Dialect> Repo<'_, D, DatatypeRow<D>> {
    pub async fn list_by_parent(
        &self,
        ctx: &ExecContext,
        parent: DatatypeId,
    ) -> StoreResult<Vec<Datatype>> {
        self.list_by(ctx, FolioDatatypes::ParentId, id_value::<D>(parent))
            .await
    }
}

impl<D: Dialect> Repo<'_, D, FieldRow<D>> {
    pub async fn list_by_datatype(
        &self,
        ctx: &ExecContext,
        datatype: DatatypeId,
    ) -> StoreResult<Vec<Field>> {
        self.list_by(ctx, FolioFields::ParentId, id_value::<D>(datatype))
            .await
    }
}

impl<D: Dialect> Repo<'_, D, ContentDataRow<D>> {
    pub async fn list_by_route(
        &self,
        ctx: &ExecContext,
        route: RouteId,
    ) -> StoreResult<Vec<ContentData>> {
        self.list_by(ctx, FolioContentData::RouteId, id_value::<D>(route))
            .await
    }
}

impl<D: Dialect> Repo<'_, D, ContentFieldRow<D>> {
    pub async fn list_by_content_data(
        &self,
        ctx: &ExecContext,
        content_data: ContentDataId,
    ) -> StoreResult<Vec<ContentField>> {
        self.list_by(
            ctx,
            FolioContentFields::ContentDataId,
            id_value::<D>(content_data),
        )
        .await
    }
}

#[async_trait]
impl<D: Dialect> ViewSource for Store<D> {
    async fn get_user(&self, ctx: &ExecContext, id: UserId) -> StoreResult<User> {
        self.users().get(ctx, id).await
    }

    async fn get_datatype(&self, ctx: &ExecContext, id: DatatypeId) -> StoreResult<Datatype> {
        self.datatypes().get(ctx, id).await
    }

    async fn get_content_data(
        &self,
        ctx: &ExecContext,
        id: ContentDataId,
    ) -> StoreResult<ContentData> {
        self.content_data().get(ctx, id).await
    }

    async fn find_oauth_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Option<UserOauth>> {
        self.oauth().find_by_user(ctx, id).await
    }

    async fn list_ssh_keys_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Vec<UserSshKey>> {
        self.ssh_keys().list_by_user(ctx, id).await
    }

    async fn list_sessions_by_user(
        &self,
        ctx: &ExecContext,
        id: UserId,
    ) -> StoreResult<Vec<Session>> {
        self.sessions().list_by_user(ctx, id).await
    }

    async fn list_tokens_by_user(&self, ctx: &ExecContext, id: UserId) -> StoreResult<Vec<Token>> {
        self.tokens().list_by_user(ctx, id).await
    }

    async fn list_fields_by_datatype(
        &self,
        ctx: &ExecContext,
        id: DatatypeId,
    ) -> StoreResult<Vec<Field>> {
        self.fields().list_by_datatype(ctx, id).await
    }

    async fn list_content_fields_with_defs(
        &self,
        ctx: &ExecContext,
        id: ContentDataId,
    ) -> StoreResult<Vec<ContentFieldWithDef>> {
        self.content_fields_with_defs(ctx, id).await
    }
}
